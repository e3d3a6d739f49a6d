//! `sgt scan` command - Scanner agreement sessions
//!
//! A session holds pieces graded twice, once by the inspector and once by
//! the scanner. Each appended item is classified immediately against the
//! product's grade hierarchy and the classification is stored with it.

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{display_id, escape_csv, find_one, open_project, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::loader;
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::entities::{Grade, Market, Product, ScannerSession};
use crate::grading::{GradeBook, SessionStats};

#[derive(Subcommand, Debug)]
pub enum ScanCommands {
    /// List scanner sessions
    List(ListArgs),

    /// Start a new scanner agreement session
    New(NewArgs),

    /// Show a session's details and items
    Show(ShowArgs),

    /// Edit a session's header fields in your editor
    Edit(EditArgs),

    /// Record graded pieces in a session
    #[command(subcommand)]
    Item(ItemCommands),

    /// Show a session's agreement statistics
    Stats(StatsArgs),
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Append a piece graded by both inspector and scanner
    Add(ItemAddArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only sessions of this product (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Search in supervisor names (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Supervising engineer running the study
    pub supervisor: String,

    /// Destination market (ID, @N alias, or partial ID)
    #[arg(long, short = 'm')]
    pub market: String,

    /// Product whose grade hierarchy both gradings use (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: String,

    /// Inspector responsible for the reference grading
    #[arg(long)]
    pub responsible: Option<String>,

    /// Shift designation
    #[arg(long)]
    pub shift: Option<String>,

    /// Default piece thickness, pre-filled onto new items
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Default piece width, pre-filled onto new items
    #[arg(long)]
    pub width: Option<f64>,

    /// Default piece length, pre-filled onto new items
    #[arg(long)]
    pub length: Option<f64>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Session ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Session ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ItemAddArgs {
    /// Session ID, @N alias, or partial ID
    pub id: String,

    /// Grade the human inspector assigned (ID, @N alias, or partial ID)
    #[arg(long, short = 'i', required_unless_present = "interactive")]
    pub inspector: Option<String>,

    /// Grade the scanner assigned (ID, @N alias, or partial ID)
    #[arg(long, short = 's', required_unless_present = "interactive")]
    pub scanner: Option<String>,

    /// Measured thickness; session default applies when omitted
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Measured width; session default applies when omitted
    #[arg(long)]
    pub width: Option<f64>,

    /// Measured length; session default applies when omitted
    #[arg(long)]
    pub length: Option<f64>,

    /// Pick both grades from a prompt, repeating until cancelled
    #[arg(long)]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Session ID, @N alias, or partial ID
    pub id: String,
}

pub fn run(cmd: ScanCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ScanCommands::List(args) => run_list(args, global),
        ScanCommands::New(args) => run_new(args, global),
        ScanCommands::Show(args) => run_show(args, global),
        ScanCommands::Edit(args) => run_edit(args, global),
        ScanCommands::Item(ItemCommands::Add(args)) => run_item_add(args, global),
        ScanCommands::Stats(args) => run_stats(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut sessions: Vec<ScannerSession> = loader::load_all_of(&project, EntityPrefix::Scan)?;
    let products: Vec<Product> = loader::load_all_of(&project, EntityPrefix::Prod)?;

    let product_filter = match &args.product {
        Some(reference) => {
            let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, reference)?;
            Some(product.id)
        }
        None => None,
    };

    sessions.retain(|s| {
        let product_match = product_filter.as_ref().map_or(true, |p| &s.product == p);
        let search_match = args.search.as_ref().map_or(true, |search| {
            s.supervisor.to_lowercase().contains(&search.to_lowercase())
        });
        product_match && search_match
    });

    // Most recent first
    sessions.sort_by(|a, b| b.date.cmp(&a.date));

    if args.count {
        println!("{}", sessions.len());
        return Ok(());
    }

    if sessions.is_empty() {
        match global.format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No scanner sessions found.");
                if !global.quiet {
                    println!();
                    println!(
                        "Start one with: {}",
                        style("sgt scan new SUPERVISOR --market ID --product ID").yellow()
                    );
                }
            }
        }
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(sessions.iter().map(|s| s.id.to_string()));
    let _ = short_ids.save(&project);

    let product_name = |session: &ScannerSession| -> String {
        products
            .iter()
            .find(|p| p.id == session.product)
            .map_or_else(|| session.product.to_string(), |p| p.name.clone())
    };

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&sessions).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&sessions).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,date,supervisor,product,items,assertiveness");
            for s in &sessions {
                let short_id = short_ids
                    .get_short_id(&s.id.to_string())
                    .map_or(String::new(), |n| n.to_string());
                let stats = s.stats();
                println!(
                    "{},{},{},{},{},{},{:.4}",
                    short_id,
                    s.id,
                    s.date.format("%Y-%m-%d"),
                    escape_csv(&s.supervisor),
                    escape_csv(&product_name(s)),
                    stats.pieces_evaluated,
                    stats.assertiveness
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<8} {:<17} {:<11} {:<16} {:<16} {:>6} {:>7}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("DATE").bold(),
                style("SUPERVISOR").bold(),
                style("PRODUCT").bold(),
                style("ITEMS").bold(),
                style("ASSERT").bold()
            );
            println!("{}", "-".repeat(88));
            for s in &sessions {
                let short_id = short_ids
                    .get_short_id(&s.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                let stats = s.stats();
                println!(
                    "{:<8} {:<17} {:<11} {:<16} {:<16} {:>6} {:>6.1}%",
                    style(&short_id).cyan(),
                    display_id(&s.id, global),
                    s.date.format("%Y-%m-%d").to_string(),
                    truncate_str(&s.supervisor, 14),
                    truncate_str(&product_name(s), 14),
                    stats.pieces_evaluated,
                    stats.assertiveness * 100.0
                );
            }
            if !global.quiet {
                println!();
                println!("{} session(s) found.", style(sessions.len()).cyan());
            }
        }
        OutputFormat::Id => {
            for s in &sessions {
                println!("{}", s.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | Date | Supervisor | Product | Items | Assertiveness |");
            println!("|---|---|---|---|---|---|---|");
            for s in &sessions {
                let short_id = short_ids
                    .get_short_id(&s.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                let stats = s.stats();
                println!(
                    "| {} | {} | {} | {} | {} | {} | {:.1}% |",
                    short_id,
                    display_id(&s.id, global),
                    s.date.format("%Y-%m-%d"),
                    s.supervisor,
                    product_name(s),
                    stats.pieces_evaluated,
                    stats.assertiveness * 100.0
                );
            }
        }
        OutputFormat::Auto => unreachable!(),
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(&project);

    let (_, market) = find_one::<Market>(&project, EntityPrefix::Mkt, &args.market)?;
    let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, &args.product)?;

    let grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
    let hierarchy_size = grades.iter().filter(|g| g.product == product.id).count();
    if hierarchy_size == 0 {
        return Err(miette::miette!(
            "Product '{}' has no grades yet; create the hierarchy first with `sgt grade new`",
            product.name
        ));
    }

    let mut session = ScannerSession::new(
        args.supervisor,
        market.id.clone(),
        product.id.clone(),
        config.author(),
    );
    if let Some(responsible) = args.responsible {
        session.responsible = responsible;
    }
    if let Some(shift) = args.shift {
        session.shift = shift;
    }
    session.default_thickness = args.thickness;
    session.default_width = args.width;
    session.default_length = args.length;

    let file_path = project.entity_path(EntityPrefix::Scan, &session.id);
    let yaml = serde_yml::to_string(&session).into_diagnostic()?;
    fs::write(&file_path, yaml).into_diagnostic()?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(session.id.to_string());
    let _ = short_ids.save(&project);

    println!(
        "{} Created session {} {} ({}, {} grades in hierarchy)",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        session.id,
        product.name,
        hierarchy_size
    );
    if !global.quiet {
        println!("   {}", style(file_path.display()).dim());
        println!();
        println!(
            "Record pieces with: {}",
            style(format!(
                "sgt scan item add @{} --inspector GRADE --scanner GRADE",
                short_id
            ))
            .yellow()
        );
    }

    if args.edit {
        config.run_editor(&file_path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let (_, session) = find_one::<ScannerSession>(&project, EntityPrefix::Scan, &args.id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&session).into_diagnostic()?
            );
        }
        OutputFormat::Id => println!("{}", session.id),
        _ => {
            print!("{}", serde_yml::to_string(&session).into_diagnostic()?);

            if !session.items.is_empty() {
                let grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
                let grade_name = |id: &crate::core::EntityId| -> String {
                    grades
                        .iter()
                        .find(|g| g.id == *id)
                        .map_or_else(|| id.to_string(), |g| g.name.clone())
                };

                println!();
                println!("{}", style("Items:").bold());
                println!(
                    "  {:>4}  {:<14} {:<14} {}",
                    style("#").dim(),
                    style("INSPECTOR").dim(),
                    style("SCANNER").dim(),
                    style("RESULT").dim()
                );
                for item in &session.items {
                    println!(
                        "  {:>4}  {:<14} {:<14} {}",
                        item.item_number,
                        truncate_str(&grade_name(&item.inspector_grade), 12),
                        truncate_str(&grade_name(&item.scanner_grade), 12),
                        item.classification
                    );
                }
            }
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(&project);
    let (path, _) = find_one::<ScannerSession>(&project, EntityPrefix::Scan, &args.id)?;

    config.run_editor(&path).into_diagnostic()?;
    Ok(())
}

fn run_item_add(args: ItemAddArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let (path, mut session) = find_one::<ScannerSession>(&project, EntityPrefix::Scan, &args.id)?;

    let grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
    let book = GradeBook::from_grades(&grades);

    if args.interactive {
        return run_item_add_interactive(&path, &mut session, &grades, &book);
    }

    // required_unless_present guarantees both are set here
    let inspector_ref = args.inspector.as_deref().unwrap_or_default();
    let scanner_ref = args.scanner.as_deref().unwrap_or_default();

    let (_, inspector_grade) = find_one::<Grade>(&project, EntityPrefix::Grd, inspector_ref)?;
    let (_, scanner_grade) = find_one::<Grade>(&project, EntityPrefix::Grd, scanner_ref)?;

    book.check_product(&inspector_grade.id, &session.product)?;
    book.check_product(&scanner_grade.id, &session.product)?;

    let classification = book.classify_pair(&inspector_grade.id, &scanner_grade.id)?;
    let item = session.append_item(
        inspector_grade.id.clone(),
        scanner_grade.id.clone(),
        classification,
        args.thickness,
        args.width,
        args.length,
    );
    let item_number = item.item_number;

    let yaml = serde_yml::to_string(&session).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    println!(
        "{} Item {} recorded: {} vs {} -> {}",
        style("✓").green(),
        style(item_number).cyan(),
        inspector_grade.name,
        scanner_grade.name,
        style(classification).bold()
    );

    Ok(())
}

/// Prompt-driven entry loop for recording pieces at the line
fn run_item_add_interactive(
    path: &std::path::Path,
    session: &mut ScannerSession,
    grades: &[Grade],
    book: &GradeBook,
) -> Result<()> {
    let mut hierarchy: Vec<&Grade> = grades
        .iter()
        .filter(|g| g.product == session.product && g.active)
        .collect();
    hierarchy.sort_by_key(|g| g.rank);

    if hierarchy.is_empty() {
        return Err(miette::miette!(
            "No active grades found for this session's product"
        ));
    }

    let labels: Vec<String> = hierarchy
        .iter()
        .map(|g| format!("{} (rank {})", g.name, g.rank))
        .collect();
    let theme = ColorfulTheme::default();

    loop {
        println!();
        println!(
            "{}",
            style(format!("Item {}", session.next_item_number())).bold()
        );

        let inspector_idx = Select::with_theme(&theme)
            .with_prompt("Inspector grade")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        let scanner_idx = Select::with_theme(&theme)
            .with_prompt("Scanner grade")
            .items(&labels)
            .default(inspector_idx)
            .interact()
            .into_diagnostic()?;

        let inspector_grade = hierarchy[inspector_idx];
        let scanner_grade = hierarchy[scanner_idx];

        let classification = book.classify_pair(&inspector_grade.id, &scanner_grade.id)?;
        let item = session.append_item(
            inspector_grade.id.clone(),
            scanner_grade.id.clone(),
            classification,
            None,
            None,
            None,
        );

        println!(
            "{} Item {}: {}",
            style("✓").green(),
            item.item_number,
            style(classification).bold()
        );

        let yaml = serde_yml::to_string(&*session).into_diagnostic()?;
        fs::write(path, yaml).into_diagnostic()?;

        let again: String = Input::with_theme(&theme)
            .with_prompt("Record another? [Y/n]")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        if again.eq_ignore_ascii_case("n") || again.eq_ignore_ascii_case("no") {
            break;
        }
    }

    let stats = session.stats();
    println!();
    print_stats_summary(&stats);

    Ok(())
}

fn run_stats(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let (_, session) = find_one::<ScannerSession>(&project, EntityPrefix::Scan, &args.id)?;

    let stats = session.stats();

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&stats).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("evaluated,in_grade,over_grade,under_grade,assertiveness,error");
            println!(
                "{},{},{},{},{:.4},{:.4}",
                stats.pieces_evaluated,
                stats.pieces_in_grade,
                stats.pieces_over_grade,
                stats.pieces_under_grade,
                stats.assertiveness,
                stats.error
            );
        }
        _ => {
            println!(
                "{}",
                style(format!("Session {} ({})", session.id, session.supervisor)).bold()
            );
            println!();
            print_stats_summary(&stats);
        }
    }

    Ok(())
}

pub(crate) fn print_stats_summary(stats: &SessionStats) {
    println!("  Pieces evaluated:  {}", style(stats.pieces_evaluated).cyan());
    println!("  In grade:          {}", stats.pieces_in_grade);
    println!("  Over grade:        {}", stats.pieces_over_grade);
    println!("  Under grade:       {}", stats.pieces_under_grade);
    println!(
        "  Assertiveness:     {}",
        style(format!("{:.1}%", stats.assertiveness * 100.0)).green()
    );
    println!(
        "  Error:             {}",
        style(format!("{:.1}%", stats.error * 100.0)).red()
    );
}
