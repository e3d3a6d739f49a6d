//! `sgt insp` command - Grading inspection records
//!
//! An inspection captures one lot graded by an inspector: header fields
//! (shift, lot, market, product, dimensions) plus per-grade piece tallies.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{display_id, escape_csv, find_one, open_project, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::loader;
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::entities::{Defect, Grade, Inspection, InspectionKind, Market, Product};
use crate::grading::GradingError;

#[derive(Subcommand, Debug)]
pub enum InspCommands {
    /// List inspections
    List(ListArgs),

    /// Record a new inspection for a lot
    New(NewArgs),

    /// Show an inspection's details
    Show(ShowArgs),

    /// Edit an inspection in your editor
    Edit(EditArgs),

    /// Manage an inspection's per-grade tallies
    #[command(subcommand)]
    Result(ResultCommands),
}

#[derive(Subcommand, Debug)]
pub enum ResultCommands {
    /// Add pieces to a grade's tally (merges with an existing line)
    Add(ResultAddArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only inspections of this kind (finished_product, line_grading, rejection_typing)
    #[arg(long, short = 'k')]
    pub kind: Option<InspectionKind>,

    /// Only inspections of this product (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Search in lot numbers (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Lot number (must be unique across inspections)
    pub lot: String,

    /// Inspection kind (finished_product, line_grading, rejection_typing)
    #[arg(long, short = 'k', default_value = "finished_product")]
    pub kind: InspectionKind,

    /// Destination market (ID, @N alias, or partial ID)
    #[arg(long, short = 'm')]
    pub market: String,

    /// Product being graded (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: String,

    /// Shift designation
    #[arg(long)]
    pub shift: Option<String>,

    /// Supervising engineer
    #[arg(long)]
    pub supervisor: Option<String>,

    /// Inspector responsible for the tallies
    #[arg(long)]
    pub responsible: Option<String>,

    /// Planned number of pieces
    #[arg(long)]
    pub pieces: Option<u32>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Inspection ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Inspection ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ResultAddArgs {
    /// Inspection ID, @N alias, or partial ID
    pub id: String,

    /// Grade the pieces fell into (ID, @N alias, or partial ID)
    #[arg(long, short = 'g')]
    pub grade: String,

    /// Defect that caused the grade; omit for clean pieces
    #[arg(long, short = 'd')]
    pub defect: Option<String>,

    /// Number of pieces
    #[arg(long, short = 'n')]
    pub pieces: u32,

    /// Set the tally to this count instead of adding to it
    #[arg(long)]
    pub set: bool,
}

pub fn run(cmd: InspCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        InspCommands::List(args) => run_list(args, global),
        InspCommands::New(args) => run_new(args, global),
        InspCommands::Show(args) => run_show(args, global),
        InspCommands::Edit(args) => run_edit(args, global),
        InspCommands::Result(ResultCommands::Add(args)) => run_result_add(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut inspections: Vec<Inspection> = loader::load_all_of(&project, EntityPrefix::Insp)?;
    let products: Vec<Product> = loader::load_all_of(&project, EntityPrefix::Prod)?;

    let product_filter = match &args.product {
        Some(reference) => {
            let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, reference)?;
            Some(product.id)
        }
        None => None,
    };

    inspections.retain(|i| {
        let kind_match = args.kind.map_or(true, |k| i.kind == k);
        let product_match = product_filter.as_ref().map_or(true, |p| &i.product == p);
        let search_match = args.search.as_ref().map_or(true, |search| {
            i.lot.to_lowercase().contains(&search.to_lowercase())
        });
        kind_match && product_match && search_match
    });

    // Most recent first
    inspections.sort_by(|a, b| b.date.cmp(&a.date).then(a.lot.cmp(&b.lot)));

    if args.count {
        println!("{}", inspections.len());
        return Ok(());
    }

    if inspections.is_empty() {
        match global.format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No inspections found.");
                if !global.quiet {
                    println!();
                    println!(
                        "Record one with: {}",
                        style("sgt insp new LOT --market ID --product ID").yellow()
                    );
                }
            }
        }
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(inspections.iter().map(|i| i.id.to_string()));
    let _ = short_ids.save(&project);

    let product_name = |insp: &Inspection| -> String {
        products
            .iter()
            .find(|p| p.id == insp.product)
            .map_or_else(|| insp.product.to_string(), |p| p.name.clone())
    };

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&inspections).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&inspections).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,lot,kind,date,product,pieces");
            for i in &inspections {
                let short_id = short_ids
                    .get_short_id(&i.id.to_string())
                    .map_or(String::new(), |n| n.to_string());
                println!(
                    "{},{},{},{},{},{},{}",
                    short_id,
                    i.id,
                    escape_csv(&i.lot),
                    i.kind,
                    i.date,
                    escape_csv(&product_name(i)),
                    i.pieces_counted()
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<8} {:<17} {:<12} {:<17} {:<11} {:<16} {:>6}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("LOT").bold(),
                style("KIND").bold(),
                style("DATE").bold(),
                style("PRODUCT").bold(),
                style("PIECES").bold()
            );
            println!("{}", "-".repeat(94));
            for i in &inspections {
                let short_id = short_ids
                    .get_short_id(&i.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "{:<8} {:<17} {:<12} {:<17} {:<11} {:<16} {:>6}",
                    style(&short_id).cyan(),
                    display_id(&i.id, global),
                    truncate_str(&i.lot, 10),
                    i.kind.to_string(),
                    i.date.to_string(),
                    truncate_str(&product_name(i), 14),
                    i.pieces_counted()
                );
            }
            if !global.quiet {
                println!();
                println!("{} inspection(s) found.", style(inspections.len()).cyan());
            }
        }
        OutputFormat::Id => {
            for i in &inspections {
                println!("{}", i.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | Lot | Kind | Date | Product | Pieces |");
            println!("|---|---|---|---|---|---|---|");
            for i in &inspections {
                let short_id = short_ids
                    .get_short_id(&i.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    short_id,
                    display_id(&i.id, global),
                    i.lot,
                    i.kind,
                    i.date,
                    product_name(i),
                    i.pieces_counted()
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

    let existing: Vec<Inspection> = loader::load_all_of(&project, EntityPrefix::Insp)?;
    if let Some(dup) = existing.iter().find(|i| i.lot == args.lot) {
        return Err(miette::miette!(
            "Lot '{}' is already covered by inspection {}",
            args.lot,
            dup.id
        ));
    }

    let (_, market) = find_one::<Market>(&project, EntityPrefix::Mkt, &args.market)?;
    let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, &args.product)?;

    let mut insp = Inspection::new(
        args.kind,
        args.lot,
        market.id.clone(),
        product.id.clone(),
        config.author(),
    );
    if let Some(shift) = args.shift {
        insp.shift = shift;
    }
    if let Some(supervisor) = args.supervisor {
        insp.supervisor = supervisor;
    }
    if let Some(responsible) = args.responsible {
        insp.responsible = responsible;
    }
    if let Some(pieces) = args.pieces {
        insp.pieces_planned = pieces;
    }

    let file_path = project.entity_path(EntityPrefix::Insp, &insp.id);
    let yaml = serde_yml::to_string(&insp).into_diagnostic()?;
    fs::write(&file_path, yaml).into_diagnostic()?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(insp.id.to_string());
    let _ = short_ids.save(&project);

    println!(
        "{} Created inspection {} {} (lot {})",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        insp.id,
        insp.lot
    );
    if !global.quiet {
        println!("   {}", style(file_path.display()).dim());
        println!();
        println!(
            "Tally pieces with: {}",
            style(format!(
                "sgt insp result add @{} --grade ID --pieces N",
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
    let (_, insp) = find_one::<Inspection>(&project, EntityPrefix::Insp, &args.id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&insp).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", insp.id),
        _ => {
            print!("{}", serde_yml::to_string(&insp).into_diagnostic()?);

            if !insp.results.is_empty() {
                let grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
                let defects: Vec<Defect> = loader::load_all_of(&project, EntityPrefix::Dfct)?;

                println!();
                println!("{}", style("Tallies:").bold());
                for r in &insp.results {
                    let grade_name = grades
                        .iter()
                        .find(|g| g.id == r.grade)
                        .map_or_else(|| r.grade.to_string(), |g| g.name.clone());
                    let defect_name = r.defect.as_ref().map(|d| {
                        defects
                            .iter()
                            .find(|x| x.id == *d)
                            .map_or_else(|| d.to_string(), |x| x.name.clone())
                    });
                    match defect_name {
                        Some(defect) => {
                            println!("  {:>5}  {} ({})", r.pieces, grade_name, defect)
                        }
                        None => println!("  {:>5}  {}", r.pieces, grade_name),
                    }
                }
                println!(
                    "  {:>5}  {}",
                    style(insp.pieces_counted()).cyan(),
                    style("total").dim()
                );
            }
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(&project);
    let (path, _) = find_one::<Inspection>(&project, EntityPrefix::Insp, &args.id)?;

    config.run_editor(&path).into_diagnostic()?;
    Ok(())
}

fn run_result_add(args: ResultAddArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let (path, mut insp) = find_one::<Inspection>(&project, EntityPrefix::Insp, &args.id)?;
    let (_, grade) = find_one::<Grade>(&project, EntityPrefix::Grd, &args.grade)?;

    if grade.product != insp.product {
        return Err(GradingError::ProductMismatch {
            grade: grade.id.to_string(),
            expected: insp.product.to_string(),
        }
        .into());
    }

    let defect = match &args.defect {
        Some(reference) => {
            let (_, defect) = find_one::<Defect>(&project, EntityPrefix::Dfct, reference)?;
            Some(defect.id)
        }
        None => None,
    };

    if args.set {
        insp.set_result(grade.id, defect, args.pieces);
    } else {
        insp.add_result(grade.id, defect, args.pieces);
    }

    let yaml = serde_yml::to_string(&insp).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    let counted = insp.pieces_counted();
    println!(
        "{} Tallied {} piece(s) into {} ({} of {} counted)",
        style("✓").green(),
        args.pieces,
        grade.name,
        style(counted).cyan(),
        if insp.pieces_planned > 0 {
            insp.pieces_planned.to_string()
        } else {
            "?".to_string()
        }
    );

    Ok(())
}
