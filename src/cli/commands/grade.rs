//! `sgt grade` command - Grade hierarchy management
//!
//! Grades belong to a product and carry a rank, where rank 1 is the
//! highest quality level. Agreement reports compare ranks, so two
//! grades of the same product with the same rank are treated as equal.

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
use crate::entities::{Defect, Grade, Product};

#[derive(Subcommand, Debug)]
pub enum GradeCommands {
    /// List grades
    List(ListArgs),

    /// Create a new grade in a product's hierarchy
    New(NewArgs),

    /// Show a grade's details
    Show(ShowArgs),

    /// Edit a grade in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only grades of this product (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Search in grade names (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Include inactive grades
    #[arg(long)]
    pub inactive: bool,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Grade name
    pub name: String,

    /// Product this grade belongs to (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: String,

    /// Position in the hierarchy, 1 = best
    #[arg(long, short = 'r')]
    pub rank: u32,

    /// Defect that maps to this grade (repeatable)
    #[arg(long, short = 'd')]
    pub defect: Vec<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Grade ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Grade ID, @N alias, or partial ID
    pub id: String,
}

pub fn run(cmd: GradeCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        GradeCommands::List(args) => run_list(args, global),
        GradeCommands::New(args) => run_new(args, global),
        GradeCommands::Show(args) => run_show(args, global),
        GradeCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
    let products: Vec<Product> = loader::load_all_of(&project, EntityPrefix::Prod)?;

    let product_filter = match &args.product {
        Some(reference) => {
            let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, reference)?;
            Some(product.id)
        }
        None => None,
    };

    grades.retain(|g| {
        let active_match = args.inactive || g.active;
        let product_match = product_filter.as_ref().map_or(true, |p| &g.product == p);
        let search_match = args.search.as_ref().map_or(true, |search| {
            g.name.to_lowercase().contains(&search.to_lowercase())
        });
        active_match && product_match && search_match
    });

    // Group by product, then best rank first within each hierarchy
    grades.sort_by(|a, b| a.product.cmp(&b.product).then(a.rank.cmp(&b.rank)));

    if args.count {
        println!("{}", grades.len());
        return Ok(());
    }

    if grades.is_empty() {
        match global.format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No grades found.");
                if !global.quiet {
                    println!();
                    println!(
                        "Create one with: {}",
                        style("sgt grade new NAME --product ID --rank 1").yellow()
                    );
                }
            }
        }
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(grades.iter().map(|g| g.id.to_string()));
    let _ = short_ids.save(&project);

    let product_name = |grade: &Grade| -> String {
        products
            .iter()
            .find(|p| p.id == grade.product)
            .map_or_else(|| grade.product.to_string(), |p| p.name.clone())
    };

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&grades).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&grades).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,name,rank,product,active");
            for g in &grades {
                let short_id = short_ids
                    .get_short_id(&g.id.to_string())
                    .map_or(String::new(), |n| n.to_string());
                println!(
                    "{},{},{},{},{},{}",
                    short_id,
                    g.id,
                    escape_csv(&g.name),
                    g.rank,
                    escape_csv(&product_name(g)),
                    g.active
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<8} {:<17} {:<18} {:>4}  {:<20}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("RANK").bold(),
                style("PRODUCT").bold()
            );
            println!("{}", "-".repeat(72));
            for g in &grades {
                let short_id = short_ids
                    .get_short_id(&g.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "{:<8} {:<17} {:<18} {:>4}  {:<20}",
                    style(&short_id).cyan(),
                    display_id(&g.id, global),
                    truncate_str(&g.name, 16),
                    g.rank,
                    truncate_str(&product_name(g), 18)
                );
            }
            if !global.quiet {
                println!();
                println!("{} grade(s) found.", style(grades.len()).cyan());
            }
        }
        OutputFormat::Id => {
            for g in &grades {
                println!("{}", g.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | Name | Rank | Product |");
            println!("|---|---|---|---|---|");
            for g in &grades {
                let short_id = short_ids
                    .get_short_id(&g.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "| {} | {} | {} | {} | {} |",
                    short_id,
                    display_id(&g.id, global),
                    g.name,
                    g.rank,
                    product_name(g)
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

    if args.rank == 0 {
        return Err(miette::miette!(
            "Rank must be 1 or greater (1 is the best grade)"
        ));
    }

    let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, &args.product)?;

    let mut grade = Grade::new(args.name, product.id.clone(), args.rank, config.author());

    for reference in &args.defect {
        let (_, defect) = find_one::<Defect>(&project, EntityPrefix::Dfct, reference)?;
        grade.defects.push(defect.id);
    }

    let siblings: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
    let tied = siblings
        .iter()
        .any(|g| g.product == product.id && g.rank == grade.rank && g.active);

    let file_path = project.entity_path(EntityPrefix::Grd, &grade.id);
    let yaml = serde_yml::to_string(&grade).into_diagnostic()?;
    fs::write(&file_path, yaml).into_diagnostic()?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(grade.id.to_string());
    let _ = short_ids.save(&project);

    println!(
        "{} Created grade {} {} (rank {} of {})",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        grade.id,
        grade.rank,
        product.name
    );
    if !global.quiet {
        println!("   {}", style(file_path.display()).dim());
    }

    if tied {
        println!(
            "{} Another grade of {} already has rank {}; the two count as equal in reports.",
            style("note:").yellow(),
            product.name,
            grade.rank
        );
    }

    if args.edit {
        config.run_editor(&file_path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let (_, grade) = find_one::<Grade>(&project, EntityPrefix::Grd, &args.id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&grade).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", grade.id),
        _ => {
            print!("{}", serde_yml::to_string(&grade).into_diagnostic()?);
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(&project);
    let (path, _) = find_one::<Grade>(&project, EntityPrefix::Grd, &args.id)?;

    config.run_editor(&path).into_diagnostic()?;
    Ok(())
}
