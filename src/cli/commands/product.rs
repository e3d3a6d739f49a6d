//! `sgt product` command - Product registry management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{
    display_id, escape_csv, find_one, format_short_id, open_project, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::loader;
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::entities::{Grade, Product};

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products
    List(ListArgs),

    /// Register a new product
    New(NewArgs),

    /// Show a product and its grade hierarchy
    Show(ShowArgs),

    /// Edit a product in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and description (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Include inactive products
    #[arg(long)]
    pub inactive: bool,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product name
    pub name: String,

    /// Optional notes
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Product ID, @N alias, or partial ID
    pub id: String,
}

pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::New(args) => run_new(args, global),
        ProductCommands::Show(args) => run_show(args, global),
        ProductCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut products: Vec<Product> = loader::load_all_of(&project, EntityPrefix::Prod)?;
    let grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;

    products.retain(|p| {
        let active_match = args.inactive || p.active;
        let search_match = args.search.as_ref().map_or(true, |search| {
            let s = search.to_lowercase();
            p.name.to_lowercase().contains(&s)
                || p.description
                    .as_deref()
                    .map_or(false, |d| d.to_lowercase().contains(&s))
        });
        active_match && search_match
    });

    products.sort_by(|a, b| a.name.cmp(&b.name));

    if args.count {
        println!("{}", products.len());
        return Ok(());
    }

    if products.is_empty() {
        match global.format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No products found.");
                if !global.quiet {
                    println!();
                    println!(
                        "Register one with: {}",
                        style("sgt product new NAME").yellow()
                    );
                }
            }
        }
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(products.iter().map(|p| p.id.to_string()));
    let _ = short_ids.save(&project);

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&products).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&products).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,name,grades,active");
            for p in &products {
                let grade_count = grades.iter().filter(|g| g.product == p.id).count();
                let short_id = short_ids
                    .get_short_id(&p.id.to_string())
                    .map_or(String::new(), |n| n.to_string());
                println!(
                    "{},{},{},{},{}",
                    short_id,
                    p.id,
                    escape_csv(&p.name),
                    grade_count,
                    p.active
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<8} {:<17} {:<28} {:<7} {:<8}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("GRADES").bold(),
                style("ACTIVE").bold()
            );
            println!("{}", "-".repeat(72));
            for p in &products {
                let grade_count = grades.iter().filter(|g| g.product == p.id).count();
                let short_id = short_ids
                    .get_short_id(&p.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "{:<8} {:<17} {:<28} {:<7} {:<8}",
                    style(&short_id).cyan(),
                    display_id(&p.id, global),
                    truncate_str(&p.name, 26),
                    grade_count,
                    if p.active { "yes" } else { "no" }
                );
            }
            if !global.quiet {
                println!();
                println!("{} product(s) found.", style(products.len()).cyan());
            }
        }
        OutputFormat::Id => {
            for p in &products {
                println!("{}", p.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | Name | Grades | Active |");
            println!("|---|---|---|---|---|");
            for p in &products {
                let grade_count = grades.iter().filter(|g| g.product == p.id).count();
                let short_id = short_ids
                    .get_short_id(&p.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "| {} | {} | {} | {} | {} |",
                    short_id,
                    display_id(&p.id, global),
                    p.name,
                    grade_count,
                    p.active
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

    let mut product = Product::new(args.name, config.author());
    product.description = args.description;

    let file_path = project.entity_path(EntityPrefix::Prod, &product.id);
    let yaml = serde_yml::to_string(&product).into_diagnostic()?;
    fs::write(&file_path, yaml).into_diagnostic()?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(product.id.to_string());
    let _ = short_ids.save(&project);

    println!(
        "{} Created product {} {}",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        product.id
    );
    if !global.quiet {
        println!("   {}", style(file_path.display()).dim());
        println!(
            "   Add grades with {}",
            style(format!("sgt grade new NAME --product {} --rank 1", product.id)).yellow()
        );
    }

    if args.edit {
        config.run_editor(&file_path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, &args.id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&product).into_diagnostic()?
            );
        }
        OutputFormat::Id => println!("{}", product.id),
        _ => {
            print!("{}", serde_yml::to_string(&product).into_diagnostic()?);

            // Append the hierarchy so graders see ranks at a glance
            let mut grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
            grades.retain(|g| g.product == product.id);
            grades.sort_by_key(|g| g.rank);

            if !grades.is_empty() {
                println!();
                println!("{}", style("Grade hierarchy (1 = best):").bold());
                for g in &grades {
                    println!("  {:>3}  {}  {}", g.rank, format_short_id(&g.id), g.name);
                }
            }
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(&project);
    let (path, _) = find_one::<Product>(&project, EntityPrefix::Prod, &args.id)?;

    config.run_editor(&path).into_diagnostic()?;
    Ok(())
}
