//! `sgt defect` command - Defect catalog management

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
use crate::entities::Defect;

#[derive(Subcommand, Debug)]
pub enum DefectCommands {
    /// List defects
    List(ListArgs),

    /// Register a new defect type
    New(NewArgs),

    /// Show a defect's details
    Show(ShowArgs),

    /// Edit a defect in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and description (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Include inactive defects
    #[arg(long)]
    pub inactive: bool,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Defect name
    pub name: String,

    /// What the defect looks like and how to call it
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Defect ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Defect ID, @N alias, or partial ID
    pub id: String,
}

pub fn run(cmd: DefectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DefectCommands::List(args) => run_list(args, global),
        DefectCommands::New(args) => run_new(args, global),
        DefectCommands::Show(args) => run_show(args, global),
        DefectCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut defects: Vec<Defect> = loader::load_all_of(&project, EntityPrefix::Dfct)?;

    defects.retain(|d| {
        let active_match = args.inactive || d.active;
        let search_match = args.search.as_ref().map_or(true, |search| {
            let s = search.to_lowercase();
            d.name.to_lowercase().contains(&s) || d.description.to_lowercase().contains(&s)
        });
        active_match && search_match
    });

    defects.sort_by(|a, b| a.name.cmp(&b.name));

    if args.count {
        println!("{}", defects.len());
        return Ok(());
    }

    if defects.is_empty() {
        match global.format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No defects found.");
                if !global.quiet {
                    println!();
                    println!("Register one with: {}", style("sgt defect new NAME").yellow());
                }
            }
        }
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(defects.iter().map(|d| d.id.to_string()));
    let _ = short_ids.save(&project);

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&defects).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&defects).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,name,description,active");
            for d in &defects {
                let short_id = short_ids
                    .get_short_id(&d.id.to_string())
                    .map_or(String::new(), |n| n.to_string());
                println!(
                    "{},{},{},{},{}",
                    short_id,
                    d.id,
                    escape_csv(&d.name),
                    escape_csv(&d.description),
                    d.active
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<8} {:<17} {:<20} {:<32}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("DESCRIPTION").bold()
            );
            println!("{}", "-".repeat(78));
            for d in &defects {
                let short_id = short_ids
                    .get_short_id(&d.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "{:<8} {:<17} {:<20} {:<32}",
                    style(&short_id).cyan(),
                    display_id(&d.id, global),
                    truncate_str(&d.name, 18),
                    truncate_str(&d.description, 30)
                );
            }
            if !global.quiet {
                println!();
                println!("{} defect(s) found.", style(defects.len()).cyan());
            }
        }
        OutputFormat::Id => {
            for d in &defects {
                println!("{}", d.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | Name | Description |");
            println!("|---|---|---|---|");
            for d in &defects {
                let short_id = short_ids
                    .get_short_id(&d.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "| {} | {} | {} | {} |",
                    short_id,
                    display_id(&d.id, global),
                    d.name,
                    d.description
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

    let defect = Defect::new(args.name, args.description, config.author());

    let file_path = project.entity_path(EntityPrefix::Dfct, &defect.id);
    let yaml = serde_yml::to_string(&defect).into_diagnostic()?;
    fs::write(&file_path, yaml).into_diagnostic()?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(defect.id.to_string());
    let _ = short_ids.save(&project);

    println!(
        "{} Created defect {} {}",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        defect.id
    );
    if !global.quiet {
        println!("   {}", style(file_path.display()).dim());
    }

    if args.edit {
        config.run_editor(&file_path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let (_, defect) = find_one::<Defect>(&project, EntityPrefix::Dfct, &args.id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&defect).into_diagnostic()?
            );
        }
        OutputFormat::Id => println!("{}", defect.id),
        _ => {
            print!("{}", serde_yml::to_string(&defect).into_diagnostic()?);
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(&project);
    let (path, _) = find_one::<Defect>(&project, EntityPrefix::Dfct, &args.id)?;

    config.run_editor(&path).into_diagnostic()?;
    Ok(())
}
