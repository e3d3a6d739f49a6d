//! `sgt market` command - Market registry management

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
use crate::entities::Market;

#[derive(Subcommand, Debug)]
pub enum MarketCommands {
    /// List markets
    List(ListArgs),

    /// Register a new market
    New(NewArgs),

    /// Show a market's details
    Show(ShowArgs),

    /// Edit a market in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and description (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Include inactive markets
    #[arg(long)]
    pub inactive: bool,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Market name
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
    /// Market ID, @N alias, or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Market ID, @N alias, or partial ID
    pub id: String,
}

pub fn run(cmd: MarketCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MarketCommands::List(args) => run_list(args, global),
        MarketCommands::New(args) => run_new(args, global),
        MarketCommands::Show(args) => run_show(args, global),
        MarketCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut markets: Vec<Market> =
        loader::load_all_of(&project, EntityPrefix::Mkt)?;

    markets.retain(|m| {
        let active_match = args.inactive || m.active;
        let search_match = args.search.as_ref().map_or(true, |search| {
            let s = search.to_lowercase();
            m.name.to_lowercase().contains(&s)
                || m.description
                    .as_deref()
                    .map_or(false, |d| d.to_lowercase().contains(&s))
        });
        active_match && search_match
    });

    markets.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(limit) = args.limit {
        markets.truncate(limit);
    }

    if args.count {
        println!("{}", markets.len());
        return Ok(());
    }

    if markets.is_empty() {
        match global.format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No markets found.");
                if !global.quiet {
                    println!();
                    println!("Register one with: {}", style("sgt market new NAME").yellow());
                }
            }
        }
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(markets.iter().map(|m| m.id.to_string()));
    let _ = short_ids.save(&project);

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&markets).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&markets).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,name,active");
            for m in &markets {
                let short_id = short_ids
                    .get_short_id(&m.id.to_string())
                    .map_or(String::new(), |n| n.to_string());
                println!(
                    "{},{},{},{}",
                    short_id,
                    m.id,
                    escape_csv(&m.name),
                    m.active
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<8} {:<17} {:<28} {:<8}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("ACTIVE").bold()
            );
            println!("{}", "-".repeat(64));
            for m in &markets {
                let short_id = short_ids
                    .get_short_id(&m.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "{:<8} {:<17} {:<28} {:<8}",
                    style(&short_id).cyan(),
                    display_id(&m.id, global),
                    truncate_str(&m.name, 26),
                    if m.active { "yes" } else { "no" }
                );
            }
            if !global.quiet {
                println!();
                println!("{} market(s) found.", style(markets.len()).cyan());
            }
        }
        OutputFormat::Id => {
            for m in &markets {
                println!("{}", m.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | Name | Active |");
            println!("|---|---|---|---|");
            for m in &markets {
                let short_id = short_ids
                    .get_short_id(&m.id.to_string())
                    .map_or(String::new(), |n| format!("@{}", n));
                println!(
                    "| {} | {} | {} | {} |",
                    short_id,
                    display_id(&m.id, global),
                    m.name,
                    m.active
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

    let mut market = Market::new(args.name, config.author());
    market.description = args.description;

    let file_path = project.entity_path(EntityPrefix::Mkt, &market.id);
    let yaml = serde_yml::to_string(&market).into_diagnostic()?;
    fs::write(&file_path, yaml).into_diagnostic()?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(market.id.to_string());
    let _ = short_ids.save(&project);

    println!(
        "{} Created market {} {}",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        market.id
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
    let (_, market) = find_one::<Market>(&project, EntityPrefix::Mkt, &args.id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&market).into_diagnostic()?
            );
        }
        OutputFormat::Id => println!("{}", market.id),
        _ => {
            print!("{}", serde_yml::to_string(&market).into_diagnostic()?);
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(&project);
    let (path, _) = find_one::<Market>(&project, EntityPrefix::Mkt, &args.id)?;

    config.run_editor(&path).into_diagnostic()?;
    Ok(())
}
