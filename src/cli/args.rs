//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    defect::DefectCommands,
    grade::GradeCommands,
    init::InitArgs,
    insp::InspCommands,
    market::MarketCommands,
    product::ProductCommands,
    report::ReportCommands,
    scan::ScanCommands,
};

#[derive(Parser)]
#[command(name = "sgt")]
#[command(author, version, about = "Sierra Grading Toolkit")]
#[command(
    long_about = "A Unix-style toolkit for recording lumber grading inspections and scanner agreement studies as plain text files under git version control."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Show full IDs in listings instead of shortened ones
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .sgt/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new SGT project
    Init(InitArgs),

    /// Market registry management
    #[command(subcommand)]
    Market(MarketCommands),

    /// Product registry management
    #[command(subcommand)]
    Product(ProductCommands),

    /// Grade hierarchy management (ranked grades per product)
    #[command(subcommand)]
    Grade(GradeCommands),

    /// Defect catalog management
    #[command(subcommand)]
    Defect(DefectCommands),

    /// Grading inspection management
    #[command(subcommand)]
    Insp(InspCommands),

    /// Scanner agreement session management
    #[command(subcommand)]
    Scan(ScanCommands),

    /// Generate grading reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
