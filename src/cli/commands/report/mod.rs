//! `sgt report` command - Generate grading reports

mod agreement;
mod grades;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

pub use agreement::AgreementArgs;
pub use grades::GradesArgs;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Scanner agreement across sessions (assertiveness and error rates)
    #[clap(alias = "agr")]
    Agreement(AgreementArgs),

    /// Grade distribution across inspection tallies
    Grades(GradesArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Agreement(args) => agreement::run(args, global),
        ReportCommands::Grades(args) => grades::run(args, global),
    }
}

pub(crate) fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
