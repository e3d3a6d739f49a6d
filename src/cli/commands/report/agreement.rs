//! Scanner agreement report
//!
//! One row per session with its counts and rates, then a pooled summary
//! that recomputes the rates over the combined counts rather than
//! averaging the per-session percentages.

use chrono::NaiveDate;
use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{find_one, open_project, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::loader;
use crate::core::shortid::ShortIdIndex;
use crate::entities::{Market, Product, ScannerSession};
use crate::grading::SessionStats;

use super::write_output;

#[derive(clap::Args, Debug)]
pub struct AgreementArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only sessions of this product (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Only sessions for this market (ID, @N alias, or partial ID)
    #[arg(long, short = 'm')]
    pub market: Option<String>,

    /// Only sessions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only sessions on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Skip sessions with no recorded items
    #[arg(long)]
    pub skip_empty: bool,
}

pub fn run(args: AgreementArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let short_ids = ShortIdIndex::load(&project);

    let mut sessions: Vec<ScannerSession> = loader::load_all_of(&project, EntityPrefix::Scan)?;
    let products: Vec<Product> = loader::load_all_of(&project, EntityPrefix::Prod)?;

    let product_filter = match &args.product {
        Some(reference) => {
            let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, reference)?;
            Some(product.id)
        }
        None => None,
    };

    let market_filter = match &args.market {
        Some(reference) => {
            let (_, market) = find_one::<Market>(&project, EntityPrefix::Mkt, reference)?;
            Some(market.id)
        }
        None => None,
    };

    sessions.retain(|s| {
        let product_match = product_filter.as_ref().map_or(true, |p| &s.product == p);
        let market_match = market_filter.as_ref().map_or(true, |m| &s.market == m);
        let from_match = args.from.map_or(true, |d| s.date.date_naive() >= d);
        let to_match = args.to.map_or(true, |d| s.date.date_naive() <= d);
        let empty_match = !args.skip_empty || !s.items.is_empty();
        product_match && market_match && from_match && to_match && empty_match
    });

    sessions.sort_by(|a, b| a.date.cmp(&b.date));

    let product_name = |session: &ScannerSession| -> String {
        products
            .iter()
            .find(|p| p.id == session.product)
            .map_or_else(|| session.product.to_string(), |p| p.name.clone())
    };

    let mut output = String::new();
    output.push_str("# Scanner Agreement Report\n\n");

    let mut builder = Builder::default();
    builder.push_record([
        "ID",
        "Date",
        "Supervisor",
        "Product",
        "Pieces",
        "In",
        "Over",
        "Under",
        "Assertiveness",
        "Error",
    ]);

    let per_session: Vec<SessionStats> = sessions.iter().map(|s| s.stats()).collect();

    for (session, stats) in sessions.iter().zip(&per_session) {
        let short = short_ids
            .get_short_id(&session.id.to_string())
            .map_or_else(|| session.id.to_string(), |n| format!("@{}", n));
        builder.push_record([
            short,
            session.date.format("%Y-%m-%d").to_string(),
            truncate_str(&session.supervisor, 16),
            truncate_str(&product_name(session), 16),
            stats.pieces_evaluated.to_string(),
            stats.pieces_in_grade.to_string(),
            stats.pieces_over_grade.to_string(),
            stats.pieces_under_grade.to_string(),
            format!("{:.1}%", stats.assertiveness * 100.0),
            format!("{:.1}%", stats.error * 100.0),
        ]);
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());

    let pooled = SessionStats::pooled(per_session);

    output.push_str("\n\n## Summary\n\n");
    output.push_str(&format!("- **Sessions:** {}\n", sessions.len()));
    output.push_str(&format!(
        "- **Pieces evaluated:** {}\n",
        pooled.pieces_evaluated
    ));
    output.push_str(&format!("- **In grade:** {}\n", pooled.pieces_in_grade));
    output.push_str(&format!("- **Over grade:** {}\n", pooled.pieces_over_grade));
    output.push_str(&format!(
        "- **Under grade:** {}\n",
        pooled.pieces_under_grade
    ));
    output.push_str(&format!(
        "- **Pooled assertiveness:** {:.1}%\n",
        pooled.assertiveness * 100.0
    ));
    output.push_str(&format!(
        "- **Pooled error:** {:.1}%\n",
        pooled.error * 100.0
    ));

    write_output(&output, args.output)?;
    Ok(())
}
