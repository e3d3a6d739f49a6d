//! Grade distribution report
//!
//! Aggregates inspection tallies into piece counts per grade, in hierarchy
//! order, with each grade's share of the total.

use chrono::NaiveDate;
use miette::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{find_one, open_project};
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::entities::{Defect, Grade, Inspection, InspectionKind, Product};

use super::write_output;

#[derive(clap::Args, Debug)]
pub struct GradesArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only inspections of this product (ID, @N alias, or partial ID)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Only inspections of this kind (finished_product, line_grading, rejection_typing)
    #[arg(long, short = 'k')]
    pub kind: Option<InspectionKind>,

    /// Only inspections on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only inspections on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

pub fn run(args: GradesArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut inspections: Vec<Inspection> = loader::load_all_of(&project, EntityPrefix::Insp)?;
    let mut grades: Vec<Grade> = loader::load_all_of(&project, EntityPrefix::Grd)?;
    let products: Vec<Product> = loader::load_all_of(&project, EntityPrefix::Prod)?;

    let product_filter = match &args.product {
        Some(reference) => {
            let (_, product) = find_one::<Product>(&project, EntityPrefix::Prod, reference)?;
            Some(product.id)
        }
        None => None,
    };

    inspections.retain(|i| {
        let product_match = product_filter.as_ref().map_or(true, |p| &i.product == p);
        let kind_match = args.kind.map_or(true, |k| i.kind == k);
        let from_match = args.from.map_or(true, |d| i.date >= d);
        let to_match = args.to.map_or(true, |d| i.date <= d);
        product_match && kind_match && from_match && to_match
    });

    // Tally pieces per grade and per defect across all matching inspections
    let mut by_grade: HashMap<EntityId, u32> = HashMap::new();
    let mut by_defect: HashMap<EntityId, u32> = HashMap::new();
    let mut clean_pieces: u32 = 0;
    let mut total: u32 = 0;
    for insp in &inspections {
        for r in &insp.results {
            *by_grade.entry(r.grade.clone()).or_insert(0) += r.pieces;
            match &r.defect {
                Some(defect) => *by_defect.entry(defect.clone()).or_insert(0) += r.pieces,
                None => clean_pieces += r.pieces,
            }
            total += r.pieces;
        }
    }

    if let Some(p) = &product_filter {
        grades.retain(|g| &g.product == p);
    }
    // Hierarchy order within each product
    grades.sort_by(|a, b| a.product.cmp(&b.product).then(a.rank.cmp(&b.rank)));

    let product_name = |grade: &Grade| -> String {
        products
            .iter()
            .find(|p| p.id == grade.product)
            .map_or_else(|| grade.product.to_string(), |p| p.name.clone())
    };

    let mut output = String::new();
    output.push_str("# Grade Distribution Report\n\n");

    let mut builder = Builder::default();
    builder.push_record(["Product", "Grade", "Rank", "Pieces", "Share"]);

    let share_of_total = |pieces: u32| -> String {
        if total > 0 {
            format!("{:.1}%", f64::from(pieces) / f64::from(total) * 100.0)
        } else {
            "-".to_string()
        }
    };

    for grade in &grades {
        let pieces = by_grade.remove(&grade.id).unwrap_or(0);
        let share = share_of_total(pieces);
        builder.push_record([
            product_name(grade),
            grade.name.clone(),
            grade.rank.to_string(),
            pieces.to_string(),
            share,
        ]);
    }

    // Tallies pointing at grades that no longer exist in the registry
    let orphaned: u32 = by_grade.values().sum();
    if orphaned > 0 {
        builder.push_record([
            "-".to_string(),
            "(unknown grade)".to_string(),
            "-".to_string(),
            orphaned.to_string(),
            share_of_total(orphaned),
        ]);
    }

    output.push_str(&builder.build().with(Style::markdown()).to_string());

    if !by_defect.is_empty() || clean_pieces > 0 {
        let defects: Vec<Defect> = loader::load_all_of(&project, EntityPrefix::Dfct)?;
        let mut defect_rows: Vec<(String, u32)> = by_defect
            .into_iter()
            .map(|(id, pieces)| {
                let name = defects
                    .iter()
                    .find(|d| d.id == id)
                    .map_or_else(|| id.to_string(), |d| d.name.clone());
                (name, pieces)
            })
            .collect();
        defect_rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        if clean_pieces > 0 {
            defect_rows.push(("(none)".to_string(), clean_pieces));
        }

        output.push_str("\n\n## By defect\n\n");
        let mut defect_builder = Builder::default();
        defect_builder.push_record(["Defect", "Pieces", "Share"]);
        for (name, pieces) in &defect_rows {
            defect_builder.push_record([
                name.clone(),
                pieces.to_string(),
                share_of_total(*pieces),
            ]);
        }
        output.push_str(&defect_builder.build().with(Style::markdown()).to_string());
    }

    output.push_str("\n\n## Summary\n\n");
    output.push_str(&format!("- **Inspections:** {}\n", inspections.len()));
    output.push_str(&format!("- **Pieces tallied:** {}\n", total));

    write_output(&output, args.output)?;
    Ok(())
}
