//! The report module writes the outcome of a shopping run to a Markdown file.

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::pipeline::{IngredientOutcome, ShoppingList};
use crate::recipe::IngredientSource;

/// Renders the run as Markdown: a header, then one section per ingredient.
#[must_use]
pub fn render(list: &ShoppingList, outcomes: &[IngredientOutcome]) -> String {
    let source = match list.recipe.source {
        IngredientSource::StructuredData => "recipe structured data",
        IngredientSource::HtmlHeuristic => "recipe page markup",
        IngredientSource::DefaultList => "default shopping list",
    };

    let mut report = format!(
        "# Shopping report\nGenerated {}\nIngredients from {source}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    for degradation in &list.degradations {
        report.push_str(&format!("- {degradation}\n"));
    }
    report.push('\n');

    for outcome in outcomes {
        report.push_str(&render_outcome(outcome));
    }

    report
}

fn render_outcome(outcome: &IngredientOutcome) -> String {
    let mut lines = vec![
        format!("## {}", outcome.ingredient),
        format!("Search term: {}", outcome.search_term),
    ];

    lines.push(match &outcome.product {
        Some(product) => format!("Product: {} x {}", product.quantity, product.title),
        None => "Product: none".to_owned(),
    });
    if let Some(method) = outcome.method {
        lines.push(format!("Selected by: {method}"));
    }
    if let Some(plan) = outcome.plan {
        lines.push(format!(
            "Quantity: {} (unit {} g, required {} g)",
            plan.optimal_count, plan.unit_weight_grams, plan.required_weight_grams
        ));
    }
    lines.extend(
        outcome
            .degradations
            .iter()
            .map(|degradation| format!("- {degradation}")),
    );

    format!("{}\n\n", lines.join("\n"))
}

/// Writes the rendered report to `output_path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_report(
    output_path: &str,
    list: &ShoppingList,
    outcomes: &[IngredientOutcome],
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(output_path)
        .with_context(|| format!("Failed to open report file: {output_path}"))?;

    file.write_all(render(list, outcomes).as_bytes())?;

    info!("Wrote report for {} ingredients to {output_path}", outcomes.len());
    Ok(())
}
