//! The recipe module pulls ingredient lines out of a recipe page, first from
//! its embedded schema.org markup and then, failing that, from the HTML itself.

use log::{debug, info};
use scraper::{Html, Selector as ScraperSelector};
use serde_json::Value;

const RECIPE_TYPE: &str = "Recipe";
const PRIMARY_INGREDIENTS_FIELD: &str = "recipeIngredient";
const SECONDARY_INGREDIENTS_FIELD: &str = "ingredients";

/// Where a recipe's ingredient list came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IngredientSource {
    /// schema.org `Recipe` markup in a JSON-LD block
    StructuredData,
    /// `li` elements under an ingredient-classed container
    HtmlHeuristic,
    /// The configured default shopping list
    DefaultList,
}

/// Ingredient lines of one recipe in page order.
#[derive(Clone, PartialEq, Debug)]
pub struct RecipeIngredients {
    pub ingredients: Vec<String>,
    pub source: IngredientSource,
}

/// Parses every `<script type="application/ld+json">` block of the document.
///
/// A block holding a JSON array yields each of its elements as a separate block.
/// Blocks that are not valid JSON are skipped.
#[must_use]
pub fn structured_data_blocks(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let Ok(selector) = ScraperSelector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for script in document.select(&selector) {
        let text = script.text().collect::<String>();
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Array(items)) => blocks.extend(items),
            Ok(block) => blocks.push(block),
            Err(error) => debug!("Skipping unparseable JSON-LD block: {error}"),
        }
    }

    blocks
}

/// Returns the ingredient lines of the first `Recipe` object among `blocks`.
///
/// Top-level blocks are searched first, then the properties of each block one
/// level down. The result is empty when no recipe or no ingredient list is found.
#[must_use]
pub fn extract_ingredients(blocks: &[Value], exclusions: &[String]) -> Vec<String> {
    let Some(recipe) = find_recipe(blocks) else {
        debug!("No Recipe object in {} structured data blocks", blocks.len());
        return Vec::new();
    };

    let lines = ingredient_lines(recipe);
    filter_excluded(lines, exclusions)
}

fn find_recipe(blocks: &[Value]) -> Option<&Value> {
    blocks
        .iter()
        .find(|block| is_recipe(block))
        .or_else(|| blocks.iter().find_map(find_nested_recipe))
}

fn find_nested_recipe(block: &Value) -> Option<&Value> {
    let properties = block.as_object()?;

    properties.values().find_map(|value| match value {
        Value::Object(_) if is_recipe(value) => Some(value),
        // `@graph` and friends hold their objects in arrays
        Value::Array(items) => items.iter().find(|item| is_recipe(item)),
        _ => None,
    })
}

fn is_recipe(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind == RECIPE_TYPE,
        Some(Value::Array(kinds)) => kinds
            .iter()
            .any(|kind| kind.as_str() == Some(RECIPE_TYPE)),
        _ => false,
    }
}

fn ingredient_lines(recipe: &Value) -> Vec<String> {
    let list = [PRIMARY_INGREDIENTS_FIELD, SECONDARY_INGREDIENTS_FIELD]
        .iter()
        .find_map(|field| recipe.get(field).and_then(Value::as_array));

    list.map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(|line| line.trim().to_owned())
            .collect()
    })
    .unwrap_or_default()
}

/// Collects ingredient lines from the markup of recipe plugins that do not
/// publish structured data: list items under any element whose class
/// mentions `ingredient`.
#[must_use]
pub fn extract_ingredients_from_html(html: &str, exclusions: &[String]) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = ScraperSelector::parse(r#"[class*="ingredient"] li"#) else {
        return Vec::new();
    };

    let mut lines: Vec<String> = Vec::new();
    for item in document.select(&selector) {
        let line = item.text().collect::<Vec<_>>().join(" ");
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        // nested ingredient containers match the same li twice
        if !lines.contains(&line) {
            lines.push(line);
        }
    }

    filter_excluded(lines, exclusions)
}

/// Drops empty lines and lines containing any exclusion word, ignoring case.
#[must_use]
pub fn filter_excluded(lines: Vec<String>, exclusions: &[String]) -> Vec<String> {
    let exclusions: Vec<String> = exclusions
        .iter()
        .map(|word| word.to_lowercase())
        .filter(|word| !word.is_empty())
        .collect();

    lines
        .into_iter()
        .filter(|line| {
            if line.trim().is_empty() {
                return false;
            }
            let lowered = line.to_lowercase();
            match exclusions.iter().find(|word| lowered.contains(word.as_str())) {
                Some(word) => {
                    debug!("Excluding ingredient {line:?} (matches {word:?})");
                    false
                }
                None => true,
            }
        })
        .collect()
}

/// Runs the whole extraction chain over a fetched page: structured data,
/// then the HTML heuristic, then `default_list`.
#[must_use]
pub fn resolve_ingredients(
    html: &str,
    exclusions: &[String],
    default_list: &[String],
) -> RecipeIngredients {
    let structured = extract_ingredients(&structured_data_blocks(html), exclusions);
    if !structured.is_empty() {
        info!("Found {} ingredients in structured data", structured.len());
        return RecipeIngredients {
            ingredients: structured,
            source: IngredientSource::StructuredData,
        };
    }

    let heuristic = extract_ingredients_from_html(html, exclusions);
    if !heuristic.is_empty() {
        info!("Found {} ingredients in page markup", heuristic.len());
        return RecipeIngredients {
            ingredients: heuristic,
            source: IngredientSource::HtmlHeuristic,
        };
    }

    default_ingredients(default_list)
}

/// The configured default list, used as the last resort.
#[must_use]
pub fn default_ingredients(default_list: &[String]) -> RecipeIngredients {
    RecipeIngredients {
        ingredients: default_list.to_vec(),
        source: IngredientSource::DefaultList,
    }
}
