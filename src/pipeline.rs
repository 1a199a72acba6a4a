//! The pipeline module resolves a shopping list into cart contents, one
//! ingredient at a time: normalize, search, select, then set the quantity.

use log::{info, warn};
use url::Url;

use crate::Degradation;
use crate::catalog::{CandidateProduct, Catalog};
use crate::config::Config;
use crate::fetch::fetch_document;
use crate::generate::GenerationContext;
use crate::matcher::{SelectionMethod, select_best};
use crate::measure::parse_weight;
use crate::normalize::normalize;
use crate::quantity::{QuantityPlan, apply_plan};
use crate::recipe::{
    IngredientSource, RecipeIngredients, default_ingredients, resolve_ingredients,
};

/// Ingredients to shop for and what went wrong while finding them.
#[derive(Clone, PartialEq, Debug)]
pub struct ShoppingList {
    pub recipe: RecipeIngredients,
    pub degradations: Vec<Degradation>,
}

/// What happened to one ingredient.
#[derive(Clone, PartialEq, Debug)]
pub struct IngredientOutcome {
    pub ingredient: String,
    pub search_term: String,
    /// The bought product with its final cart quantity
    pub product: Option<CandidateProduct>,
    pub method: Option<SelectionMethod>,
    pub plan: Option<QuantityPlan>,
    pub degradations: Vec<Degradation>,
}

impl IngredientOutcome {
    fn new(ingredient: &str) -> Self {
        Self {
            ingredient: ingredient.to_owned(),
            search_term: ingredient.to_owned(),
            product: None,
            method: None,
            plan: None,
            degradations: Vec::new(),
        }
    }
}

/// Builds the list of ingredients to buy.
///
/// Without a recipe URL the configured default list is used. With one, the
/// page is fetched and extracted; an unreachable page or a page without
/// ingredients also ends in the default list.
pub async fn shopping_list(recipe_url: Option<&Url>, config: &Config) -> ShoppingList {
    let Some(url) = recipe_url else {
        info!("No recipe given, using the default shopping list");
        return ShoppingList {
            recipe: default_ingredients(&config.default_shopping_list),
            degradations: Vec::new(),
        };
    };

    let html = match fetch_document(url, config.timeout()).await {
        Ok(html) => html,
        Err(error) => {
            warn!("Could not fetch recipe, using the default shopping list: {error:#}");
            return ShoppingList {
                recipe: default_ingredients(&config.default_shopping_list),
                degradations: vec![
                    Degradation::CollaboratorUnavailable,
                    Degradation::ExtractionEmpty,
                ],
            };
        }
    };

    let recipe = resolve_ingredients(&html, &config.exclusions, &config.default_shopping_list);
    let degradations = if recipe.source == IngredientSource::DefaultList {
        warn!("No ingredients found at {url}, using the default shopping list");
        vec![Degradation::ExtractionEmpty]
    } else {
        Vec::new()
    };

    ShoppingList {
        recipe,
        degradations,
    }
}

/// Resolves every ingredient in order. Each one is finished before the next
/// starts, and no failure stops the run.
pub async fn shop<C: Catalog>(
    ctx: &GenerationContext<'_>,
    catalog: &mut C,
    ingredients: &[String],
) -> Vec<IngredientOutcome> {
    let mut outcomes = Vec::with_capacity(ingredients.len());

    for (position, ingredient) in ingredients.iter().enumerate() {
        info!(
            "[{}/{}] Shopping for {ingredient:?}",
            position + 1,
            ingredients.len()
        );
        outcomes.push(resolve_ingredient(ctx, catalog, ingredient).await);
    }

    outcomes
}

/// Runs one ingredient through normalize, search, select and quantity.
pub async fn resolve_ingredient<C: Catalog>(
    ctx: &GenerationContext<'_>,
    catalog: &mut C,
    ingredient: &str,
) -> IngredientOutcome {
    let mut outcome = IngredientOutcome::new(ingredient);

    let search_term = normalize(ctx, ingredient).await;
    if search_term.degraded {
        outcome.degradations.push(Degradation::NormalizationDegraded);
    }
    outcome.search_term = search_term.term;

    let candidates = match catalog.search(&outcome.search_term).await {
        Ok(candidates) => candidates,
        Err(error) => {
            warn!("Search for {:?} failed: {error:#}", outcome.search_term);
            outcome.degradations.push(Degradation::CollaboratorUnavailable);
            return outcome;
        }
    };

    let Some(decision) = select_best(ctx, &candidates, ingredient).await else {
        warn!("No products found for {:?}, skipping", outcome.search_term);
        outcome.degradations.push(Degradation::SelectionImpossible);
        return outcome;
    };
    if decision.method == SelectionMethod::FallbackFirst {
        outcome.degradations.push(Degradation::SelectionAmbiguous);
    }
    outcome.method = Some(decision.method);

    let Some(mut product) = decision.chosen(&candidates).cloned() else {
        return outcome;
    };

    let plan = QuantityPlan::new(
        product.weight_grams(),
        parse_weight(ingredient).unwrap_or(0.0),
    );
    apply_plan(catalog, &mut product, &plan).await;

    outcome.plan = Some(plan);
    outcome.product = Some(product);
    outcome
}
