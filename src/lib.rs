//! The recicart library turns a recipe's ingredient list into grocery cart
//! contents: it extracts the ingredients, normalizes them into search terms,
//! picks a product for each and works out how many units to buy.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod fetch;
pub mod generate;
pub mod matcher;
pub mod measure;
pub mod normalize;
pub mod pipeline;
pub mod quantity;
pub mod recipe;
pub mod report;

/// Something that went wrong while resolving ingredients.
///
/// None of these stop a run; each one is recorded next to the outcome it
/// degraded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Degradation {
    /// No ingredients could be read from the recipe page
    ExtractionEmpty,
    /// The model could not normalize an ingredient, the raw text was searched
    NormalizationDegraded,
    /// The model answer named no product, the first candidate was taken
    SelectionAmbiguous,
    /// The search found no products
    SelectionImpossible,
    /// A collaborator (web page, store) could not be reached
    CollaboratorUnavailable,
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            Self::ExtractionEmpty => "no ingredients found in recipe, default list used",
            Self::NormalizationDegraded => "search term not normalized, raw ingredient used",
            Self::SelectionAmbiguous => "no product number in model answer, first product taken",
            Self::SelectionImpossible => "no products found",
            Self::CollaboratorUnavailable => "collaborator unavailable",
        };
        formatter.write_str(description)
    }
}

pub use matcher::{SelectionDecision, SelectionMethod, select_best};
pub use measure::parse_weight;
pub use normalize::normalize;
pub use pipeline::{shop, shopping_list};
pub use quantity::plan;
pub use recipe::extract_ingredients;
