//! The normalize module turns raw ingredient lines into store search terms.

use log::{debug, warn};

use crate::constants::NORMALIZE_PROMPT_TEMPLATE;
use crate::generate::{GenerationContext, generate};

/// Search term derived from one ingredient line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SearchTerm {
    pub term: String,
    /// `true` when the model could not be used and `term` is the raw line.
    pub degraded: bool,
}

/// Asks the model to reduce `raw_ingredient` to its base form, e.g.
/// `"4 egg yolks"` to `"egg"`.
///
/// Never fails: on any model error, or an empty answer, the raw ingredient is
/// returned unchanged and marked as degraded.
pub async fn normalize(ctx: &GenerationContext<'_>, raw_ingredient: &str) -> SearchTerm {
    let prompt = NORMALIZE_PROMPT_TEMPLATE.replace("{ingredient}", raw_ingredient);

    match generate(ctx, &prompt).await {
        Ok(term) if !term.is_empty() => {
            debug!("Normalized {raw_ingredient:?} to {term:?}");
            SearchTerm {
                term,
                degraded: false,
            }
        }
        Ok(_) => {
            warn!("Empty search term for {raw_ingredient:?}, searching for it verbatim");
            raw_term(raw_ingredient)
        }
        Err(error) => {
            warn!("Could not normalize {raw_ingredient:?}, searching for it verbatim: {error}");
            raw_term(raw_ingredient)
        }
    }
}

fn raw_term(raw_ingredient: &str) -> SearchTerm {
    SearchTerm {
        term: raw_ingredient.to_owned(),
        degraded: true,
    }
}
