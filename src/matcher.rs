//! The matcher module decides which candidate product to buy for a shopping
//! requirement.
//!
//! When the requirement states a weight the choice is purely numeric and the
//! model is never asked. Otherwise the model compares the candidates and its
//! free-text answer is read by an ordered chain of [`IndexStrategy`] parsers.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::CandidateProduct;
use crate::constants::{NOT_AVAILABLE, SELECT_PROMPT_TEMPLATE};
use crate::generate::{GenerationContext, generate};
use crate::measure::parse_weight;

static LAST_LINE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[*#\s]*(\d+)(?:\.\d*)?[*.\s]*$").expect("Failed to compile LAST_LINE regex")
});

static CHOICE_PHRASE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)final\s+choice\s*:?\s*\**\s*(?:product\s*)?#?\s*(\d+)")
        .expect("Failed to compile CHOICE_PHRASE regex")
});

static PRODUCT_PHRASE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bproduct\s*#?\s*(\d+)").expect("Failed to compile PRODUCT_PHRASE regex")
});

static BARE_DIGIT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9]$").expect("Failed to compile BARE_DIGIT regex"));

static INTEGER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("Failed to compile INTEGER regex"));

static RECOMMEND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)recommend(?:s|ed)?\s+product\s*#?\s*(\d+)")
        .expect("Failed to compile RECOMMEND regex")
});

/// How a candidate was chosen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SelectionMethod {
    /// Closest weight to the stated requirement, model not consulted
    DeterministicWeight,
    /// Picked by the model
    LlmArbitration,
    /// The model gave no usable answer, the first candidate was taken
    FallbackFirst,
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::DeterministicWeight => "deterministic weight",
            Self::LlmArbitration => "LLM arbitration",
            Self::FallbackFirst => "first candidate fallback",
        };
        formatter.write_str(name)
    }
}

/// The candidate chosen for one ingredient.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SelectionDecision {
    /// Zero-based position in the candidate list
    pub index: usize,
    pub method: SelectionMethod,
}

impl SelectionDecision {
    /// The chosen candidate out of the list the decision was made on.
    #[must_use]
    pub fn chosen<'a>(&self, candidates: &'a [CandidateProduct]) -> Option<&'a CandidateProduct> {
        candidates.get(self.index)
    }
}

/// Chooses the candidate to buy for `requirement`.
///
/// Returns `None` only for an empty candidate list. Model failures never
/// surface here: they end in [`SelectionMethod::FallbackFirst`].
pub async fn select_best(
    ctx: &GenerationContext<'_>,
    candidates: &[CandidateProduct],
    requirement: &str,
) -> Option<SelectionDecision> {
    if candidates.is_empty() {
        return None;
    }

    if let Some(required_grams) = parse_weight(requirement) {
        let index = select_by_weight(candidates, required_grams)?;
        info!("Picked product {} by weight for {requirement:?}", index + 1);
        return Some(SelectionDecision {
            index,
            method: SelectionMethod::DeterministicWeight,
        });
    }

    let prompt = selection_prompt(candidates, requirement);
    match generate(ctx, &prompt).await {
        Ok(response) => {
            if let Some(index) = parse_choice(&response, candidates.len()) {
                check_recommendation(&response, index);
                info!("Model picked product {} for {requirement:?}", index + 1);
                return Some(SelectionDecision {
                    index,
                    method: SelectionMethod::LlmArbitration,
                });
            }
            warn!("No product number in model answer for {requirement:?}");
        }
        Err(error) => warn!("Model unavailable for {requirement:?}: {error}"),
    }

    Some(SelectionDecision {
        index: 0,
        method: SelectionMethod::FallbackFirst,
    })
}

/// Index of the lightest candidate weighing at least `required_grams`, or of
/// the heaviest candidate when none does. Ties go to the earliest candidate.
#[must_use]
pub fn select_by_weight(candidates: &[CandidateProduct], required_grams: f64) -> Option<usize> {
    let weights: Vec<(usize, f64)> = candidates
        .iter()
        .map(CandidateProduct::weight_grams)
        .enumerate()
        .collect();

    let mut sufficient: Option<(usize, f64)> = None;
    let mut heaviest: Option<(usize, f64)> = None;
    for &(index, weight) in &weights {
        if weight >= required_grams && sufficient.is_none_or(|(_, best)| weight < best) {
            sufficient = Some((index, weight));
        }
        if heaviest.is_none_or(|(_, best)| weight > best) {
            heaviest = Some((index, weight));
        }
    }

    sufficient.or(heaviest).map(|(index, _)| index)
}

/// Numbered listing of the candidates as shown to the model.
#[must_use]
pub fn candidate_listing(candidates: &[CandidateProduct]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(position, candidate)| {
            format!(
                "Product {}: {}\n  Price: {}\n  Compare price: {}\n  Volume: {}\n",
                position + 1,
                candidate.title,
                or_not_available(&candidate.price),
                or_not_available(&candidate.compare_price),
                or_not_available(&candidate.display_volume),
            )
        })
        .collect()
}

fn or_not_available(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn selection_prompt(candidates: &[CandidateProduct], requirement: &str) -> String {
    SELECT_PROMPT_TEMPLATE
        .replace("{requirement}", requirement)
        .replace("{listing}", &candidate_listing(candidates))
}

/// One way of reading a product number out of a model answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndexStrategy {
    /// The last non-empty line is just a number
    LastLineNumber,
    /// "Final choice: N" anywhere, last one first, then "Product N" in the
    /// order they appear
    ProductPhrase,
    /// The whole answer is one digit 1-9
    BareDigit,
    /// Any integer anywhere, last one wins
    AnyInteger,
}

impl IndexStrategy {
    /// Strategies in the order they are tried.
    pub const CHAIN: [Self; 4] = [
        Self::LastLineNumber,
        Self::ProductPhrase,
        Self::BareDigit,
        Self::AnyInteger,
    ];

    /// The one-based product numbers this strategy reads from `response`,
    /// most preferred first.
    #[must_use]
    pub fn numbers(self, response: &str) -> Vec<u64> {
        match self {
            Self::LastLineNumber => response
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .and_then(|line| LAST_LINE_NUMBER_REGEX.captures(line.trim()))
                .and_then(|captures| parse_number(captures.get(1)?.as_str()))
                .into_iter()
                .collect(),
            Self::ProductPhrase => {
                let mut numbers = captured_numbers(&CHOICE_PHRASE_REGEX, response);
                numbers.reverse();
                numbers.extend(captured_numbers(&PRODUCT_PHRASE_REGEX, response));
                numbers
            }
            Self::BareDigit => {
                let trimmed = response.trim();
                if BARE_DIGIT_REGEX.is_match(trimmed) {
                    parse_number(trimmed).into_iter().collect()
                } else {
                    Vec::new()
                }
            }
            Self::AnyInteger => INTEGER_REGEX
                .find_iter(response)
                .filter_map(|token| parse_number(token.as_str()))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect(),
        }
    }

    /// First valid zero-based index this strategy finds for `count` candidates.
    #[must_use]
    pub fn extract(self, response: &str, count: usize) -> Option<usize> {
        self.numbers(response)
            .into_iter()
            .find_map(|number| to_index(number, count))
    }
}

/// Reads the chosen product out of a model answer by trying every
/// [`IndexStrategy`] in order.
///
/// Returns a zero-based index below `count`, or `None` when no strategy finds
/// one. Numbers outside `1..=count` never count as a choice.
#[must_use]
pub fn parse_choice(response: &str, count: usize) -> Option<usize> {
    IndexStrategy::CHAIN.iter().find_map(|&strategy| {
        let index = strategy.extract(response, count)?;
        debug!("{strategy:?} read product {}", index + 1);
        Some(index)
    })
}

fn captured_numbers(regex: &Regex, text: &str) -> Vec<u64> {
    regex
        .captures_iter(text)
        .filter_map(|captures| parse_number(captures.get(1)?.as_str()))
        .collect()
}

fn parse_number(token: &str) -> Option<u64> {
    token.parse().ok()
}

fn to_index(number: u64, count: usize) -> Option<usize> {
    let index = usize::try_from(number).ok()?.checked_sub(1)?;
    (index < count).then_some(index)
}

/// Warns when the reasoning recommends a different product than the one
/// picked. The decision is left as it is.
fn check_recommendation(response: &str, index: usize) {
    for captures in RECOMMEND_REGEX.captures_iter(response) {
        let Some(recommended) = captures.get(1).and_then(|m| parse_number(m.as_str())) else {
            continue;
        };
        if usize::try_from(recommended).ok() != Some(index + 1) {
            warn!(
                "Model recommended product {recommended} but its final choice is product {}",
                index + 1
            );
        }
    }
}
