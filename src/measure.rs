//! The measure module finds explicit weights in free text and normalizes them to grams.

use once_cell::sync::Lazy;
use regex::Regex;

static WEIGHT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(kg|kilo(?:grams?|s)?|grams?|gr|g)\b")
        .expect("Failed to compile WEIGHT regex")
});

/// Weight unit recognized by [`parse_weight`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WeightUnit {
    Gram,
    Kilogram,
}

impl WeightUnit {
    fn from_token(token: &str) -> Self {
        if token.to_lowercase().starts_with('k') {
            Self::Kilogram
        } else {
            Self::Gram
        }
    }

    /// How many grams one of this unit is.
    #[must_use]
    pub fn grams(self) -> f64 {
        match self {
            Self::Gram => 1.0,
            Self::Kilogram => 1000.0,
        }
    }
}

/// A weight stated in some text, e.g. `2.5 kg`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Measurement {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Measurement {
    /// Weight in grams, rounded to the milligram.
    #[must_use]
    pub fn grams(&self) -> f64 {
        (self.value * self.unit.grams() * 1000.0).round() / 1000.0
    }
}

/// Finds the first `<number><unit>` weight in `text`.
///
/// Decimal commas are accepted as well as points, so `"1,5 kg"` reads as 1.5 kg.
#[must_use]
pub fn parse_measurement(text: &str) -> Option<Measurement> {
    let captures = WEIGHT_REGEX.captures(text)?;
    let value = captures.get(1)?.as_str().replace(',', ".").parse().ok()?;
    let unit = WeightUnit::from_token(captures.get(2)?.as_str());

    Some(Measurement { value, unit })
}

/// Parses the first explicit weight in `text` and returns it in grams.
///
/// Returns `None` when the text states no weight. That is a normal outcome,
/// not an error.
#[must_use]
pub fn parse_weight(text: &str) -> Option<f64> {
    parse_measurement(text).map(|measurement| measurement.grams())
}
