pub const MODEL_API_KEY_ENV_NAME: &str = "RECICART_MODEL_API_KEY";

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";

pub(crate) const USER_AGENT: &str = "recicart Bot";

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

pub const DEFAULT_MAX_CANDIDATES: usize = 10;

/// Deadline for one recipe fetch or one text-generation call.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Upper bound on units bought of a single product.
pub const MAX_UNITS_PER_PRODUCT: u32 = 50;

/// Pantry staples nobody needs to buy for a single recipe.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["salt", "water", "vatten", "oil", "olja"];

/// Used when no recipe URL is given or nothing could be extracted from it.
pub const DEFAULT_SHOPPING_LIST: &[&str] = &[
    "2.5 kg bananer",
    "1 liter mjölk",
    "500g vetemjöl",
    "en burk jordnötssmör",
];

pub(crate) const NOT_AVAILABLE: &str = "Not available";

pub(crate) const NORMALIZE_PROMPT_TEMPLATE: &str = r#"
You turn recipe ingredient lines into grocery store search terms.
Reduce the ingredient below to its simplest base form.
Remove quantities, units and preparation words.
For example "4 egg yolks" becomes "egg" and "2 dl finely chopped parsley" becomes "parsley".
Answer with the search term only, nothing else.
Ingredient: {ingredient}"#;

pub(crate) const SELECT_PROMPT_TEMPLATE: &str = r#"
You are helping someone buy groceries online.
They need: {requirement}

These products were found in the store:
{listing}
Compare the products and reason about them in this order of priority:
1. Product type match: is it actually the thing that is needed?
2. Unit price and compare price.
3. Weight or volume fit for the need.
4. Quality.
5. Any other factors.

Explain your reasoning briefly.
Then write the number of the product you choose, and nothing else, on the last line."#;
