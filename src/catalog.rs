//! The catalog module describes the store the pipeline shops in: searching
//! for candidate products and putting them in the cart.
//!
//! Browser automation lives behind [`Catalog`]. The bundled [`JsonCatalog`]
//! serves an offline product list so the pipeline can run without a browser.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::measure::parse_weight;

/// One product offer found by a search.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct CandidateProduct {
    /// Opaque reference the catalog uses to find this offer again
    pub handle: usize,
    pub title: String,
    pub price: Option<String>,
    pub compare_price: Option<String>,
    pub display_volume: Option<String>,
    /// Units in the cart; only changed by the quantity step
    pub quantity: u32,
}

impl CandidateProduct {
    /// Weight stated by the display volume in grams, 0 when missing or unreadable.
    #[must_use]
    pub fn weight_grams(&self) -> f64 {
        self.display_volume
            .as_deref()
            .and_then(parse_weight)
            .unwrap_or(0.0)
    }
}

/// The page/search side of the store.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// Searches the store and returns the offers found, in page order.
    ///
    /// # Errors
    ///
    /// Returns an error if the search could not be performed.
    async fn search(&mut self, term: &str) -> Result<Vec<CandidateProduct>>;

    /// Puts one unit of `product` in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejected the action.
    async fn select(&mut self, product: &CandidateProduct) -> Result<()>;

    /// Adds one more unit of an already selected `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejected the action.
    async fn increase_quantity(&mut self, product: &CandidateProduct) -> Result<()>;
}

/// A product line of a [`JsonCatalog`] file.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub compare_price: Option<String>,
    #[serde(default)]
    pub display_volume: Option<String>,
}

/// Offline catalog backed by a JSON array of [`CatalogEntry`].
#[derive(Debug)]
pub struct JsonCatalog {
    entries: Vec<CatalogEntry>,
    max_candidates: usize,
    /// Units per entry index
    cart: BTreeMap<usize, u32>,
}

impl JsonCatalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>, max_candidates: usize) -> Self {
        Self {
            entries,
            max_candidates,
            cart: BTreeMap::new(),
        }
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>, max_candidates: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid catalog file: {}", path.display()))?;

        Ok(Self::new(entries, max_candidates))
    }

    /// Cart contents as `(title, units)` in catalog order.
    #[must_use]
    pub fn cart(&self) -> Vec<(String, u32)> {
        self.cart
            .iter()
            .filter_map(|(&handle, &units)| {
                self.entries
                    .get(handle)
                    .map(|entry| (entry.title.clone(), units))
            })
            .collect()
    }

    fn matching_handles(&self, term: &str) -> Vec<usize> {
        let term = term.to_lowercase();
        let exact: Vec<usize> = self.handles_where(|title| title.contains(&term));
        if !exact.is_empty() {
            return exact;
        }

        let words: Vec<&str> = term
            .split_whitespace()
            .filter(|word| word.chars().count() >= 3)
            .collect();
        self.handles_where(|title| words.iter().any(|word| title.contains(word)))
    }

    fn handles_where(&self, predicate: impl Fn(&str) -> bool) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| predicate(&entry.title.to_lowercase()))
            .map(|(handle, _)| handle)
            .take(self.max_candidates)
            .collect()
    }

    fn add_to_cart(&mut self, product: &CandidateProduct) -> Result<()> {
        if self.entries.get(product.handle).is_none() {
            anyhow::bail!("Unknown product handle {} ({})", product.handle, product.title);
        }
        *self.cart.entry(product.handle).or_insert(0) += 1;
        Ok(())
    }
}

impl Catalog for JsonCatalog {
    async fn search(&mut self, term: &str) -> Result<Vec<CandidateProduct>> {
        let candidates: Vec<CandidateProduct> = self
            .matching_handles(term)
            .into_iter()
            .filter_map(|handle| {
                self.entries.get(handle).map(|entry| CandidateProduct {
                    handle,
                    title: entry.title.clone(),
                    price: entry.price.clone(),
                    compare_price: entry.compare_price.clone(),
                    display_volume: entry.display_volume.clone(),
                    quantity: 0,
                })
            })
            .collect();

        debug!("Catalog search {term:?} found {} products", candidates.len());
        Ok(candidates)
    }

    async fn select(&mut self, product: &CandidateProduct) -> Result<()> {
        self.add_to_cart(product)
    }

    async fn increase_quantity(&mut self, product: &CandidateProduct) -> Result<()> {
        self.add_to_cart(product)
    }
}
