//! The quantity module works out how many units of the chosen product cover
//! the weight a recipe asks for, and tells the catalog to add them.

use log::{info, warn};

use crate::catalog::{CandidateProduct, Catalog};
use crate::constants::MAX_UNITS_PER_PRODUCT;

/// How many units of a product to buy.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct QuantityPlan {
    pub unit_weight_grams: f64,
    pub required_weight_grams: f64,
    pub optimal_count: u32,
}

impl QuantityPlan {
    #[must_use]
    pub fn new(unit_weight_grams: f64, required_weight_grams: f64) -> Self {
        Self {
            unit_weight_grams,
            required_weight_grams,
            optimal_count: plan(unit_weight_grams, required_weight_grams),
        }
    }

    /// Increase actions needed on top of the unit added by selecting the product.
    #[must_use]
    pub fn additional_units(&self) -> u32 {
        self.optimal_count.saturating_sub(1)
    }
}

/// Smallest unit count whose total weight reaches `required_grams`.
///
/// Returns 1 when either weight is zero or not a positive number, since
/// sufficiency cannot be judged and the first unit is already in the cart.
/// Counts above [`MAX_UNITS_PER_PRODUCT`] are clamped to it.
#[must_use]
pub fn plan(unit_grams: f64, required_grams: f64) -> u32 {
    if !(unit_grams > 0.0 && required_grams > 0.0) {
        return 1;
    }

    let count = (required_grams / unit_grams).ceil();
    if count > f64::from(MAX_UNITS_PER_PRODUCT) {
        warn!(
            "{required_grams} g needs {count} units of {unit_grams} g, buying {MAX_UNITS_PER_PRODUCT}"
        );
        return MAX_UNITS_PER_PRODUCT;
    }
    (count as u32).max(1)
}

/// Puts `product` in the cart and raises its quantity to `plan.optimal_count`,
/// one increase at a time.
///
/// `product.quantity` follows every requested action even when the catalog
/// reports a failure, so it reflects what was asked for.
pub async fn apply_plan<C: Catalog>(
    catalog: &mut C,
    product: &mut CandidateProduct,
    plan: &QuantityPlan,
) {
    if let Err(error) = catalog.select(product).await {
        warn!("Selecting {:?} failed: {error}", product.title);
    }
    product.quantity = 1;

    for _ in 0..plan.additional_units() {
        if let Err(error) = catalog.increase_quantity(product).await {
            warn!("Increasing quantity of {:?} failed: {error}", product.title);
        }
        product.quantity += 1;
    }

    info!("Requested {} x {:?}", product.quantity, product.title);
}
