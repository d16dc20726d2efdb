//! Summary statistics over exact matches.

use serde::Serialize;

use crate::models::Bucket;

/// Min, median, max and count of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Smallest value
    pub min: f64,
    /// Element at index `len / 2` of the ascending sort
    pub median: f64,
    /// Largest value
    pub max: f64,
    /// Sample size
    pub count: usize,
}

impl Summary {
    /// Summarizes `values`; `None` for an empty sample.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            median: sorted[sorted.len() / 2],
            max: sorted[sorted.len() - 1],
            count: sorted.len(),
        })
    }
}

/// Price and thickness summaries of the exact matches of one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchStats {
    /// Price in CHF/m²
    pub price: Summary,
    /// Total thickness in mm
    pub thickness: Summary,
}

impl MatchStats {
    /// Statistics of `product`'s exact matches; `None` if it has none.
    #[must_use]
    pub fn for_product(exact: &Bucket, product: &str) -> Option<Self> {
        let items = exact.get(product);
        Some(Self {
            price: Summary::of(items.iter().map(|c| c.performance.price))?,
            thickness: Summary::of(items.iter().map(|c| c.performance.thickness))?,
        })
    }
}
