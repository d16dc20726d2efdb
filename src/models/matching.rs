//! Match-evaluation request and classified results.
//!
//! The remote matcher returns three buckets (`meets_req`, `meets_req_with_tol`,
//! `fails_req`), each mapping product name to an ordered list of combinations.
//! On ingest every combination is tagged with its [`Classification`] so flattened
//! and grouped views cannot disagree about where a combination belongs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::ALL_PRODUCTS;
use crate::models::{ComparisonOp, PreFilter, RequirementProfile, Sampling};

/// Outcome of evaluating one combination against the requirement profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Meets every requirement exactly
    Exact,
    /// Meets the requirements only within tolerance
    Tolerance,
    /// Fails the requirements
    Fail,
}

impl Classification {
    /// All classifications in presentation order.
    pub const ALL: [Self; 3] = [Self::Exact, Self::Tolerance, Self::Fail];

    /// Legend label without count.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "Meets req",
            Self::Tolerance => "Meets with tolerance",
            Self::Fail => "Fails req",
        }
    }
}

/// Aggregate performance of one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Performance {
    /// Total thickness in mm
    pub thickness: f64,
    /// Price in CHF/m²
    pub price: f64,
    /// U-value in W/m²K
    pub u_value: f64,
}

impl From<[f64; 3]> for Performance {
    fn from([thickness, price, u_value]: [f64; 3]) -> Self {
        Self {
            thickness,
            price,
            u_value,
        }
    }
}

impl From<Performance> for [f64; 3] {
    fn from(p: Performance) -> Self {
        [p.thickness, p.price, p.u_value]
    }
}

/// Combination as sent by the matcher, before classification tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCombination {
    /// Per-layer thickness in wall layer order
    #[serde(default)]
    pub thicknesses: Vec<f64>,
    /// `[thickness, price, u_value]`
    pub performances: Performance,
    /// Highlight color (tolerance matches)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Soft-violation score (tolerance matches)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_violation: Option<f64>,
}

/// One full assembly instance with its performance and classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combination {
    /// Per-layer thickness in wall layer order (may be empty)
    pub thicknesses: Vec<f64>,
    /// Aggregate performance
    pub performance: Performance,
    /// Bucket this combination came from
    pub classification: Classification,
    /// Optional highlight color
    pub color: Option<String>,
    /// Soft-violation score; only ever set for tolerance matches
    pub soft_violation: Option<f64>,
}

impl Combination {
    /// Tags a raw combination with its bucket's classification.
    ///
    /// A soft-violation score on a non-tolerance combination is dropped.
    #[must_use]
    pub fn classify(raw: RawCombination, classification: Classification) -> Self {
        let soft_violation = match classification {
            Classification::Tolerance => raw.soft_violation,
            Classification::Exact | Classification::Fail => None,
        };
        Self {
            thicknesses: raw.thicknesses,
            performance: raw.performances,
            classification,
            color: raw.color,
            soft_violation,
        }
    }
}

/// All combinations of one classification, grouped by product in matcher order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    classification: Classification,
    products: IndexMap<String, Vec<Combination>>,
}

impl Bucket {
    /// Creates an empty bucket.
    #[must_use]
    pub fn new(classification: Classification) -> Self {
        Self {
            classification,
            products: IndexMap::new(),
        }
    }

    /// Builds a bucket from the matcher's raw mapping.
    #[must_use]
    pub fn from_raw(
        classification: Classification,
        raw: IndexMap<String, Vec<RawCombination>>,
    ) -> Self {
        let products = raw
            .into_iter()
            .map(|(product, items)| {
                let items = items
                    .into_iter()
                    .map(|r| Combination::classify(r, classification))
                    .collect();
                (product, items)
            })
            .collect();
        Self {
            classification,
            products,
        }
    }

    /// Appends a combination under `product`, retagging it with this bucket's classification.
    pub fn push(&mut self, product: impl Into<String>, mut combination: Combination) {
        combination.classification = self.classification;
        if combination.classification != Classification::Tolerance {
            combination.soft_violation = None;
        }
        self.products
            .entry(product.into())
            .or_default()
            .push(combination);
    }

    /// Classification shared by every combination in the bucket.
    #[must_use]
    pub const fn classification(&self) -> Classification {
        self.classification
    }

    /// Combinations for `product`; empty if the product is absent.
    #[must_use]
    pub fn get(&self, product: &str) -> &[Combination] {
        self.products.get(product).map_or(&[], Vec::as_slice)
    }

    /// Product names in matcher order.
    pub fn product_names(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    /// `(product, combinations)` pairs in matcher order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Combination])> {
        self.products
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    /// Total number of combinations across all products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.values().map(Vec::len).sum()
    }

    /// Returns true if the bucket holds no combinations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The matcher's three buckets for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedResultSet {
    /// Exact matches
    pub exact: Bucket,
    /// Tolerance matches
    pub tolerance: Bucket,
    /// Failures
    pub fail: Bucket,
}

impl Default for ClassifiedResultSet {
    fn default() -> Self {
        Self {
            exact: Bucket::new(Classification::Exact),
            tolerance: Bucket::new(Classification::Tolerance),
            fail: Bucket::new(Classification::Fail),
        }
    }
}

impl ClassifiedResultSet {
    /// Bucket holding `classification`.
    #[must_use]
    pub const fn bucket(&self, classification: Classification) -> &Bucket {
        match classification {
            Classification::Exact => &self.exact,
            Classification::Tolerance => &self.tolerance,
            Classification::Fail => &self.fail,
        }
    }

    /// Total combinations across all three buckets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.exact.len() + self.tolerance.len() + self.fail.len()
    }

    /// Distinct product names across all buckets, first-seen order
    /// (exact, then tolerance, then fail).
    #[must_use]
    pub fn product_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for bucket in [&self.exact, &self.tolerance, &self.fail] {
            for name in bucket.product_names() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

/// Response body of `POST /requirement_profiles/apply`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    /// Exact matches per product
    #[serde(default)]
    pub meets_req: IndexMap<String, Vec<RawCombination>>,
    /// Tolerance matches per product
    #[serde(default)]
    pub meets_req_with_tol: IndexMap<String, Vec<RawCombination>>,
    /// Failures per product
    #[serde(default)]
    pub fails_req: IndexMap<String, Vec<RawCombination>>,
}

impl From<MatchResponse> for ClassifiedResultSet {
    fn from(response: MatchResponse) -> Self {
        Self {
            exact: Bucket::from_raw(Classification::Exact, response.meets_req),
            tolerance: Bucket::from_raw(Classification::Tolerance, response.meets_req_with_tol),
            fail: Bucket::from_raw(Classification::Fail, response.fails_req),
        }
    }
}

/// Request body of `POST /requirement_profiles/apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    /// Product name, or `"All"` for the whole category
    pub product: String,
    /// Thickness threshold
    pub t_thresh: f64,
    /// Price threshold
    pub p_thresh: f64,
    /// U-value threshold
    pub u_thresh: f64,
    /// Thickness tolerance
    pub t_tol: f64,
    /// Price tolerance
    pub p_tol: f64,
    /// U-value tolerance
    pub u_tol: f64,
    /// Sampling passthrough
    pub sampling: Option<Sampling>,
    /// Applied pre-filter of the product; always `null` for `"All"`
    pub pre_filter: Option<PreFilter>,
    /// Thickness operator
    pub t_thresh_op: ComparisonOp,
    /// Price operator
    pub p_thresh_op: ComparisonOp,
    /// U-value operator
    pub u_thresh_op: ComparisonOp,
}

impl MatchRequest {
    /// Builds a request from applied state.
    #[must_use]
    pub fn new(
        product: &str,
        profile: &RequirementProfile,
        sampling: Option<Sampling>,
        pre_filter: Option<PreFilter>,
    ) -> Self {
        let pre_filter = if product == ALL_PRODUCTS {
            None
        } else {
            pre_filter
        };
        Self {
            product: product.to_string(),
            t_thresh: profile.thickness.threshold,
            p_thresh: profile.price.threshold,
            u_thresh: profile.u_value.threshold,
            t_tol: profile.thickness.tolerance,
            p_tol: profile.price.tolerance,
            u_tol: profile.u_value.tolerance,
            sampling,
            pre_filter,
            t_thresh_op: profile.thickness.op,
            p_thresh_op: profile.price.op,
            u_thresh_op: profile.u_value.op,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_tags_classification() {
        let body = json!({
            "meets_req": {"Aussenwand 1.1": [{"thicknesses": [15, 100], "performances": [350, 300, 0.14]}]},
            "meets_req_with_tol": {"Aussenwand 1.1": [{"thicknesses": [18, 100], "performances": [360, 310, 0.15], "color": "#ffaa00", "soft_violation": 0.25}]},
            "fails_req": {}
        });
        let response: MatchResponse = serde_json::from_value(body).unwrap();
        let results = ClassifiedResultSet::from(response);

        assert_eq!(results.exact.len(), 1);
        assert_eq!(results.tolerance.len(), 1);
        assert!(results.fail.is_empty());

        let exact = &results.exact.get("Aussenwand 1.1")[0];
        assert_eq!(exact.classification, Classification::Exact);
        assert_eq!(exact.performance.u_value, 0.14);

        let tol = &results.tolerance.get("Aussenwand 1.1")[0];
        assert_eq!(tol.classification, Classification::Tolerance);
        assert_eq!(tol.soft_violation, Some(0.25));
        assert_eq!(tol.color.as_deref(), Some("#ffaa00"));
    }

    #[test]
    fn test_soft_violation_dropped_outside_tolerance() {
        let raw = RawCombination {
            thicknesses: vec![],
            performances: [1.0, 2.0, 3.0].into(),
            color: None,
            soft_violation: Some(0.5),
        };
        let combo = Combination::classify(raw, Classification::Exact);
        assert_eq!(combo.soft_violation, None);
    }

    #[test]
    fn test_performances_must_have_three_values() {
        let body = json!({"meets_req": {"W": [{"thicknesses": [], "performances": [1, 2]}]}});
        assert!(serde_json::from_value::<MatchResponse>(body).is_err());
    }

    #[test]
    fn test_missing_buckets_default_empty() {
        let response: MatchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(ClassifiedResultSet::from(response).total(), 0);
    }

    #[test]
    fn test_bucket_get_absent_is_empty() {
        let bucket = Bucket::new(Classification::Fail);
        assert!(bucket.get("Nope").is_empty());
    }

    #[test]
    fn test_request_wire_shape() {
        let mut filter = PreFilter::new();
        filter.set_selection("Gipsfaser", [1], 2);
        let request = MatchRequest::new(
            "Aussenwand 1.1",
            &RequirementProfile::default(),
            Some(Sampling::Horizontal),
            Some(filter),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "product": "Aussenwand 1.1",
                "tThresh": 350.0, "pThresh": 350.0, "uThresh": 0.15,
                "tTol": 20.0, "pTol": 10.0, "uTol": 0.03,
                "sampling": "horizontal",
                "preFilter": {"Gipsfaser": [1]},
                "tThreshOp": "~=", "pThreshOp": "<=", "uThreshOp": "<="
            })
        );
    }

    #[test]
    fn test_all_products_forces_null_pre_filter() {
        let mut filter = PreFilter::new();
        filter.set_selection("Gipsfaser", [1], 2);
        let request = MatchRequest::new(ALL_PRODUCTS, &RequirementProfile::default(), None, Some(filter));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["preFilter"], serde_json::Value::Null);
        assert_eq!(value["sampling"], serde_json::Value::Null);
    }
}
