//! Plot and table views over a classified result set.
//!
//! The matcher returns combinations grouped by product per bucket. For plotting
//! they are flattened into point series; for the per-product table they are
//! regrouped and numbered exact-first. The aggregator also keeps the active
//! product on one that still has matches.

use std::collections::HashMap;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::models::{Bucket, Classification, ClassifiedResultSet, Combination, Performance};
use crate::services::stats::MatchStats;

/// Side-table: product name to ordered layer names.
pub type LayerNames = HashMap<String, Vec<String>>;

/// One combination paired with the product it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatEntry<'a> {
    /// Owning product
    pub product: &'a str,
    /// The combination
    pub combination: &'a Combination,
}

/// Flattens a bucket in product order, then combination order.
#[must_use]
pub fn flatten(bucket: &Bucket) -> Vec<FlatEntry<'_>> {
    bucket
        .iter()
        .flat_map(|(product, items)| {
            items
                .iter()
                .map(move |combination| FlatEntry {
                    product,
                    combination,
                })
        })
        .collect()
}

/// Combinations regrouped by product, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouped {
    products: IndexMap<String, Vec<Combination>>,
}

impl Grouped {
    /// Combinations of `product`; empty if the product is absent.
    #[must_use]
    pub fn get(&self, product: &str) -> &[Combination] {
        self.products.get(product).map_or(&[], Vec::as_slice)
    }

    /// Product names in first-seen order.
    pub fn product_names(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }
}

/// Inverse of [`flatten`].
#[must_use]
pub fn group_by_product(entries: &[FlatEntry<'_>]) -> Grouped {
    let mut products: IndexMap<String, Vec<Combination>> = IndexMap::new();
    for entry in entries {
        products
            .entry(entry.product.to_string())
            .or_default()
            .push(entry.combination.clone());
    }
    Grouped { products }
}

/// Colors of the four plot series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotColors {
    /// Exact matches
    pub exact: String,
    /// Tolerance matches without their own color
    pub tolerance: String,
    /// Failures
    pub fail: String,
    /// Legend-only total series
    pub total: String,
}

impl PlotColors {
    /// Color of the series holding `classification` matches.
    #[must_use]
    pub fn for_classification(&self, classification: Classification) -> &str {
        match classification {
            Classification::Exact => &self.exact,
            Classification::Tolerance => &self.tolerance,
            Classification::Fail => &self.fail,
        }
    }
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            exact: "green".to_string(),
            tolerance: "orange".to_string(),
            fail: "red".to_string(),
            total: "blue".to_string(),
        }
    }
}

/// Marker size of data series.
pub const POINT_SIZE: u32 = 6;

/// One point of a 3D (thickness, price, u-value) scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    /// Owning product
    pub product: String,
    /// Thickness, price and u-value
    pub performance: Performance,
    /// Marker color
    pub color: String,
    /// Hover label
    pub label: String,
}

/// A named point series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    /// Legend name including the count
    pub name: String,
    /// Bucket the points came from; `None` for the total series
    pub classification: Option<Classification>,
    /// Default marker color
    pub color: String,
    /// Marker size; zero for the legend-only total series
    pub size: u32,
    /// Number of combinations represented
    pub count: usize,
    /// Points in flatten order
    pub points: Vec<PlotPoint>,
}

fn point_label(
    entry: &FlatEntry<'_>,
    all_products: bool,
    layer_names: &LayerNames,
) -> String {
    let combination = entry.combination;
    let mut label = String::new();

    if all_products {
        let _ = writeln!(label, "{}", entry.product);
    }

    if let Some(names) = layer_names.get(entry.product) {
        if !names.is_empty() && !combination.thicknesses.is_empty() {
            label.push_str("Layer Thicknesses:\n");
            for (i, name) in names.iter().enumerate() {
                let t = combination.thicknesses.get(i).copied().unwrap_or(0.0);
                let _ = writeln!(label, "  {name}: {t}mm");
            }
        }
    }

    let p = combination.performance;
    let _ = write!(
        label,
        "Performance:\n  Thickness: {:.1} mm\n  Price: {:.0} CHF/m²\n  U-Value: {:.3} W/m²K",
        p.thickness, p.price, p.u_value
    );

    if combination.classification == Classification::Tolerance {
        if let Some(score) = combination.soft_violation {
            let _ = write!(label, "\nSoft Violation Score: {score:.4}");
        }
    }

    label
}

fn series(
    bucket: &Bucket,
    color: &str,
    all_products: bool,
    layer_names: &LayerNames,
) -> PlotSeries {
    let classification = bucket.classification();
    let points: Vec<PlotPoint> = flatten(bucket)
        .iter()
        .map(|entry| PlotPoint {
            product: entry.product.to_string(),
            performance: entry.combination.performance,
            color: match classification {
                Classification::Tolerance => entry
                    .combination
                    .color
                    .clone()
                    .unwrap_or_else(|| color.to_string()),
                Classification::Exact | Classification::Fail => color.to_string(),
            },
            label: point_label(entry, all_products, layer_names),
        })
        .collect();

    PlotSeries {
        name: format!("{} ({})", classification.label(), points.len()),
        classification: Some(classification),
        color: color.to_string(),
        size: POINT_SIZE,
        count: points.len(),
        points,
    }
}

/// Builds the exact, tolerance, fail and legend-only total series.
///
/// Product names appear in labels only when more than one product is present.
#[must_use]
pub fn merge_for_plot(
    results: &ClassifiedResultSet,
    layer_names: &LayerNames,
    colors: &PlotColors,
) -> Vec<PlotSeries> {
    let all_products = results.product_names().len() > 1;
    let total = results.total();
    let mut plot: Vec<PlotSeries> = Classification::ALL
        .into_iter()
        .map(|c| {
            series(
                results.bucket(c),
                colors.for_classification(c),
                all_products,
                layer_names,
            )
        })
        .collect();
    plot.push(PlotSeries {
        name: format!("Total points ({total})"),
        classification: None,
        color: colors.total.clone(),
        size: 0,
        count: total,
        points: Vec::new(),
    });
    plot
}

/// One numbered row of a product table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// 1-based row id, exact rows first
    pub id: usize,
    /// Exact or tolerance
    pub classification: Classification,
    /// Per-layer thickness
    pub thicknesses: Vec<f64>,
    /// True if `thicknesses` is a zero-filled placeholder
    pub placeholder: bool,
    /// Aggregate performance
    pub performance: Performance,
    /// Soft-violation score of tolerance rows
    pub soft_violation: Option<f64>,
}

/// Matching combinations of one product, numbered exact-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTable {
    /// Product name
    pub product: String,
    /// Column headers from the side-table
    pub layer_names: Vec<String>,
    /// Rows `1..E` exact, then `E+1..E+T` tolerance
    pub rows: Vec<TableRow>,
}

/// Builds the numbered table of `product`'s exact and tolerance matches.
#[must_use]
pub fn build_product_table(
    product: &str,
    exact: &[Combination],
    tolerance: &[Combination],
    layer_names: &[String],
) -> ProductTable {
    let rows = exact
        .iter()
        .chain(tolerance)
        .enumerate()
        .map(|(i, combination)| {
            let placeholder = combination.thicknesses.is_empty();
            let thicknesses = if placeholder {
                vec![0.0; layer_names.len()]
            } else {
                combination.thicknesses.clone()
            };
            TableRow {
                id: i + 1,
                classification: combination.classification,
                thicknesses,
                placeholder,
                performance: combination.performance,
                soft_violation: combination.soft_violation,
            }
        })
        .collect();

    ProductTable {
        product: product.to_string(),
        layer_names: layer_names.to_vec(),
        rows,
    }
}

/// Match counts of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    /// Product name
    pub product: String,
    /// Exact matches
    pub exact: usize,
    /// Tolerance matches
    pub tolerance: usize,
}

impl ProductSummary {
    /// Exact plus tolerance matches.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.exact + self.tolerance
    }
}

/// Products with at least one exact or tolerance match, in exact-bucket order
/// then tolerance-bucket order.
#[must_use]
pub fn product_summaries(results: &ClassifiedResultSet) -> Vec<ProductSummary> {
    let mut summaries: Vec<ProductSummary> = Vec::new();
    for name in results
        .exact
        .product_names()
        .chain(results.tolerance.product_names())
    {
        if summaries.iter().any(|s| s.product == name) {
            continue;
        }
        let summary = ProductSummary {
            product: name.to_string(),
            exact: results.exact.get(name).len(),
            tolerance: results.tolerance.get(name).len(),
        };
        if summary.total() > 0 {
            summaries.push(summary);
        }
    }
    summaries
}

/// Picks the active product after an ingest.
///
/// Keeps `current` if it still has matches, otherwise the first product with
/// any; `None` when nothing matches.
#[must_use]
pub fn auto_select(results: &ClassifiedResultSet, current: Option<&str>) -> Option<String> {
    let has_matches =
        |name: &str| !results.exact.get(name).is_empty() || !results.tolerance.get(name).is_empty();

    if let Some(current) = current.filter(|c| has_matches(*c)) {
        return Some(current.to_string());
    }
    results
        .exact
        .product_names()
        .chain(results.tolerance.product_names())
        .find(|&name| has_matches(name))
        .map(str::to_string)
}

/// Holds the latest result set and the active product for table display.
#[derive(Debug, Clone, Default)]
pub struct MatchResultAggregator {
    results: ClassifiedResultSet,
    layer_names: LayerNames,
    active: Option<String>,
}

impl MatchResultAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the result set and re-runs auto-selection.
    pub fn ingest(&mut self, results: ClassifiedResultSet) {
        let next = auto_select(&results, self.active.as_deref());
        if next != self.active {
            debug!("Active product {:?} -> {:?}", self.active, next);
        }
        self.active = next;
        self.results = results;
    }

    /// Drops all results.
    pub fn clear(&mut self) {
        self.results = ClassifiedResultSet::default();
        self.active = None;
    }

    /// Records the layer names of `product` for labels and table headers.
    pub fn set_layer_names(&mut self, product: impl Into<String>, names: Vec<String>) {
        self.layer_names.insert(product.into(), names);
    }

    /// Layer-name side-table.
    #[must_use]
    pub const fn layer_names(&self) -> &LayerNames {
        &self.layer_names
    }

    /// Current result set.
    #[must_use]
    pub const fn results(&self) -> &ClassifiedResultSet {
        &self.results
    }

    /// Product shown in the table.
    #[must_use]
    pub fn active_product(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Makes `product` active.
    ///
    /// # Errors
    ///
    /// Returns an error if `product` has no exact or tolerance match.
    pub fn select_product(&mut self, product: &str) -> anyhow::Result<()> {
        if self.results.exact.get(product).is_empty()
            && self.results.tolerance.get(product).is_empty()
        {
            anyhow::bail!("Product '{product}' has no matching combinations");
        }
        self.active = Some(product.to_string());
        Ok(())
    }

    /// Per-product match counts.
    #[must_use]
    pub fn product_summaries(&self) -> Vec<ProductSummary> {
        product_summaries(&self.results)
    }

    /// Exact plus tolerance matches across all products.
    #[must_use]
    pub fn total_matches(&self) -> usize {
        self.results.exact.len() + self.results.tolerance.len()
    }

    /// Plot series of the current results.
    #[must_use]
    pub fn plot(&self, colors: &PlotColors) -> Vec<PlotSeries> {
        merge_for_plot(&self.results, &self.layer_names, colors)
    }

    /// Table of the active product.
    #[must_use]
    pub fn table(&self) -> Option<ProductTable> {
        let product = self.active.as_deref()?;
        let names = self.layer_names.get(product).map_or(&[][..], Vec::as_slice);
        Some(build_product_table(
            product,
            self.results.exact.get(product),
            self.results.tolerance.get(product),
            names,
        ))
    }

    /// Exact-match statistics of the active product.
    #[must_use]
    pub fn stats(&self) -> Option<MatchStats> {
        MatchStats::for_product(&self.results.exact, self.active.as_deref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchResponse;
    use serde_json::json;

    fn combo(classification: Classification, perf: [f64; 3]) -> Combination {
        Combination {
            thicknesses: vec![15.0, 100.0],
            performance: perf.into(),
            classification,
            color: None,
            soft_violation: None,
        }
    }

    fn single_exact() -> ClassifiedResultSet {
        let response: MatchResponse = serde_json::from_value(json!({
            "meets_req": {"Wand A": [{"thicknesses": [15, 335], "performances": [350, 300, 0.14]}]}
        }))
        .unwrap();
        response.into()
    }

    #[test]
    fn test_flatten_order() {
        let mut bucket = Bucket::new(Classification::Fail);
        bucket.push("B", combo(Classification::Fail, [1.0, 0.0, 0.0]));
        bucket.push("A", combo(Classification::Fail, [2.0, 0.0, 0.0]));
        bucket.push("B", combo(Classification::Fail, [3.0, 0.0, 0.0]));

        let flat = flatten(&bucket);
        let order: Vec<(&str, f64)> = flat
            .iter()
            .map(|e| (e.product, e.combination.performance.thickness))
            .collect();
        assert_eq!(order, vec![("B", 1.0), ("B", 3.0), ("A", 2.0)]);

        let grouped = group_by_product(&flat);
        assert_eq!(grouped.get("B"), bucket.get("B"));
        assert_eq!(grouped.get("A"), bucket.get("A"));
        assert!(grouped.get("C").is_empty());
    }

    #[test]
    fn test_single_exact_plot() {
        let series = merge_for_plot(&single_exact(), &LayerNames::new(), &PlotColors::default());
        assert_eq!(series.len(), 4);

        assert_eq!(series[0].name, "Meets req (1)");
        let point = &series[0].points[0];
        assert_eq!(point.performance, Performance::from([350.0, 300.0, 0.14]));
        assert_eq!(point.color, "green");

        assert_eq!(series[3].name, "Total points (1)");
        assert_eq!(series[3].size, 0);
        assert!(series[3].points.is_empty());
    }

    #[test]
    fn test_label_single_product() {
        let mut names = LayerNames::new();
        names.insert(
            "Wand A".to_string(),
            vec!["Gipsfaser".to_string(), "Daemmung".to_string(), "Putz".to_string()],
        );
        let series = merge_for_plot(&single_exact(), &names, &PlotColors::default());
        assert_eq!(
            series[0].points[0].label,
            "Layer Thicknesses:\n  Gipsfaser: 15mm\n  Daemmung: 335mm\n  Putz: 0mm\n\
             Performance:\n  Thickness: 350.0 mm\n  Price: 300 CHF/m²\n  U-Value: 0.140 W/m²K"
        );
    }

    #[test]
    fn test_label_all_products_and_soft_violation() {
        let mut results = ClassifiedResultSet::default();
        results.exact.push("Wand A", combo(Classification::Exact, [350.0, 300.0, 0.14]));
        let mut tol = combo(Classification::Tolerance, [360.0, 310.0, 0.151]);
        tol.soft_violation = Some(0.123_46);
        tol.color = Some("#ff8800".to_string());
        results.tolerance.push("Wand B", tol);

        let series = merge_for_plot(&results, &LayerNames::new(), &PlotColors::default());
        assert!(series[0].points[0].label.starts_with("Wand A\nPerformance:"));

        let tol_point = &series[1].points[0];
        assert!(tol_point.label.starts_with("Wand B\n"));
        assert!(tol_point.label.ends_with("Soft Violation Score: 0.1235"));
        assert_eq!(tol_point.color, "#ff8800");
        assert_eq!(series[3].count, 2);
    }

    #[test]
    fn test_tolerance_color_fallback() {
        let mut results = ClassifiedResultSet::default();
        results
            .tolerance
            .push("Wand A", combo(Classification::Tolerance, [1.0, 1.0, 0.1]));
        let series = merge_for_plot(&results, &LayerNames::new(), &PlotColors::default());
        assert_eq!(series[1].points[0].color, "orange");
    }

    #[test]
    fn test_series_follow_classification_order() {
        let mut results = ClassifiedResultSet::default();
        results
            .fail
            .push("Wand A", combo(Classification::Fail, [1.0, 1.0, 0.1]));
        let colors = PlotColors {
            fail: "black".to_string(),
            ..PlotColors::default()
        };

        let series = merge_for_plot(&results, &LayerNames::new(), &colors);
        let kinds: Vec<Option<Classification>> =
            series.iter().map(|s| s.classification).collect();
        assert_eq!(
            kinds,
            vec![
                Some(Classification::Exact),
                Some(Classification::Tolerance),
                Some(Classification::Fail),
                None
            ]
        );
        assert_eq!(series[2].points[0].color, "black");
        assert_eq!(colors.for_classification(Classification::Tolerance), "orange");
    }

    #[test]
    fn test_table_numbering() {
        let exact = vec![
            combo(Classification::Exact, [1.0, 1.0, 0.1]),
            combo(Classification::Exact, [2.0, 1.0, 0.1]),
        ];
        let mut tolerance = vec![combo(Classification::Tolerance, [3.0, 1.0, 0.1])];
        tolerance[0].thicknesses.clear();

        let names = vec!["Gipsfaser".to_string(), "Daemmung".to_string(), "Putz".to_string()];
        let table = build_product_table("Wand A", &exact, &tolerance, &names);
        let ids: Vec<usize> = table.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(table.rows[2].classification, Classification::Tolerance);
        assert!(table.rows[2].placeholder);
        assert_eq!(table.rows[2].thicknesses, vec![0.0; 3]);
        assert!(!table.rows[0].placeholder);
    }

    #[test]
    fn test_auto_reselect_switches_to_product_with_matches() {
        let mut results = ClassifiedResultSet::default();
        results.fail.push("Wand A", combo(Classification::Fail, [1.0, 1.0, 0.1]));
        for i in 0..3 {
            results
                .exact
                .push("Wand B", combo(Classification::Exact, [f64::from(i), 1.0, 0.1]));
        }

        let mut aggregator = MatchResultAggregator::new();
        aggregator.active = Some("Wand A".to_string());
        aggregator.ingest(results);
        assert_eq!(aggregator.active_product(), Some("Wand B"));
        assert_eq!(aggregator.table().unwrap().rows.len(), 3);
    }

    #[test]
    fn test_auto_reselect_keeps_valid_product() {
        let mut results = ClassifiedResultSet::default();
        results.exact.push("Wand B", combo(Classification::Exact, [1.0, 1.0, 0.1]));
        results
            .tolerance
            .push("Wand A", combo(Classification::Tolerance, [1.0, 1.0, 0.1]));

        assert_eq!(auto_select(&results, Some("Wand A")), Some("Wand A".to_string()));
        assert_eq!(auto_select(&results, None), Some("Wand B".to_string()));
        assert_eq!(auto_select(&ClassifiedResultSet::default(), Some("Wand A")), None);
    }

    #[test]
    fn test_select_product_requires_matches() {
        let mut results = ClassifiedResultSet::default();
        results.exact.push("Wand B", combo(Classification::Exact, [1.0, 1.0, 0.1]));
        results.fail.push("Wand A", combo(Classification::Fail, [1.0, 1.0, 0.1]));

        let mut aggregator = MatchResultAggregator::new();
        aggregator.ingest(results);
        assert!(aggregator.select_product("Wand A").is_err());
        assert!(aggregator.select_product("Wand B").is_ok());
        assert_eq!(aggregator.total_matches(), 1);
    }

    #[test]
    fn test_product_summaries_order() {
        let response: MatchResponse = serde_json::from_value(json!({
            "meets_req": {
                "Wand B": [{"thicknesses": [], "performances": [1, 1, 0.1]}],
                "Wand C": []
            },
            "meets_req_with_tol": {
                "Wand A": [{"thicknesses": [], "performances": [1, 1, 0.1]}],
                "Wand B": [{"thicknesses": [], "performances": [1, 1, 0.1]}]
            }
        }))
        .unwrap();
        let summaries = product_summaries(&response.into());
        let names: Vec<&str> = summaries.iter().map(|s| s.product.as_str()).collect();
        assert_eq!(names, vec!["Wand B", "Wand A"]);
        assert_eq!(summaries[0].exact, 1);
        assert_eq!(summaries[0].tolerance, 1);
    }
}
