//! The `match` command: evaluate a wall (or a whole category) against a
//! requirement profile and print plot series and the product table.

use crate::cli::common::{print_json, CliError, CliResult, GlobalOptions};
use crate::constants::ALL_PRODUCTS;
use crate::models::{
    bauteil_typ, ComparisonOp, CriterionField, Metric, PreFilter, RequirementProfile, Sampling,
    ThicknessRange,
};
use crate::services::{
    Bound, CatalogClient, MatchStats, Orchestrator, PlotSeries, ProductSummary, ProductTable,
    RefreshOutcome, RequirementProfileStore,
};
use clap::Args;
use serde::Serialize;
use tracing::debug;

/// Match a wall against a requirement profile
#[derive(Debug, Clone, Args)]
pub struct MatchArgs {
    /// Product name; defaults to the first product of the category
    #[arg(value_name = "PRODUCT", conflicts_with = "all")]
    pub product: Option<String>,

    /// Evaluate every product of the category
    #[arg(long)]
    pub all: bool,

    /// Category (bauteilTyp), defaults to the product's or the configured one
    #[arg(long = "type", value_name = "TYPE")]
    pub bauteil_typ: Option<String>,

    /// Start from a saved profile instead of the session default
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Thickness threshold in mm
    #[arg(long, value_name = "MM")]
    pub t_thresh: Option<f64>,
    /// Thickness tolerance in mm
    #[arg(long, value_name = "MM")]
    pub t_tol: Option<f64>,
    /// Thickness operator (==, ~=, <, <=, >, >=)
    #[arg(long, value_name = "OP", allow_hyphen_values = true)]
    pub t_op: Option<ComparisonOp>,

    /// Price threshold in CHF/m²
    #[arg(long, value_name = "CHF")]
    pub p_thresh: Option<f64>,
    /// Price tolerance in CHF/m²
    #[arg(long, value_name = "CHF")]
    pub p_tol: Option<f64>,
    /// Price operator (==, ~=, <, <=, >, >=)
    #[arg(long, value_name = "OP", allow_hyphen_values = true)]
    pub p_op: Option<ComparisonOp>,

    /// U-value threshold in W/m²K
    #[arg(long, value_name = "U")]
    pub u_thresh: Option<f64>,
    /// U-value tolerance in W/m²K
    #[arg(long, value_name = "U")]
    pub u_tol: Option<f64>,
    /// U-value operator (==, ~=, <, <=, >, >=)
    #[arg(long, value_name = "OP", allow_hyphen_values = true)]
    pub u_op: Option<ComparisonOp>,

    /// Sampling mode (none, horizontal, vertical)
    #[arg(long, value_name = "MODE")]
    pub sampling: Option<String>,

    /// Restrict a layer to variants within a thickness range, e.g. "Daemmung=120..160"
    #[arg(long = "range", value_name = "LAYER=MIN..MAX", value_parser = parse_range)]
    pub ranges: Vec<(String, ThicknessRange)>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parses `LAYER=MIN..MAX`.
pub fn parse_range(value: &str) -> Result<(String, ThicknessRange), String> {
    let (layer, bounds) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("Expected LAYER=MIN..MAX, got '{value}'"))?;
    let (min, max) = bounds
        .split_once("..")
        .ok_or_else(|| format!("Expected MIN..MAX after '=', got '{bounds}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("Invalid thickness '{s}'"))
    };
    let layer = layer.trim();
    if layer.is_empty() {
        return Err("Layer name cannot be empty".to_string());
    }
    Ok((layer.to_string(), ThicknessRange::new(parse(min)?, parse(max)?)))
}

// JSON response types
#[derive(Debug, Serialize)]
struct MatchResponse {
    product: String,
    profile: RequirementProfile,
    sampling: Option<Sampling>,
    pre_filter: Option<PreFilter>,
    total_matches: usize,
    active_product: Option<String>,
    products: Vec<ProductSummary>,
    series: Vec<PlotSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<ProductTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<MatchStats>,
}

impl MatchArgs {
    /// Builds the starting profile from `--profile` and the per-metric overrides.
    fn profile(&self) -> CliResult<RequirementProfile> {
        let mut profile = match &self.profile {
            Some(name) => RequirementProfileStore::new()
                .load(name)
                .map_err(|e| CliError::validation(format!("{e:#}")))?,
            None => RequirementProfile::default(),
        };

        let overrides = [
            (Metric::Thickness, self.t_thresh, self.t_tol, self.t_op),
            (Metric::Price, self.p_thresh, self.p_tol, self.p_op),
            (Metric::UValue, self.u_thresh, self.u_tol, self.u_op),
        ];
        for (metric, threshold, tolerance, op) in overrides {
            if let Some(value) = threshold {
                profile.set_value(metric, CriterionField::Threshold, value);
            }
            if let Some(value) = tolerance {
                profile.set_value(metric, CriterionField::Tolerance, value);
            }
            if let Some(op) = op {
                profile.criterion_mut(metric).op = op;
            }
        }
        Ok(profile)
    }

    /// Execute the match command
    pub async fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        if self.all && !self.ranges.is_empty() {
            return Err(CliError::validation(
                "--range applies to a single product and cannot be combined with --all",
            ));
        }

        let config = global.load_config()?;
        let client = global.connect(&config)?;

        let mut options = config.session.options(self.profile()?);
        if let Some(mode) = &self.sampling {
            options.sampling =
                Sampling::parse_optional(mode).map_err(|e| CliError::validation(e.to_string()))?;
        }
        if let Some(category) = self
            .bauteil_typ
            .clone()
            .or_else(|| self.product.as_deref().map(|p| bauteil_typ(p).to_string()))
        {
            options.bauteil_typ = category;
        }

        let session = Orchestrator::new(client, options);

        let products = session
            .load_category(None)
            .await
            .map_err(|e| CliError::network(format!("{e:#}")))?;

        let target = if self.all {
            ALL_PRODUCTS.to_string()
        } else if let Some(product) = &self.product {
            product.clone()
        } else {
            products.first().cloned().ok_or_else(|| {
                CliError::validation(format!(
                    "Category '{}' has no products",
                    session.snapshot().bauteil_typ
                ))
            })?
        };

        if target == ALL_PRODUCTS {
            session.prefetch_layer_names().await;
        }
        session.prepare_wall(&target).await;

        let outcome = if self.ranges.is_empty() {
            session.refresh().await
        } else {
            self.apply_ranges(&session)?;
            session
                .apply_pre_filter()
                .await
                .map_err(|e| CliError::validation(format!("{e:#}")))?
        };
        debug!("Match outcome: {outcome:?}");

        let view = session.snapshot();
        if outcome == RefreshOutcome::Failed {
            return Err(CliError::network(
                view.message
                    .unwrap_or_else(|| "Failed to load performance data".to_string()),
            ));
        }

        let response = MatchResponse {
            product: target,
            profile: view.profile,
            sampling: view.sampling,
            pre_filter: view.pre_filter,
            total_matches: view.total_matches,
            active_product: view.active_product,
            products: session.product_summaries(),
            series: session.plot(&config.plot_colors()),
            table: session.table(),
            stats: session.stats(),
        };

        if self.json {
            print_json(&response)
        } else {
            print_human(&response);
            Ok(())
        }
    }

    fn apply_ranges<C: CatalogClient>(
        &self,
        session: &Orchestrator<C>,
    ) -> CliResult<()> {
        for (layer, range) in &self.ranges {
            let applied = session
                .edit_pre_filter(|editor| {
                    editor.on_range_change(layer, Bound::Min, range.min)
                        && editor.on_range_change(layer, Bound::Max, range.max)
                })
                .ok_or_else(|| CliError::network("Layers of the selected product are unavailable"))?;
            if !applied {
                return Err(CliError::validation(format!(
                    "Unknown layer or layer without variants: '{layer}'"
                )));
            }
        }
        Ok(())
    }
}

fn print_human(response: &MatchResponse) {
    println!("Product: {}", response.product);
    for (metric, criterion) in [
        (Metric::Thickness, response.profile.thickness),
        (Metric::Price, response.profile.price),
        (Metric::UValue, response.profile.u_value),
    ] {
        println!(
            "  {:<10} {} {} ± {} {}",
            metric.label(),
            criterion.op,
            criterion.threshold,
            criterion.tolerance,
            metric.unit()
        );
    }
    println!();

    for series in &response.series {
        println!("{}", series.name);
    }
    println!();

    if response.products.len() > 1 {
        println!("Products with matches:");
        for summary in &response.products {
            println!(
                "  {} (exact: {}, tolerance: {})",
                summary.product, summary.exact, summary.tolerance
            );
        }
        println!();
    }

    let Some(table) = &response.table else {
        println!("No matching combinations.");
        return;
    };

    println!("{}", table.product);
    if !table.layer_names.is_empty() {
        println!("  Layers: {}", table.layer_names.join(" | "));
    }
    for row in &table.rows {
        let thicknesses: Vec<String> = row.thicknesses.iter().map(f64::to_string).collect();
        let marker = if row.placeholder { " (no layer data)" } else { "" };
        let score = row
            .soft_violation
            .map(|s| format!("  soft violation {s:.4}"))
            .unwrap_or_default();
        println!(
            "  {:>3}  {:<9} [{}]{marker}  {:.1} mm  {:.0} CHF/m²  {:.3} W/m²K{score}",
            row.id,
            format!("{:?}", row.classification),
            thicknesses.join(", "),
            row.performance.thickness,
            row.performance.price,
            row.performance.u_value,
        );
    }

    if let Some(stats) = &response.stats {
        println!();
        println!(
            "Price (exact): min {:.0}  median {:.0}  max {:.0} CHF/m²  ({} matches)",
            stats.price.min, stats.price.median, stats.price.max, stats.price.count
        );
        println!(
            "Thickness (exact): min {:.1}  median {:.1}  max {:.1} mm",
            stats.thickness.min, stats.thickness.median, stats.thickness.max
        );
    }
}
