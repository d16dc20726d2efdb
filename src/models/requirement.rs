//! Requirement profiles: per-metric thresholds, tolerances and comparison operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator applied by the matcher between a performance value and its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// `==`
    #[serde(rename = "==")]
    Equal,
    /// `~=`
    #[serde(rename = "~=")]
    ApproxEqual,
    /// `<`
    #[serde(rename = "<")]
    Less,
    /// `<=`
    #[serde(rename = "<=")]
    LessOrEqual,
    /// `>`
    #[serde(rename = ">")]
    Greater,
    /// `>=`
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl ComparisonOp {
    /// Every operator, in the order the profile editor offers them.
    pub const ALL: [Self; 6] = [
        Self::Equal,
        Self::ApproxEqual,
        Self::Less,
        Self::LessOrEqual,
        Self::Greater,
        Self::GreaterOrEqual,
    ];

    /// Wire symbol of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::ApproxEqual => "~=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == s.trim())
            .ok_or_else(|| {
                anyhow::anyhow!("Invalid operator '{s}'. Must be one of ==, ~=, <, <=, >, >=")
            })
    }
}

/// Performance metric evaluated by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Total assembly thickness in mm
    Thickness,
    /// Price in CHF/m²
    Price,
    /// Thermal transmittance in W/m²K
    UValue,
}

impl Metric {
    /// All metrics in wire order.
    pub const ALL: [Self; 3] = [Self::Thickness, Self::Price, Self::UValue];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Thickness => "Thickness",
            Self::Price => "Price",
            Self::UValue => "U-Value",
        }
    }

    /// Unit suffix used in labels and tables.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Thickness => "mm",
            Self::Price => "CHF/m²",
            Self::UValue => "W/m²K",
        }
    }

    /// Accepted input interval for the threshold of this metric.
    #[must_use]
    pub const fn threshold_bounds(self) -> (f64, f64) {
        match self {
            Self::Thickness => (100.0, 700.0),
            Self::Price => (100.0, 500.0),
            Self::UValue => (0.1, 0.3),
        }
    }

    /// Accepted input interval for the tolerance of this metric.
    #[must_use]
    pub const fn tolerance_bounds(self) -> (f64, f64) {
        match self {
            Self::Thickness | Self::Price => (0.0, 50.0),
            Self::UValue => (0.0, 0.3),
        }
    }
}

/// Which part of a criterion a numeric input addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionField {
    /// The threshold value
    Threshold,
    /// The tolerance band
    Tolerance,
}

/// Threshold, tolerance and operator for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Target value
    pub threshold: f64,
    /// Allowed deviation for a tolerance match
    pub tolerance: f64,
    /// Comparison applied against the threshold
    pub op: ComparisonOp,
}

impl Criterion {
    /// Creates a new criterion.
    #[must_use]
    pub const fn new(threshold: f64, tolerance: f64, op: ComparisonOp) -> Self {
        Self {
            threshold,
            tolerance,
            op,
        }
    }
}

/// Global multi-criterion requirement profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequirementProfile {
    /// Thickness requirement
    pub thickness: Criterion,
    /// Price requirement
    pub price: Criterion,
    /// U-value requirement
    pub u_value: Criterion,
}

impl Default for RequirementProfile {
    /// Profile active at session start.
    fn default() -> Self {
        Self {
            thickness: Criterion::new(350.0, 20.0, ComparisonOp::ApproxEqual),
            price: Criterion::new(350.0, 10.0, ComparisonOp::LessOrEqual),
            u_value: Criterion::new(0.15, 0.03, ComparisonOp::LessOrEqual),
        }
    }
}

impl RequirementProfile {
    /// Built-in named profiles available at session start, in registry order.
    #[must_use]
    pub fn builtins() -> [(&'static str, Self); 2] {
        [
            (
                "Default1",
                Self {
                    thickness: Criterion::new(350.0, 20.0, ComparisonOp::ApproxEqual),
                    price: Criterion::new(350.0, 10.0, ComparisonOp::LessOrEqual),
                    u_value: Criterion::new(0.2, 0.15, ComparisonOp::LessOrEqual),
                },
            ),
            (
                "Default2",
                Self {
                    thickness: Criterion::new(400.0, 20.0, ComparisonOp::ApproxEqual),
                    price: Criterion::new(400.0, 10.0, ComparisonOp::LessOrEqual),
                    u_value: Criterion::new(0.15, 0.1, ComparisonOp::LessOrEqual),
                },
            ),
        ]
    }

    /// Criterion for `metric`.
    #[must_use]
    pub const fn criterion(&self, metric: Metric) -> &Criterion {
        match metric {
            Metric::Thickness => &self.thickness,
            Metric::Price => &self.price,
            Metric::UValue => &self.u_value,
        }
    }

    /// Mutable criterion for `metric`.
    pub fn criterion_mut(&mut self, metric: Metric) -> &mut Criterion {
        match metric {
            Metric::Thickness => &mut self.thickness,
            Metric::Price => &mut self.price,
            Metric::UValue => &mut self.u_value,
        }
    }

    /// Sets a threshold or tolerance, clamped to the metric's input bounds.
    pub fn set_value(&mut self, metric: Metric, field: CriterionField, value: f64) {
        let (lo, hi) = match field {
            CriterionField::Threshold => metric.threshold_bounds(),
            CriterionField::Tolerance => metric.tolerance_bounds(),
        };
        let clamped = value.clamp(lo, hi);
        let criterion = self.criterion_mut(metric);
        match field {
            CriterionField::Threshold => criterion.threshold = clamped,
            CriterionField::Tolerance => criterion.tolerance = clamped,
        }
    }

    /// Applies a manually typed value on confirmation.
    ///
    /// Out-of-bounds numbers are clamped; non-numeric input is ignored and the prior
    /// value kept. Returns true if the profile changed.
    pub fn confirm_input(&mut self, metric: Metric, field: CriterionField, input: &str) -> bool {
        let Ok(value) = input.trim().parse::<f64>() else {
            return false;
        };
        if !value.is_finite() {
            return false;
        }
        let before = *self;
        self.set_value(metric, field, value);
        *self != before
    }
}

/// Sampling mode forwarded to the matcher.
///
/// The matcher's interpretation is opaque to this crate; `None` at the call site
/// serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// `"horizontal"`
    Horizontal,
    /// `"vertical"`
    Vertical,
}

impl Sampling {
    /// Parses a CLI/config value; `"none"` maps to `Ok(None)`.
    pub fn parse_optional(value: &str) -> anyhow::Result<Option<Self>> {
        match value.trim().to_lowercase().as_str() {
            "none" => Ok(None),
            "horizontal" => Ok(Some(Self::Horizontal)),
            "vertical" => Ok(Some(Self::Vertical)),
            other => anyhow::bail!(
                "Invalid sampling '{other}'. Must be 'none', 'horizontal', or 'vertical'"
            ),
        }
    }
}

impl fmt::Display for Sampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}
