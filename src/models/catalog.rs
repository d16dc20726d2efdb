//! Catalog data: products (walls), their layers and manufacturable variants.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Returns the category (`bauteilTyp`) of a product: the first space-separated token
/// of its name.
///
/// # Examples
///
/// ```
/// use wallmatch::models::bauteil_typ;
///
/// assert_eq!(bauteil_typ("Aussenwand 1.1"), "Aussenwand");
/// assert_eq!(bauteil_typ("Decken"), "Decken");
/// ```
#[must_use]
pub fn bauteil_typ(product_name: &str) -> &str {
    product_name.split(' ').next().unwrap_or(product_name)
}

/// One concrete (thickness, price) option for a layer.
///
/// On the wire a variant is a two-element array `[thickness, price]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Variant {
    /// Thickness in millimetres
    pub thickness: f64,
    /// Price in CHF/m²
    pub price: f64,
}

impl Variant {
    /// Creates a new variant.
    #[must_use]
    pub const fn new(thickness: f64, price: f64) -> Self {
        Self { thickness, price }
    }
}

impl From<(f64, f64)> for Variant {
    fn from((thickness, price): (f64, f64)) -> Self {
        Self { thickness, price }
    }
}

impl From<Variant> for (f64, f64) {
    fn from(variant: Variant) -> Self {
        (variant.thickness, variant.price)
    }
}

/// Inclusive thickness interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThicknessRange {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl ThicknessRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest range covering every thickness, or `None` for an empty input.
    pub fn spanning(thicknesses: impl IntoIterator<Item = f64>) -> Option<Self> {
        thicknesses.into_iter().fold(None, |acc, t| match acc {
            None => Some(Self::new(t, t)),
            Some(range) => Some(Self::new(range.min.min(t), range.max.max(t))),
        })
    }

    /// Returns true if `value` lies within the range, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamps `value` to the nearest bound.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

/// A named construction layer with its ordered variants.
///
/// The position of a variant in `variants` is its stable index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name (unique within a wall)
    pub name: String,
    /// Manufacturable variants in catalog order
    pub variants: Vec<Variant>,
}

impl Layer {
    /// Creates a new layer.
    pub fn new(name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }

    /// Number of variants.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Thickness of the variant at `index`.
    #[must_use]
    pub fn thickness(&self, index: usize) -> Option<f64> {
        self.variants.get(index).map(|v| v.thickness)
    }

    /// Min/max thickness across all variants; `None` when the layer has no variants.
    #[must_use]
    pub fn thickness_range(&self) -> Option<ThicknessRange> {
        ThicknessRange::spanning(self.variants.iter().map(|v| v.thickness))
    }

    /// Indices of the variants whose thickness lies within `range` (inclusive).
    #[must_use]
    pub fn indices_within(&self, range: &ThicknessRange) -> Vec<usize> {
        self.variants
            .iter()
            .enumerate()
            .filter(|(_, v)| range.contains(v.thickness))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Ordered layers of one wall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSet {
    layers: Vec<Layer>,
}

impl LayerSet {
    /// Creates a layer set from layers in wall order.
    #[must_use]
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Returns true if the wall has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Looks up a layer by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Iterates over the layers in wall order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Layer names in wall order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }
}

impl From<IndexMap<String, Vec<Variant>>> for LayerSet {
    fn from(map: IndexMap<String, Vec<Variant>>) -> Self {
        Self::new(
            map.into_iter()
                .map(|(name, variants)| Layer { name, variants })
                .collect(),
        )
    }
}

/// Response body of `GET /buildups/{bauteilTyp}/{productName}/layers`.
#[derive(Debug, Clone, Deserialize)]
pub struct LayersResponse {
    /// Echoed product name
    #[serde(default)]
    pub product_name: Option<String>,
    /// Layers keyed by name, in wall order
    pub layers: IndexMap<String, Vec<Variant>>,
}

impl From<LayersResponse> for LayerSet {
    fn from(response: LayersResponse) -> Self {
        response.layers.into()
    }
}
