//! Reference metadata of a catalog construction (display only).

use serde::{Deserialize, Serialize};

/// Name wrapper used by several nested fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Media links of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Preview image URL
    #[serde(default)]
    pub image_jpg: Option<String>,
    /// Detail drawing URL
    #[serde(default)]
    pub detail: Option<String>,
}

/// Airborne sound insulation values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirborneSound {
    /// Weighted sound reduction index Rw in dB
    #[serde(default)]
    pub rw: Option<f64>,
}

/// Insulation values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsulationValues {
    /// Airborne sound values
    #[serde(default)]
    pub luftschalldaemmwerte: Option<AirborneSound>,
}

/// Source of the construction data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Publisher
    #[serde(default)]
    pub quelle: Option<String>,
    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,
}

/// Response body of `GET /lignum/{key}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LignumRecord {
    /// Construction name
    #[serde(default)]
    pub bauteilname: String,
    /// Catalog number
    #[serde(default)]
    pub katalognr: String,
    /// Sequence number
    #[serde(default)]
    pub laufnummer: String,
    /// U-value as published
    #[serde(default)]
    pub uwert: String,
    /// Build-up height in mm
    #[serde(default)]
    pub aufbauhoehe: Option<f64>,
    /// Weight in kg/m²
    #[serde(default)]
    pub gewicht: Option<f64>,
    /// Global warming potential
    #[serde(default)]
    pub gwp: Option<f64>,
    /// Media links
    #[serde(default)]
    pub media: Option<Media>,
    /// Component type
    #[serde(default)]
    pub bauteiltyp: Option<Named>,
    /// Facade type
    #[serde(default)]
    pub fassadentyp: Option<Named>,
    /// Cladding
    #[serde(default)]
    pub bekleidung: Option<Named>,
    /// Insulation values
    #[serde(default)]
    pub daemmwerte: Option<InsulationValues>,
    /// Data source
    #[serde(default)]
    pub quellekonstruktion: Option<Source>,
}

impl LignumRecord {
    /// Weighted sound reduction index, if reported.
    #[must_use]
    pub fn rw(&self) -> Option<f64> {
        self.daemmwerte
            .as_ref()?
            .luftschalldaemmwerte
            .as_ref()?
            .rw
    }
}
