//! Catalog browsing commands: products of a category and layers of a wall.

use crate::cli::common::{print_json, CliError, CliResult, GlobalOptions};
use crate::models::{bauteil_typ, LayerSet};
use crate::services::{derive_ranges, CatalogClient};
use clap::Args;
use serde::Serialize;

/// List the products of a category
#[derive(Debug, Clone, Args)]
pub struct ProductsArgs {
    /// Category (bauteilTyp), defaults to the configured one
    #[arg(long = "type", value_name = "TYPE")]
    pub bauteil_typ: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show the layers and variants of a wall
#[derive(Debug, Clone, Args)]
pub struct LayersArgs {
    /// Product name, e.g. "Aussenwand 1.1"
    #[arg(value_name = "PRODUCT")]
    pub product: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// JSON response types
#[derive(Debug, Serialize)]
struct ProductsResponse {
    bauteil_typ: String,
    products: Vec<String>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct LayerItem {
    name: String,
    variants: Vec<VariantItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_thickness: Option<f64>,
}

#[derive(Debug, Serialize)]
struct VariantItem {
    index: usize,
    thickness: f64,
    price: f64,
}

#[derive(Debug, Serialize)]
struct LayersResponse {
    product: String,
    bauteil_typ: String,
    layers: Vec<LayerItem>,
}

impl ProductsArgs {
    /// Execute the products command
    pub async fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let config = global.load_config()?;
        let client = global.connect(&config)?;
        let category = self
            .bauteil_typ
            .clone()
            .unwrap_or_else(|| config.session.bauteil_typ.clone());

        let products = client
            .list_products(&category)
            .await
            .map_err(|e| CliError::network(format!("Failed to load products: {e:#}")))?;

        if self.json {
            print_json(&ProductsResponse {
                bauteil_typ: category,
                count: products.len(),
                products,
            })
        } else {
            println!("{category} ({} products)", products.len());
            for product in &products {
                println!("  {product}");
            }
            Ok(())
        }
    }
}

fn layer_items(layers: &LayerSet) -> Vec<LayerItem> {
    let ranges = derive_ranges(layers);
    layers
        .iter()
        .map(|layer| {
            let range = ranges.get(&layer.name);
            LayerItem {
                name: layer.name.clone(),
                variants: layer
                    .variants
                    .iter()
                    .enumerate()
                    .map(|(index, v)| VariantItem {
                        index,
                        thickness: v.thickness,
                        price: v.price,
                    })
                    .collect(),
                min_thickness: range.map(|r| r.min),
                max_thickness: range.map(|r| r.max),
            }
        })
        .collect()
}

impl LayersArgs {
    /// Execute the layers command
    pub async fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let config = global.load_config()?;
        let client = global.connect(&config)?;

        let layers = client
            .fetch_layers(&self.product)
            .await
            .map_err(|e| CliError::network(format!("Failed to load layers: {e:#}")))?;

        let items = layer_items(&layers);
        if self.json {
            return print_json(&LayersResponse {
                product: self.product.clone(),
                bauteil_typ: bauteil_typ(&self.product).to_string(),
                layers: items,
            });
        }

        println!("{} ({} layers)", self.product, items.len());
        for item in &items {
            match (item.min_thickness, item.max_thickness) {
                (Some(min), Some(max)) => println!("  {}  [{min}..{max} mm]", item.name),
                _ => println!("  {}  (no variants)", item.name),
            }
            for v in &item.variants {
                println!("    #{}  {} mm  {} CHF/m²", v.index, v.thickness, v.price);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Layer, Variant};

    #[test]
    fn test_layer_items_ranges() {
        let layers = LayerSet::new(vec![
            Layer::new("Gipsfaser", vec![Variant::new(15.0, 20.0), Variant::new(18.0, 22.0)]),
            Layer::new("Leer", vec![]),
        ]);
        let items = layer_items(&layers);
        assert_eq!(items[0].min_thickness, Some(15.0));
        assert_eq!(items[0].max_thickness, Some(18.0));
        assert_eq!(items[0].variants[1].index, 1);
        assert_eq!(items[1].min_thickness, None);
    }
}
