//! HTTP client tests against a local mock catalog service.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use wallmatch::models::{Classification, MatchRequest, PreFilter, RequirementProfile, Sampling};
use wallmatch::services::{CatalogClient, HttpCatalogClient};

#[derive(Debug, Default)]
struct Recorded {
    paths: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Value>>,
}

type Shared = Arc<Recorded>;

async fn list_products(Path(typ): Path<String>) -> Result<Json<Value>, StatusCode> {
    if typ == "Aussenwand" {
        Ok(Json(json!(["Aussenwand 1.1", "Aussenwand 1.1/B"])))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn layers(
    State(recorded): State<Shared>,
    Path((typ, product)): Path<(String, String)>,
) -> Json<Value> {
    recorded
        .paths
        .lock()
        .unwrap()
        .push(format!("{typ}|{product}"));
    Json(json!({
        "product_name": product,
        "layers": {
            "Putz": [[10, 5]],
            "Gipsfaser": [[15, 20], [18, 22]]
        }
    }))
}

async fn lignum(Path(key): Path<String>) -> Result<Json<Value>, StatusCode> {
    match key.as_str() {
        "Aussenwand 1.1" => Ok(Json(json!({
            "bauteilname": "Aussenwand 1.1",
            "katalognr": "AW-1",
            "laufnummer": "0001",
            "uwert": "0.14"
        }))),
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn apply(State(recorded): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    recorded.bodies.lock().unwrap().push(body);
    Json(json!({
        "meets_req": {
            "Aussenwand 1.1": [
                {"thicknesses": [10, 15, 320], "performances": [345, 300, 0.14], "soft_violation": 0.5}
            ]
        },
        "meets_req_with_tol": {
            "Aussenwand 1.1": [
                {"thicknesses": [10, 18, 340], "performances": [368, 330, 0.16], "color": "#ffaa00", "soft_violation": 0.2}
            ]
        }
    }))
}

async fn spawn_server() -> (String, Shared) {
    let recorded = Shared::default();
    let router = Router::new()
        .route("/api/v1/buildups/{typ}", get(list_products))
        .route("/api/v1/buildups/{typ}/{product}/layers", get(layers))
        .route("/api/v1/lignum/{key}", get(lignum))
        .route("/api/v1/requirement_profiles/apply", post(apply))
        .with_state(Arc::clone(&recorded));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/api/v1"), recorded)
}

fn client(base_url: &str) -> HttpCatalogClient {
    HttpCatalogClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_products() {
    let (base_url, _) = spawn_server().await;
    let client = client(&base_url);

    let products = client.list_products("Aussenwand").await.unwrap();
    assert_eq!(products, vec!["Aussenwand 1.1", "Aussenwand 1.1/B"]);

    assert!(client.list_products("Decken").await.is_err());
}

#[tokio::test]
async fn test_fetch_layers_encodes_product_name() {
    let (base_url, recorded) = spawn_server().await;
    let client = client(&base_url);

    let layers = client.fetch_layers("Aussenwand 1.1/B").await.unwrap();
    assert_eq!(layers.names(), vec!["Putz", "Gipsfaser"]);
    assert_eq!(layers.get("Gipsfaser").unwrap().variant_count(), 2);

    let paths = recorded.paths.lock().unwrap().clone();
    assert_eq!(paths, vec!["Aussenwand|Aussenwand 1.1/B"]);
}

#[tokio::test]
async fn test_fetch_lignum() {
    let (base_url, _) = spawn_server().await;
    let client = client(&base_url);

    let record = client.fetch_lignum("Aussenwand 1.1").await.unwrap();
    assert_eq!(record.katalognr, "AW-1");

    let err = client.fetch_lignum("Aussenwand 9").await.unwrap_err();
    assert!(format!("{err:#}").contains("500"));
}

#[tokio::test]
async fn test_apply_profile_body_and_classification() {
    let (base_url, recorded) = spawn_server().await;
    let client = client(&base_url);

    let mut pre_filter = PreFilter::new();
    pre_filter.clear_selection("Putz");
    pre_filter.set_selection("Gipsfaser", [1], 2);
    let request = MatchRequest::new(
        "Aussenwand 1.1",
        &RequirementProfile::default(),
        Some(Sampling::Horizontal),
        Some(pre_filter),
    );

    let results = client.apply_profile(&request).await.unwrap();
    assert_eq!(results.total(), 2);

    let exact = results.exact.get("Aussenwand 1.1");
    assert_eq!(exact[0].classification, Classification::Exact);
    assert_eq!(exact[0].soft_violation, None);
    let tolerance = results.tolerance.get("Aussenwand 1.1");
    assert_eq!(tolerance[0].soft_violation, Some(0.2));
    assert_eq!(tolerance[0].color.as_deref(), Some("#ffaa00"));
    assert!(results.fail.is_empty());

    let body = recorded.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["product"], "Aussenwand 1.1");
    assert_eq!(body["tThresh"], 350.0);
    assert_eq!(body["uTol"], 0.03);
    assert_eq!(body["tThreshOp"], "~=");
    assert_eq!(body["pThreshOp"], "<=");
    assert_eq!(body["sampling"], "horizontal");
    assert_eq!(body["preFilter"], json!({"Putz": null, "Gipsfaser": [1]}));
}

#[tokio::test]
async fn test_unreachable_service_is_an_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpCatalogClient::new(&format!("http://{addr}/api/v1"), Duration::from_secs(1))
        .unwrap();
    assert!(client.list_products("Aussenwand").await.is_err());
}
