use axum::{body::Body, http::{Request, StatusCode}, Router};
use opensase_variants::{api, config::EngineConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(config: EngineConfig) -> Router { api::router(api::AppState::new(config)) }

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri).header("content-type", "application/json").body(Body::from(body.to_string())).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn dimensions() -> Value {
    json!([
        {"id": 1, "name": "Color", "categoryId": 5, "variantValues": [
            {"id": 1, "value": "Red"}, {"id": 2, "value": "Blue"}
        ]},
        {"id": 2, "name": "Size", "categoryId": 5, "variantValues": [
            {"id": 10, "value": "S"}, {"id": 11, "value": "M"}, {"id": 12, "value": "L"}
        ]}
    ])
}

fn saved_variants() -> Value {
    json!([
        {"id": 7, "price": 100, "sku": "P-1-10", "stock": 1, "productVariantValues": [
            {"variantValue": {"id": 1, "value": "Red", "variantId": 1, "variantName": "Color"}},
            {"variantValue": {"id": 10, "value": "S", "variantId": 2, "variantName": "Size"}}
        ]},
        {"id": 8, "price": 150, "sku": "P-2-11", "stock": 0, "productVariantValues": [
            {"variantValue": {"id": 2, "value": "Blue", "variantId": 1, "variantName": "Color"}},
            {"variantValue": {"id": 11, "value": "M", "variantId": 2, "variantName": "Size"}}
        ]}
    ])
}

#[tokio::test]
async fn test_health() {
    let response = app(EngineConfig::default())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_combinations_preserve_previous_rows() {
    let body = json!({
        "categoryId": 5,
        "dimensions": dimensions(),
        "selected": {"1": [1, 2], "2": [10, 11]},
        "previous": [{"variantValueIds": [11, 2], "price": 500000, "sku": "BLUE-M", "stock": 4}]
    });
    let (status, out) = post(app(EngineConfig::default()), "/api/v1/variants/combinations", body).await;
    assert_eq!(status, StatusCode::OK);
    let rows = out["variants"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["variantValueIds"], json!([1, 10]));
    assert_eq!(rows[3]["variantValueIds"], json!([2, 11]));
    assert_eq!(rows[3]["sku"], "BLUE-M");
    assert_eq!(rows[3]["price"].as_f64(), Some(500000.0));
    assert_eq!(out["carried"], 1);
    assert_eq!(out["created"], 3);
    assert_eq!(out["capped"], false);
}

#[tokio::test]
async fn test_combinations_are_capped() {
    let config = EngineConfig { max_combinations: 2, ..EngineConfig::default() };
    let body = json!({"dimensions": dimensions(), "selected": {"1": [1, 2], "2": [10, 11, 12]}});
    let (_, out) = post(app(config), "/api/v1/variants/combinations", body).await;
    assert_eq!(out["variants"].as_array().unwrap().len(), 2);
    assert_eq!(out["requested"], 6);
    assert_eq!(out["capped"], true);
}

#[tokio::test]
async fn test_no_selection_gives_empty_matrix() {
    let body = json!({"dimensions": dimensions(), "selected": {"1": []}});
    let (status, out) = post(app(EngineConfig::default()), "/api/v1/variants/combinations", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["variants"], json!([]));
}

#[tokio::test]
async fn test_bulk_apply() {
    let body = json!({
        "variants": [{"variantValueIds": [1], "price": 1, "sku": "A"}, {"variantValueIds": [2], "price": 2, "stock": 9}],
        "price": 30, "stock": 3, "sku": "ALL"
    });
    let (_, out) = post(app(EngineConfig::default()), "/api/v1/variants/bulk-apply", body).await;
    let rows = out.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row["price"].as_f64(), Some(30.0));
        assert_eq!(row["stock"], 3);
        assert_eq!(row["sku"], "ALL");
    }
    assert_eq!(rows[1]["variantValueIds"], json!([2]));
}

#[tokio::test]
async fn test_match_full_partial_and_missing() {
    let (_, full) = post(app(EngineConfig::default()), "/api/v1/variants/match",
        json!({"variants": saved_variants(), "selection": {"Color": "Blue", "Size": "M"}})).await;
    assert_eq!(full["variant"]["id"], 8);
    assert_eq!(full["provisional"], false);

    let (_, partial) = post(app(EngineConfig::default()), "/api/v1/variants/match",
        json!({"variants": saved_variants(), "selection": {"Size": "M"}})).await;
    assert_eq!(partial["variant"]["id"], 8);
    assert_eq!(partial["provisional"], true);

    let (_, missing) = post(app(EngineConfig::default()), "/api/v1/variants/match",
        json!({"variants": saved_variants(), "selection": {"Color": "Red", "Size": "M"}})).await;
    assert_eq!(missing["variant"], Value::Null);
    assert_eq!(missing["provisional"], false);
}

#[tokio::test]
async fn test_match_treats_empty_value_as_unset() {
    let (status, out) = post(app(EngineConfig::default()), "/api/v1/variants/match",
        json!({"variants": saved_variants(), "selection": {"Color": "", "Size": "M"}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["variant"]["id"], 8);
    assert_eq!(out["provisional"], true);
}

#[tokio::test]
async fn test_options() {
    let (_, out) = post(app(EngineConfig::default()), "/api/v1/variants/options", json!({"variants": saved_variants()})).await;
    assert_eq!(out["groups"][0], json!({"name": "Color", "values": ["Red", "Blue"]}));
    assert_eq!(out["defaultSelection"], json!({"Color": "Red", "Size": "S"}));
}

#[tokio::test]
async fn test_validate_fills_skus_and_rejects_bad_rows() {
    let ok = json!({"spu": "tee", "variants": [{"variantValueIds": [3, 1], "price": 10, "stock": 1}]});
    let (status, out) = post(app(EngineConfig::default()), "/api/v1/variants/validate", ok).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["variants"][0]["sku"], "TEE-1-3");
    assert_eq!(out["variants"][0]["variantValueIds"], json!([1, 3]));

    let bad = json!({"variants": [{"variantValueIds": [1], "price": 10, "sku": "X", "stock": -2}]});
    let (status, _) = post(app(EngineConfig::default()), "/api/v1/variants/validate", bad).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
