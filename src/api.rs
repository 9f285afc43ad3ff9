//! HTTP surface of the variant engine

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::EngineConfig;
use crate::domain::combination::{Combination, ConcreteVariant};
use crate::domain::dimension::{normalize, SelectedDimensionSet};
use crate::domain::matcher::{default_selection, find_matching, option_groups, OptionGroup, Selection};
use crate::domain::matrix::{BulkEdit, VariantMatrix};
use crate::domain::pipeline::regenerate;
use crate::domain::value_objects::{CategoryId, DimensionId, Sku, ValueId};
use crate::{EngineError, ProductVariantRequest, ProductVariantResponse, RawVariant};

#[derive(Clone)] pub struct AppState { pub config: Arc<EngineConfig> }

impl AppState {
    pub fn new(config: EngineConfig) -> Self { Self { config: Arc::new(config) } }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-variants"})) }))
        .route("/api/v1/variants/combinations", post(combinations))
        .route("/api/v1/variants/bulk-apply", post(bulk_apply))
        .route("/api/v1/variants/match", post(match_selection))
        .route("/api/v1/variants/options", post(options))
        .route("/api/v1/variants/validate", post(validate))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn unprocessable(e: EngineError) -> (StatusCode, String) { (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()) }

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationsRequest {
    #[serde(default)] pub category_id: Option<CategoryId>,
    pub dimensions: Vec<RawVariant>,
    #[serde(default)] pub selected: BTreeMap<DimensionId, Vec<ValueId>>,
    #[serde(default)] pub previous: Vec<Combination>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationsResponse {
    pub variants: Vec<Combination>,
    pub requested: Option<usize>,
    pub capped: bool,
    pub carried: usize,
    pub created: usize,
    pub dropped: usize,
}

async fn combinations(State(s): State<AppState>, Json(r): Json<CombinationsRequest>) -> ApiResult<CombinationsResponse> {
    let available = normalize(r.dimensions, r.category_id);
    let selection = SelectedDimensionSet::from_map(r.selected);
    let previous = VariantMatrix::from_rows(r.previous);
    let run = regenerate(r.category_id, &available, &selection, &previous, s.config.max_combinations);
    let rec = run.reconciliation;
    Ok(Json(CombinationsResponse {
        requested: run.requested, capped: run.capped,
        carried: rec.carried, created: rec.created, dropped: rec.dropped,
        variants: rec.matrix.into_rows(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BulkApplyRequest { pub variants: Vec<Combination>, #[serde(flatten)] pub edit: BulkEdit }

async fn bulk_apply(Json(r): Json<BulkApplyRequest>) -> ApiResult<Vec<Combination>> {
    let matrix = crate::domain::matrix::bulk_apply(VariantMatrix::from_rows(r.variants), &r.edit);
    Ok(Json(matrix.into_rows()))
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest { pub variants: Vec<ProductVariantResponse>, #[serde(default)] pub selection: Selection }

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse { pub variant: Option<ConcreteVariant>, pub provisional: bool }

async fn match_selection(Json(r): Json<MatchRequest>) -> ApiResult<MatchResponse> {
    let variants: Vec<ConcreteVariant> = r.variants.into_iter().map(ConcreteVariant::from).collect();
    let groups = option_groups(&variants);
    let variant = find_matching(&variants, &r.selection).cloned();
    let provisional = variant.is_some() && groups.iter().any(|g| r.selection.get(&g.name).is_none());
    Ok(Json(MatchResponse { variant, provisional }))
}

#[derive(Debug, Deserialize)]
pub struct OptionsRequest { pub variants: Vec<ProductVariantResponse> }

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse { pub groups: Vec<OptionGroup>, pub default_selection: Selection }

async fn options(Json(r): Json<OptionsRequest>) -> ApiResult<OptionsResponse> {
    let variants: Vec<ConcreteVariant> = r.variants.into_iter().map(ConcreteVariant::from).collect();
    let groups = option_groups(&variants);
    let default_selection = default_selection(&groups);
    Ok(Json(OptionsResponse { groups, default_selection }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest { pub variants: Vec<Combination>, #[serde(default)] pub spu: Option<String> }

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse { pub variants: Vec<ProductVariantRequest> }

async fn validate(Json(r): Json<ValidateRequest>) -> ApiResult<ValidateResponse> {
    let mut matrix = VariantMatrix::from_rows(r.variants);
    if let Some(spu) = r.spu {
        let spu = Sku::new(spu).map_err(|e| unprocessable(e.into()))?;
        matrix.fill_blank_skus(&spu).map_err(unprocessable)?;
    }
    let variants = matrix.to_requests().map_err(unprocessable)?;
    Ok(Json(ValidateResponse { variants }))
}
