use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use fairvalue_core::aggregate::WeightingPolicy;
use fairvalue_core::config::Settings;
use fairvalue_core::domain::contract::FundamentalsRecord;
use fairvalue_core::domain::fundamentals::Fundamentals;
use fairvalue_core::domain::valuation::{ModelId, ModelOutcome};
use fairvalue_core::models::{dcf, run_model};
use fairvalue_core::report::{value_fundamentals, ValuationReport};
use fairvalue_core::sector::{Sector, SectorParams};
use fairvalue_core::sensitivity::{sensitivity_grid, SensitivityGrid};

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Clone)]
pub struct AppState {
    settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/sectors", get(list_sectors))
        .route("/valuations", post(create_valuation))
        .route("/models/:model", post(run_single_model))
        .route("/sensitivity", post(create_sensitivity))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct SectorEntry {
    sector: Sector,
    params: &'static SectorParams,
}

async fn list_sectors() -> Json<Vec<SectorEntry>> {
    Json(
        Sector::ALL
            .into_iter()
            .map(|sector| SectorEntry {
                sector,
                params: sector.params(),
            })
            .collect(),
    )
}

#[derive(Debug, Default, Deserialize)]
struct ValuationQuery {
    policy: Option<WeightingPolicy>,
    #[serde(default)]
    grid: bool,
}

async fn create_valuation(
    State(state): State<AppState>,
    Query(query): Query<ValuationQuery>,
    Json(record): Json<FundamentalsRecord>,
) -> ApiResult<ValuationReport> {
    let f = validate(record)?;

    let mut opts = state.settings.report_options(query.grid);
    if let Some(policy) = query.policy {
        opts.policy = policy;
    }

    let report = value_fundamentals(&f, &opts).map_err(internal)?;

    tracing::info!(
        ticker = %report.ticker,
        policy = %opts.policy,
        fair_value = ?report.aggregate.fair_value,
        confidence = report.aggregate.confidence,
        "valued ticker"
    );

    Ok(Json(report))
}

async fn run_single_model(
    Path(model): Path<String>,
    Json(record): Json<FundamentalsRecord>,
) -> ApiResult<ModelOutcome> {
    let model = ModelId::from_str(&model).map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    let f = validate(record)?;
    Ok(Json(run_model(model, &f)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensitivityRequest {
    fundamentals: FundamentalsRecord,
    #[serde(default)]
    wacc_steps: Option<Vec<f64>>,
    #[serde(default)]
    growth_steps: Option<Vec<f64>>,
}

async fn create_sensitivity(
    State(state): State<AppState>,
    Json(req): Json<SensitivityRequest>,
) -> ApiResult<SensitivityGrid> {
    let f = validate(req.fundamentals)?;

    let result = dcf::value(&f).map_err(|reason| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("{}: DCF declined: {reason}", f.ticker),
        )
    })?;
    let Some(base) = result.dcf_detail() else {
        return Err(internal(anyhow::anyhow!("DCF result without DCF detail")));
    };

    let defaults = state.settings.sensitivity_steps.as_slice();
    let wacc_steps = req.wacc_steps.as_deref().unwrap_or(defaults);
    let growth_steps = req.growth_steps.as_deref().unwrap_or(defaults);

    let grid = sensitivity_grid(base, &f, wacc_steps, growth_steps)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}")))?;

    Ok(Json(grid))
}

fn validate(record: FundamentalsRecord) -> Result<Fundamentals, ApiError> {
    record.validate_and_into_fundamentals().map_err(|e| {
        tracing::warn!(error = %e, "rejected fundamentals record");
        (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}"))
    })
}

fn internal(err: anyhow::Error) -> ApiError {
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "valuation request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
}
