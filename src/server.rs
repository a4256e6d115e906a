//! HTTP surface: route table, handlers, and the error-to-response mapping.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::model::ScoreError;
use crate::predictor::{PredictError, Predictor};
use crate::session::{SessionStore, SessionView, Visibility};
use crate::types::{format_price, PredictForm, PredictionRequest};

const INDEX_HTML: &str = include_str!("../assets/index.html");
const SESSION_COOKIE: &str = "sid";

/// Shared application state. Catalog, predictor, and config are read-only
/// after startup; only the session store mutates, behind its own lock.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub predictor: Arc<Predictor>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<AppConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/catalog", get(catalog_options))
        .route("/api/models", get(models_for_company))
        .route("/api/predict", post(predict))
        .route("/api/result", get(current_result))
        .with_state(state)
}

/// User-facing failure classes for one submission. None of them touch the
/// session slot, so whatever was visible before stays visible.
#[derive(Debug)]
pub enum ApiError {
    /// Required fields left unset; surfaced as a warning, not an error.
    Incomplete(Vec<&'static str>),
    /// The request was complete but could not be priced.
    Prediction(PredictError),
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        ApiError::Prediction(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Incomplete(missing) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "warning": "please fill in all the required fields",
                    "missing": missing,
                })),
            )
                .into_response(),
            ApiError::Prediction(err) => {
                let status = match &err {
                    PredictError::KmsOutOfRange { .. } => StatusCode::BAD_REQUEST,
                    PredictError::UnknownOption { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    PredictError::Score(ScoreError::UnknownCategory { .. }) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    PredictError::Score(ScoreError::NonFinite) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("prediction failed: {}", err);
                }
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
        }
    }
}

// ---------- Handlers ----------

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let page = INDEX_HTML
        .replace("{{kms_min}}", &state.config.kms_min.to_string())
        .replace("{{kms_max}}", &state.config.kms_max.to_string())
        .replace("{{kms_default}}", &state.config.kms_default.to_string())
        .replace("{{kms_step}}", &state.config.kms_step.to_string());

    let (_, cookie) = resolve_session(&headers, &state.sessions);
    with_session_cookie(Html(page).into_response(), cookie)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    records: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        records: state.catalog.len(),
    })
}

#[derive(Serialize)]
struct CatalogResponse {
    companies: Vec<String>,
    years: Vec<i32>,
    fuel_types: Vec<String>,
}

async fn catalog_options(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        companies: state.catalog.companies().to_vec(),
        years: state.catalog.years().to_vec(),
        fuel_types: state.catalog.fuel_types().to_vec(),
    })
}

#[derive(Deserialize)]
struct ModelsQuery {
    company: Option<String>,
}

async fn models_for_company(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Json<ModelsResponse> {
    let models = match query.company.as_deref() {
        Some(company) => state.catalog.models_for(company),
        None => Vec::new(),
    };
    Json(ModelsResponse { models })
}

#[derive(Serialize)]
struct ModelsResponse {
    models: Vec<String>,
}

#[derive(Serialize)]
struct PredictResponse {
    price: f64,
    display_price: String,
    car: PredictionRequest,
}

async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<PredictForm>,
) -> Response {
    let (session, cookie) = resolve_session(&headers, &state.sessions);
    let response = match run_predict(&state, session, form) {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => err.into_response(),
    };
    with_session_cookie(response, cookie)
}

/// One submission, start to finish: completeness check, prediction, session
/// update. Returns before touching the predictor when fields are missing.
fn run_predict(
    state: &AppState,
    session: Uuid,
    form: PredictForm,
) -> Result<PredictResponse, ApiError> {
    let request = form.into_request().map_err(ApiError::Incomplete)?;

    // Debug signal so malformed submissions can be seen before scoring
    if std::env::var("LOG_PRED").ok().as_deref() == Some("1") {
        tracing::info!(
            "recv name={} company={} year={} kms={} fuel={}",
            request.name,
            request.company,
            request.year,
            request.kms_driven,
            request.fuel_type
        );
    }

    let result = state.predictor.predict(&request)?;
    state.sessions.record_success(session, request.clone(), result);
    tracing::info!(
        "predicted {} for {} {} ({}, {} km)",
        format_price(result.price),
        request.company,
        request.name,
        request.year,
        request.kms_driven
    );

    Ok(PredictResponse {
        price: result.price,
        display_price: format_price(result.price),
        car: request,
    })
}

#[derive(Serialize)]
struct ResultResponse {
    visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    car: Option<PredictionRequest>,
}

async fn current_result(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, cookie) = resolve_session(&headers, &state.sessions);
    let body = render_view(state.sessions.view(session));
    with_session_cookie((StatusCode::OK, Json(body)).into_response(), cookie)
}

fn render_view(view: SessionView) -> ResultResponse {
    match view.last {
        Some(last) => ResultResponse {
            visibility: view.visibility,
            price: Some(last.result.price),
            display_price: Some(format_price(last.result.price)),
            car: Some(last.car),
        },
        None => ResultResponse {
            visibility: view.visibility,
            price: None,
            display_price: None,
            car: None,
        },
    }
}

// ---------- Session cookie plumbing ----------

fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == SESSION_COOKIE {
                return Uuid::parse_str(value.trim()).ok();
            }
        }
    }
    None
}

/// Resolve the caller's session, opening a fresh one when the cookie is
/// absent or names a session this process does not know (cleared cookies or
/// a restarted server both land here — that is the external full reset that
/// returns the page to its hidden state).
fn resolve_session(headers: &HeaderMap, sessions: &SessionStore) -> (Uuid, Option<HeaderValue>) {
    if let Some(id) = session_from_headers(headers) {
        if sessions.contains(id) {
            return (id, None);
        }
    }
    let id = sessions.create();
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, id
    );
    (id, HeaderValue::from_str(&cookie).ok())
}

fn with_session_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(value) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}
