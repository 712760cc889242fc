use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::calculators::{
    CalculationOutcome, CalculationRequest, CalculationType, ImpactOutcome, InputFields,
    ValidationError,
};

use super::domain::{CalculationId, ProfileId, UserId};
use super::query::HistoryQuery;
use super::repository::{CalculationRepository, ProfileRepository, RepositoryError, StatsAggregator};
use super::service::{CalculationService, CalculationServiceError};

/// Header carrying the authenticated user id, set by the upstream auth proxy.
pub const USER_HEADER: &str = "x-user-id";

type SharedService<R, P, A> = Arc<CalculationService<R, P, A>>;

/// Body of a save request: the calculator input plus an optional display title.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveCalculationRequest {
    pub calculation: CalculationRequest,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfileRequest {
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub name: String,
    #[serde(default)]
    pub data: InputFields,
}

/// Router builder exposing the calculator, history, stats and preset endpoints.
pub fn calculation_router<R, P, A>(service: Arc<CalculationService<R, P, A>>) -> Router
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    Router::new()
        .route("/api/v1/calculation-types", get(types_handler))
        .route("/api/v1/calculate", post(calculate_handler::<R, P, A>))
        .route(
            "/api/v1/calculations",
            post(save_handler::<R, P, A>).get(history_handler::<R, P, A>),
        )
        .route(
            "/api/v1/calculations/recent",
            get(recent_handler::<R, P, A>),
        )
        .route(
            "/api/v1/calculations/:calculation_id",
            get(fetch_handler::<R, P, A>).delete(delete_handler::<R, P, A>),
        )
        .route("/api/v1/users/stats", get(stats_handler::<R, P, A>))
        .route("/api/v1/profiles", post(create_profile_handler::<R, P, A>))
        .route(
            "/api/v1/profiles/:calculation_type",
            get(profiles_handler::<R, P, A>),
        )
        .route(
            "/api/v1/profiles/:calculation_type/:profile_id",
            delete(delete_profile_handler::<R, P, A>),
        )
        .route(
            "/api/v1/profiles/:calculation_type/:profile_id/calculate",
            post(calculate_profile_handler::<R, P, A>),
        )
        .with_state(service)
}

pub(crate) async fn types_handler() -> Response {
    let views: Vec<_> = CalculationType::ordered()
        .into_iter()
        .map(CalculationType::view)
        .collect();
    (StatusCode::OK, axum::Json(views)).into_response()
}

pub(crate) async fn calculate_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    request: Result<axum::Json<CalculationRequest>, JsonRejection>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.calculate(&request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(preview(&outcome))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn save_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    body: Result<axum::Json<SaveCalculationRequest>, JsonRejection>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };
    let axum::Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.save(&user_id, &body.calculation, body.title) {
        Ok(saved) => (StatusCode::CREATED, axum::Json(saved)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    match service.history(&user_id, &query) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn recent_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    match service.recent(&user_id) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn fetch_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    Path(calculation_id): Path<String>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    match service.get(&user_id, &CalculationId(calculation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    Path(calculation_id): Path<String>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    match service.delete(&user_id, &CalculationId(calculation_id)) {
        Ok(deleted) => (StatusCode::OK, axum::Json(deleted)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    match service.stats(&user_id) {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_profile_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    body: Result<axum::Json<CreateProfileRequest>, JsonRejection>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };
    let axum::Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.create_profile(&user_id, body.calculation_type, &body.name, body.data) {
        Ok(preset) => (StatusCode::CREATED, axum::Json(preset)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn profiles_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    Path(calculation_type): Path<String>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    let result = parse_type(&calculation_type)
        .and_then(|kind| service.profiles(&user_id, kind));
    match result {
        Ok(presets) => (StatusCode::OK, axum::Json(presets)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_profile_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    Path((calculation_type, profile_id)): Path<(String, String)>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    let result = parse_type(&calculation_type)
        .and_then(|kind| service.delete_profile(&user_id, kind, &ProfileId(profile_id)));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn calculate_profile_handler<R, P, A>(
    State(service): State<SharedService<R, P, A>>,
    headers: HeaderMap,
    Path((calculation_type, profile_id)): Path<(String, String)>,
) -> Response
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    let Some(user_id) = user_from(&headers) else {
        return unauthorized();
    };

    let result = parse_type(&calculation_type)
        .and_then(|kind| service.calculate_profile(&user_id, kind, &ProfileId(profile_id)));
    match result {
        Ok(outcome) => (StatusCode::OK, axum::Json(preview(&outcome))).into_response(),
        Err(err) => error_response(err),
    }
}

fn user_from(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
}

fn parse_type(raw: &str) -> Result<CalculationType, CalculationServiceError> {
    CalculationType::from_id(raw).ok_or_else(|| {
        ValidationError::UnknownSelection {
            field: "type",
            value: raw.to_string(),
        }
        .into()
    })
}

fn preview(outcome: &CalculationOutcome) -> Value {
    json!({
        "title": outcome.title(),
        "summary": outcome.summary(),
        "details": outcome.details(),
        "calculation": outcome,
    })
}

fn unauthorized() -> Response {
    let payload = json!({
        "error": format!("missing {USER_HEADER} header"),
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

/// Renders a body rejection in the validation payload shape, with its own `code`.
fn rejection_response(rejection: JsonRejection) -> Response {
    let code = match &rejection {
        JsonRejection::JsonDataError(_) => "invalid_body",
        JsonRejection::JsonSyntaxError(_) => "malformed_json",
        JsonRejection::MissingJsonContentType(_) => "unsupported_media_type",
        _ => "unreadable_body",
    };
    let payload = json!({
        "error": rejection.body_text(),
        "code": code,
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

/// Maps service failures onto status codes; storage and aggregation outages are retryable.
pub(crate) fn error_response(err: CalculationServiceError) -> Response {
    match err {
        CalculationServiceError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
                "code": error.code(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CalculationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "error": "not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CalculationServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({
                "error": "record already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
                "retryable": true,
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
