//! Request handlers.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, Json};
use axum::routing::{get, post};
use quickmeet_protocol::{
    AuthStartResponse, AuthStatusResponse, HealthResponse, InstantMeetResponse,
    ScheduleMeetingRequest, ScheduleMeetingResponse,
};
use quickmeet_providers::google::{CallbackParams, FAILURE_PAGE, SUCCESS_PAGE};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::state::SharedState;

/// Routes mounted under `/api`.
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/schedule-meeting", post(schedule_meeting))
        .route("/instant-meet", post(instant_meet))
        .route("/auth/status", get(auth_status))
        .route("/auth/start", get(auth_start))
}

async fn schedule_meeting(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ScheduleMeetingResponse>, ApiError> {
    let request = parse_schedule_body(&headers, &body)?.into_schedule_request();
    request.check_required()?;

    let result = state.provider.schedule_meeting(request).await?;
    Ok(Json(result.into()))
}

/// Decodes a schedule body.
///
/// A blank body, or one not sent as JSON, reads as an empty request so the
/// required-field check reports what is missing.
fn parse_schedule_body(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ScheduleMeetingRequest, ApiError> {
    if !is_json(headers) || body.trim_ascii().is_empty() {
        return Ok(ScheduleMeetingRequest::default());
    }
    let Json(request) = Json::<ScheduleMeetingRequest>::from_bytes(body)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    Ok(request)
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

async fn instant_meet(State(state): State<SharedState>) -> (StatusCode, Json<InstantMeetResponse>) {
    match state.provider.instant_meet().await {
        Ok(meeting) => (StatusCode::OK, Json(InstantMeetResponse::succeeded(meeting))),
        Err(err) => {
            error!(code = err.code().as_str(), "instant meeting failed: {}", err.message());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(InstantMeetResponse::failed(err.message())),
            )
        }
    }
}

async fn auth_status(State(state): State<SharedState>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        state: state.provider.auth_state().await,
    })
}

async fn auth_start(
    State(state): State<SharedState>,
) -> Result<Json<AuthStartResponse>, ApiError> {
    let auth_url = state
        .provider
        .begin_consent(state.redirect_uri.clone())
        .await?;
    info!("consent flow started");
    Ok(Json(AuthStartResponse { auth_url }))
}

/// Vendor redirect target that completes a consent flow.
pub async fn oauth_callback(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Html<&'static str>) {
    let params = CallbackParams::parse(query.as_deref().unwrap_or_default());
    let outcome = match params.into_code_and_state() {
        Ok((code, consent_state)) => state.provider.complete_consent(code, consent_state).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => {
            info!("authorization completed");
            (StatusCode::OK, Html(SUCCESS_PAGE))
        }
        Err(err) => {
            warn!("authorization callback rejected: {}", err.message());
            (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE))
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
