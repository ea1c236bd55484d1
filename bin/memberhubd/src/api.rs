//! API handlers — the HTTP boundary in front of the Attio gateway.
//!
//! Read paths are fail-soft: a degraded CRM yields an empty profile, not
//! an error page. Write failures surface as real HTTP errors.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use memberhub_attio::{read_attributes, write_values, Lookup};

use crate::routes::AppState;
use crate::session::Claims;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub email: String,
}

/// Save request body: `recordId` present means update-in-place.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(rename = "recordId", default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
}

/// GET /api/options/{slug} — select options for one attribute.
///
/// On CRM failure the CRM's own status and message pass through; a
/// network error with no status becomes 502.
pub async fn options_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    match state.attio.list_select_options(&slug).await {
        Ok(options) => Json(serde_json::json!({ "options": options })).into_response(),
        Err(e) => {
            error!("options for '{}' failed: {}", slug, e);
            let status = e
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// GET /api/user?email=E — the user's profile, mapped over the field
/// schema.
///
/// Both "no record yet" and "the CRM query failed" render as
/// `{"data": null}` with 200 so the form stays usable; the two arms are
/// logged distinctly.
pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<Value> {
    match state.attio.find_person_by_email(&query.email).await {
        Lookup::Found(record) => {
            let attributes = read_attributes(&state.registry, &record, &query.email);
            Json(serde_json::json!({
                "data": {
                    "recordId": record.id.record_id,
                    "attributes": attributes,
                },
            }))
        }
        Lookup::NotFound => {
            debug!("no record for {}", query.email);
            Json(serde_json::json!({ "data": null }))
        }
        Lookup::TransportError(e) => {
            warn!("lookup for {} failed, serving empty profile: {}", query.email, e);
            Json(serde_json::json!({ "data": null }))
        }
    }
}

/// POST /api/user — create or update the caller's record.
///
/// The session email always wins over whatever the form submitted; the
/// write mapping injects it and drops empty values.
pub async fn save_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: String,
) -> Response {
    if body.trim().is_empty() {
        warn!("save with empty request body");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "empty request body" })),
        )
            .into_response();
    }

    let request: SaveRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("save with malformed body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": format!("invalid JSON body: {}", e) })),
            )
                .into_response();
        }
    };

    let values = write_values(&state.registry, &request.attributes, &claims.email);

    match state
        .attio
        .upsert_person(request.record_id.as_deref(), &values)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!("upsert for {} failed: {}", claims.email, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to save profile" })),
            )
                .into_response()
        }
    }
}
