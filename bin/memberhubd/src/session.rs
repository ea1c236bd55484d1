//! Session gate.
//!
//! The auth provider runs the OTP email flow and issues HS256 session
//! JWTs; this middleware validates them against the shared secret and
//! makes the session claims available to handlers. API routes require a
//! session; pages and meta endpoints are public (the pages themselves
//! redirect to login when no session token is present client-side).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Session claims minted by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the provider's user id.
    pub sub: String,
    /// Authenticated email address — the profile key.
    pub email: String,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Providers set aud to their own application id; only exp and
        // signature matter here.
        validation.validate_aud = false;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

/// Authentication failure.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AuthError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "missing authorization token".to_string())
            }
            AuthError::InvalidToken(e) => {
                (StatusCode::UNAUTHORIZED, format!("invalid token: {}", e))
            }
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}

/// Middleware that extracts and validates the session JWT from the
/// Authorization header and stores [`Claims`] in request extensions.
pub async fn session_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let token_data =
        jsonwebtoken::decode::<Claims>(token, &jwt_state.decoding_key, &jwt_state.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    request.extensions_mut().insert(token_data.claims);

    Ok(next.run(request).await)
}

/// Request paths served without a session.
fn is_public_path(path: &str) -> bool {
    matches!(path, "/" | "/profile" | "/health" | "/version")
        || path.starts_with("/meta/")
}
