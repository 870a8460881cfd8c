//! Request authentication.
//!
//! User routes require a bearer token issued by the external identity
//! service and signed with the shared secret; the subject claim is the
//! owner identity every list operation is scoped to. The pricing-feed
//! ingest is service-to-service and gated by a static API key instead.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

/// Owner identity resolved from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

pub struct AuthManager {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthManager {
    pub fn new(jwt_secret: &[u8]) -> Self {
        let decoding_key = DecodingKey::from_secret(jwt_secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key,
            validation,
        }
    }

    /// Validates a bearer token and returns its subject.
    pub fn resolve_user(&self, token: &str) -> Result<String, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|_| ApiError::Unauthorized)
    }
}

/// Validates the bearer token and stores the owner identity as a request
/// extension for the handlers.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let user_id = state.auth.resolve_user(token)?;
    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}

/// Gates service-to-service routes behind the shared API key.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    if presented != Some(state.api_key.as_str()) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}
