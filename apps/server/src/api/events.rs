//! Pricing feed ingest.
//!
//! The feed transport hands raw payloads to this route; they are queued
//! in arrival order for the price sync consumer, which owns decoding.
//! A payload that cannot be queued is the transport's problem to retry.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Router};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

async fn price_changed(
    State(state): State<Arc<AppState>>,
    payload: String,
) -> ApiResult<StatusCode> {
    state
        .price_feed
        .send(payload)
        .await
        .map_err(|_| ApiError::Unavailable)?;
    Ok(StatusCode::ACCEPTED)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events/price-changed", post(price_changed))
}
