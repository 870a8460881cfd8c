//! List and item routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use cartlist_core::lists::{Item, List, ListServiceTrait, NewItem};

use crate::{auth::AuthenticatedUser, error::ApiResult, state::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateListRequest {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest {
    product_id: i64,
    market_id: Option<i64>,
    quantity: Decimal,
    unit_price: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckItemRequest {
    purchased: bool,
}

async fn get_lists(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<List>>> {
    Ok(Json(state.list_service.get_lists(&user_id)?))
}

async fn create_list(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateListRequest>,
) -> ApiResult<(StatusCode, Json<List>)> {
    let list = state
        .list_service
        .create_list(&user_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

async fn get_list(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<List>> {
    Ok(Json(state.list_service.get_list(&user_id, id)?))
}

async fn finalize_list(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<List>> {
    Ok(Json(state.list_service.finalize_list(&user_id, id).await?))
}

async fn cancel_list(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<List>> {
    Ok(Json(state.list_service.cancel_list(&user_id, id).await?))
}

async fn add_item(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(payload): Json<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = state
        .list_service
        .add_item(
            &user_id,
            NewItem {
                list_id: id,
                product_id: payload.product_id,
                market_id: payload.market_id,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn remove_item(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    state.list_service.remove_item(&user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn check_item(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(payload): Json<CheckItemRequest>,
) -> ApiResult<Json<Item>> {
    let item = state
        .list_service
        .set_item_purchased(&user_id, id, payload.purchased)
        .await?;
    Ok(Json(item))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lists", get(get_lists).post(create_list))
        .route("/lists/{id}", get(get_list))
        .route("/lists/{id}/finalize", put(finalize_list))
        .route("/lists/{id}/cancel", put(cancel_list))
        .route("/lists/{id}/items", post(add_item))
        .route("/items/{id}", delete(remove_item))
        .route("/items/{id}/check", put(check_item))
}
