use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{FeedingQuery, FeedingRequest, FeedingResponse},
    services::prepare_write,
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    forms::DeleteQuery,
    state::AppState,
    store::ListFilter,
};

pub const MAX_LIST_LIMIT: i64 = 500;

pub fn feeding_routes() -> Router<AppState> {
    Router::new()
        .route("/feedings", get(list_feedings).post(create_feeding))
        .route(
            "/feedings/:id",
            get(get_feeding).put(update_feeding).delete(delete_feeding),
        )
}

#[instrument(skip(state))]
pub async fn list_feedings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<FeedingQuery>,
) -> AppResult<Json<Vec<FeedingResponse>>> {
    let filter = ListFilter {
        pet_id: q.pet_id,
        food_id: q.food_id,
        since: q.since,
        until: q.until,
        limit: q.limit.map(|n| n.clamp(1, MAX_LIST_LIMIT)),
    };
    let rows = state.store.list_feedings(user_id, &filter).await?;
    Ok(Json(rows.into_iter().map(FeedingResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_feeding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FeedingResponse>> {
    let row = state
        .store
        .get_feeding(user_id, id)
        .await?
        .ok_or(AppError::NotFound("feeding"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, body))]
pub async fn create_feeding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<FeedingRequest>,
) -> AppResult<(StatusCode, Json<FeedingResponse>)> {
    let entry = prepare_write(&state, user_id, body, None).await?;
    let row = state.store.create_feeding(user_id, &entry).await?;
    info!(
        %user_id,
        feeding_id = %row.id,
        pet_id = %row.pet_id,
        consumed = row.actual_consumed,
        "feeding logged"
    );
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, body))]
pub async fn update_feeding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FeedingRequest>,
) -> AppResult<Json<FeedingResponse>> {
    // 404 before validating against pets and foods the caller may not own.
    let current = state
        .store
        .get_feeding(user_id, id)
        .await?
        .ok_or(AppError::NotFound("feeding"))?;
    let entry = prepare_write(&state, user_id, body, Some(&current)).await?;
    let row = state
        .store
        .update_feeding(user_id, id, &entry)
        .await?
        .ok_or(AppError::NotFound("feeding"))?;
    info!(%user_id, feeding_id = %id, "feeding updated");
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete_feeding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    q.require()?;
    if !state.store.delete_feeding(user_id, id).await? {
        return Err(AppError::NotFound("feeding"));
    }
    info!(%user_id, feeding_id = %id, "feeding deleted");
    Ok(StatusCode::NO_CONTENT)
}
