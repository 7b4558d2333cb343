use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{WeightQuery, WeightRequest, WeightResponse},
    repo_types::{WeightRow, WeightWrite},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    feeding::handlers::MAX_LIST_LIMIT,
    forms::{optional_text, positive, DeleteQuery, MAX_NOTES_LEN, WEIGHT},
    state::AppState,
    store::ListFilter,
};

pub fn weight_routes() -> Router<AppState> {
    Router::new()
        .route("/weights", get(list_weights).post(create_weight))
        .route(
            "/weights/:id",
            get(get_weight).put(update_weight).delete(delete_weight),
        )
}

/// On update, `existing` supplies `weighed_at` when the form leaves it out.
async fn prepare_write(
    state: &AppState,
    user_id: Uuid,
    body: WeightRequest,
    existing: Option<&WeightRow>,
) -> AppResult<WeightWrite> {
    let sep = state.config.tracking.separator_for(body.locale.as_deref());
    let weight = positive("weight", &body.weight, sep, WEIGHT)?;
    let notes = optional_text("notes", body.notes, MAX_NOTES_LEN)?;
    state
        .store
        .get_pet(user_id, body.pet_id)
        .await?
        .ok_or(AppError::NotFound("pet"))?;
    Ok(WeightWrite {
        pet_id: body.pet_id,
        weight,
        weighed_at: body
            .weighed_at
            .or(existing.map(|row| row.weighed_at))
            .unwrap_or_else(OffsetDateTime::now_utc),
        notes,
    })
}

#[instrument(skip(state))]
pub async fn list_weights(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeightQuery>,
) -> AppResult<Json<Vec<WeightResponse>>> {
    let filter = ListFilter {
        pet_id: q.pet_id,
        since: q.since,
        until: q.until,
        limit: q.limit.map(|n| n.clamp(1, MAX_LIST_LIMIT)),
        ..Default::default()
    };
    let rows = state.store.list_weights(user_id, &filter).await?;
    Ok(Json(rows.into_iter().map(WeightResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WeightResponse>> {
    let row = state
        .store
        .get_weight(user_id, id)
        .await?
        .ok_or(AppError::NotFound("weight"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, body))]
pub async fn create_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<WeightRequest>,
) -> AppResult<(StatusCode, Json<WeightResponse>)> {
    let entry = prepare_write(&state, user_id, body, None).await?;
    let row = state.store.create_weight(user_id, &entry).await?;
    info!(%user_id, weight_id = %row.id, pet_id = %row.pet_id, "weight logged");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, body))]
pub async fn update_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<WeightRequest>,
) -> AppResult<Json<WeightResponse>> {
    let current = state
        .store
        .get_weight(user_id, id)
        .await?
        .ok_or(AppError::NotFound("weight"))?;
    let entry = prepare_write(&state, user_id, body, Some(&current)).await?;
    let row = state
        .store
        .update_weight(user_id, id, &entry)
        .await?
        .ok_or(AppError::NotFound("weight"))?;
    info!(%user_id, weight_id = %id, "weight updated");
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    q.require()?;
    if !state.store.delete_weight(user_id, id).await? {
        return Err(AppError::NotFound("weight"));
    }
    info!(%user_id, weight_id = %id, "weight deleted");
    Ok(StatusCode::NO_CONTENT)
}
