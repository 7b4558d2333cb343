use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{FoodRequest, FoodResponse},
    repo_types::FoodFields,
};
use crate::{
    auth::AuthUser,
    config::TrackingConfig,
    error::{AppError, AppResult},
    forms::{
        optional_non_negative, optional_text, required_text, DeleteQuery, DENSITY, MAX_NAME_LEN,
    },
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route("/foods/:id", get(get_food).put(update_food).delete(delete_food))
}

fn validate(body: FoodRequest, tracking: &TrackingConfig) -> AppResult<FoodFields> {
    let sep = tracking.separator_for(body.locale.as_deref());
    Ok(FoodFields {
        name: required_text("name", &body.name)?,
        brand: optional_text("brand", body.brand, MAX_NAME_LEN)?,
        calories_per_gram: optional_non_negative(
            "calories_per_gram",
            body.calories_per_gram.as_ref(),
            sep,
            DENSITY,
        )?,
        protein_per_gram: optional_non_negative(
            "protein_per_gram",
            body.protein_per_gram.as_ref(),
            sep,
            DENSITY,
        )?,
        fat_per_gram: optional_non_negative("fat_per_gram", body.fat_per_gram.as_ref(), sep, DENSITY)?,
        carbs_per_gram: optional_non_negative(
            "carbs_per_gram",
            body.carbs_per_gram.as_ref(),
            sep,
            DENSITY,
        )?,
    })
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<FoodResponse>>> {
    let foods = state.store.list_foods(user_id).await?;
    Ok(Json(foods.into_iter().map(FoodResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FoodResponse>> {
    let food = state
        .store
        .get_food(user_id, id)
        .await?
        .ok_or(AppError::NotFound("food"))?;
    Ok(Json(food.into()))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<FoodRequest>,
) -> AppResult<(StatusCode, Json<FoodResponse>)> {
    let fields = validate(body, &state.config.tracking)?;
    let food = state.store.create_food(user_id, &fields).await?;
    info!(%user_id, food_id = %food.id, "food created");
    Ok((StatusCode::CREATED, Json(food.into())))
}

/// Stored feedings keep the calories derived when they were written.
#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FoodRequest>,
) -> AppResult<Json<FoodResponse>> {
    let fields = validate(body, &state.config.tracking)?;
    let food = state
        .store
        .update_food(user_id, id, &fields)
        .await?
        .ok_or(AppError::NotFound("food"))?;
    info!(%user_id, food_id = %food.id, "food updated");
    Ok(Json(food.into()))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    q.require()?;
    if !state.store.delete_food(user_id, id).await? {
        return Err(AppError::NotFound("food"));
    }
    info!(%user_id, food_id = %id, "food deleted");
    Ok(StatusCode::NO_CONTENT)
}
