use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{PetRequest, PetResponse},
    repo_types::PetFields,
};
use crate::{
    auth::AuthUser,
    config::TrackingConfig,
    error::{AppError, AppResult},
    forms::{optional_text, positive, required_text, DeleteQuery, MAX_NAME_LEN, WEIGHT},
    state::AppState,
};

pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route("/pets/:id", get(get_pet).put(update_pet).delete(delete_pet))
}

fn validate(body: PetRequest, tracking: &TrackingConfig) -> AppResult<PetFields> {
    let sep = tracking.separator_for(body.locale.as_deref());
    let target_weight = body
        .target_weight
        .as_ref()
        .map(|w| positive("target_weight", w, sep, WEIGHT))
        .transpose()?;
    if let Some(birth) = body.birth_date {
        if birth > tracking.today() {
            return Err(AppError::validation("birth_date is in the future"));
        }
    }
    Ok(PetFields {
        name: required_text("name", &body.name)?,
        species: body.species,
        breed: optional_text("breed", body.breed, MAX_NAME_LEN)?,
        birth_date: body.birth_date,
        target_weight,
    })
}

#[instrument(skip(state))]
pub async fn list_pets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<PetResponse>>> {
    let today = state.config.tracking.today();
    let pets = state.store.list_pets(user_id).await?;
    Ok(Json(
        pets.into_iter()
            .map(|p| PetResponse::from_pet(p, today))
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_pet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PetResponse>> {
    let pet = state
        .store
        .get_pet(user_id, id)
        .await?
        .ok_or(AppError::NotFound("pet"))?;
    Ok(Json(PetResponse::from_pet(pet, state.config.tracking.today())))
}

#[instrument(skip(state, body))]
pub async fn create_pet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PetRequest>,
) -> AppResult<(StatusCode, Json<PetResponse>)> {
    let fields = validate(body, &state.config.tracking)?;
    let pet = state.store.create_pet(user_id, &fields).await?;
    info!(%user_id, pet_id = %pet.id, "pet created");
    Ok((
        StatusCode::CREATED,
        Json(PetResponse::from_pet(pet, state.config.tracking.today())),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_pet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PetRequest>,
) -> AppResult<Json<PetResponse>> {
    let fields = validate(body, &state.config.tracking)?;
    let pet = state
        .store
        .update_pet(user_id, id, &fields)
        .await?
        .ok_or(AppError::NotFound("pet"))?;
    info!(%user_id, pet_id = %pet.id, "pet updated");
    Ok(Json(PetResponse::from_pet(pet, state.config.tracking.today())))
}

#[instrument(skip(state))]
pub async fn delete_pet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    q.require()?;
    if !state.store.delete_pet(user_id, id).await? {
        return Err(AppError::NotFound("pet"));
    }
    info!(%user_id, pet_id = %id, "pet deleted");
    Ok(StatusCode::NO_CONTENT)
}
