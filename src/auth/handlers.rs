use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AuthResponse, CredentialsRequest, PublicUser, RefreshRequest},
    jwt::{AuthUser, JwtKeys},
    password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, id: Uuid, email: String) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(id)?,
        refresh_token: keys.sign_refresh(id)?,
        user: PublicUser { id, email },
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation("Password too short"));
    }

    let hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(&email, &hash)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "email already registered");
            AppError::Conflict("Email already registered".into())
        })?;

    info!(user_id = %user.id, "user registered");
    let body = issue_tokens(&state, user.id, user.email)?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = payload.email.trim().to_lowercase();
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(issue_tokens(&state, user.id, user.email)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let claims = JwtKeys::from_ref(&state)
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let user = state
        .store
        .find_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(issue_tokens(&state, user.id, user.email)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serialization() {
        let json = serde_json::to_string(&PublicUser {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
        })
        .unwrap();
        assert!(json.contains("owner@example.com"));
        assert!(!json.contains("password"));
    }
}
