mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub use dto::PetResponse;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::pet_routes()
}
