mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

pub use dto::FeedingResponse;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::feeding_routes()
}
