use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod usecase;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
