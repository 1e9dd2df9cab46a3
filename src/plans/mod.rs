mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::seed_if_empty;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::plan_routes())
}
