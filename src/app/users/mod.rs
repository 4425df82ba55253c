//! 用户应用：新增用户、列出用户

pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

use axum::{
    routing::{get, post},
    Router,
};

use handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/add_user", post(handler::add_user))
        .route("/api/get_users", get(handler::get_users))
        .route("/health", get(handler::health_check))
}
