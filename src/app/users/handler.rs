//! 用户处理器

use axum::{extract::State, http::StatusCode, response::Json};

use super::{
    model::{CreateUserRequest, MessageResponse, NewUser, UserRecord},
    service::UserService,
};
use crate::core::{error::CoreError, extract::ValidatedJson};

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
}

/// POST /api/add_user
pub async fn add_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), CoreError> {
    let user = NewUser::try_from(payload)?;
    state.user_service.add_user(&user).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::user_added())))
}

/// GET /api/get_users
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRecord>>, CoreError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// GET /health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, CoreError> {
    state.user_service.check_database().await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "database": "connected",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
