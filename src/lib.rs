//! # user-data-api
//!
//! 用户数据 HTTP 服务：
//! - `POST /api/add_user` 新增一个用户
//! - `GET /api/get_users` 列出 `users` 表中的所有行
//! - `GET /health` 检查数据库连通性
//!
//! 分层结构：`app`（处理器、服务、模型）、`core`（错误、中间件、提取器）、
//! `infrastructure`（配置、数据库、日志）。

pub mod app;
pub mod core;
pub mod infrastructure;

use axum::{middleware, Router};
use std::{sync::Arc, time::Duration};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use app::users::{
    handler::AppState,
    repository::{MemoryUserRepository, MySqlUserRepository, UserRepository},
    service::UserService,
};
use infrastructure::{
    config::{DatabaseConfig, ServerConfig, StorageBackend},
    database::DatabaseManager,
};

/// 按配置选择存储后端并创建应用状态
pub fn build_state(config: &DatabaseConfig) -> AppState {
    let repository: Arc<dyn UserRepository> = match config.backend {
        StorageBackend::Mysql => {
            info!(
                "Using MySQL backend at {}:{}/{}",
                config.host, config.port, config.name
            );
            Arc::new(MySqlUserRepository::new(DatabaseManager::connect(config)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory backend, data is lost on restart");
            Arc::new(MemoryUserRepository::new())
        }
    };

    AppState {
        user_service: UserService::new(repository),
    }
}

/// 创建带中间件的路由
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    app::users::routes()
        .layer(middleware::from_fn(
            core::middleware::request_logging_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .with_state(state)
}
