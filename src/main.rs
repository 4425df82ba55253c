use tokio::{net::TcpListener, signal};
use tracing::{error, info};

use user_data_api::{
    build_router, build_state,
    infrastructure::{config::load_config, logger::Logger},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _log_guard = Logger::init(&config.logging)?;

    info!("Starting user data API...");

    let state = build_state(&config.database);
    let app = build_router(state, &config.server);

    let listener = TcpListener::bind(config.server.listen_addr())
        .await
        .map_err(|e| {
            error!("Failed to bind {}: {}", config.server.listen_addr(), e);
            e
        })?;
    let addr = listener.local_addr()?;

    info!("🚀 User data API running on http://{}", addr);
    info!("📖 Available endpoints:");
    info!("   POST   /api/add_user   - Add a user");
    info!("   GET    /api/get_users  - List all users");
    info!("   GET    /health         - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
