//! Shop server binary.
//!
//! Reads [`ShopConfig`] from the environment, picks the storage backend
//! and serves the JSON API until Ctrl+C or SIGTERM.

use std::sync::Arc;

use secrecy::ExposeSecret;
use shop_unit_of_work::adapters::{postgres, MemoryUnitOfWork, PostgresUnitOfWork};
use shop_unit_of_work::config::{ShopConfig, StorageBackend};
use shop_unit_of_work::http::{router, AppState};
use shop_unit_of_work::services::TokenService;
use shop_unit_of_work::{telemetry, Error, UnitOfWork};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = ShopConfig::from_env()?;
    telemetry::init_tracing();

    match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_ref()
                .ok_or_else(|| Error::Internal("DATABASE_URL is not configured".to_string()))?;
            let pool = postgres::create_pool(database_url.expose_secret(), config.max_connections)
                .await?;
            tracing::info!("Database pool created");

            if config.run_migrations {
                postgres::run_migrations(&pool).await?;
                tracing::info!("Migrations applied");
            }

            serve(&config, PostgresUnitOfWork::new(Arc::new(pool))).await
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on shutdown");
            serve(&config, MemoryUnitOfWork::new()).await
        }
    }
}

async fn serve<U: UnitOfWork>(config: &ShopConfig, uow: U) -> Result<(), BoxError> {
    let ttl = chrono::Duration::try_seconds(config.token_ttl_secs)
        .ok_or("SHOP_TOKEN_TTL_SECS is out of range")?;
    let tokens = TokenService::new(config.jwt_secret.expose_secret().as_bytes(), ttl);
    let state = AppState::new(Arc::new(uow), tokens);

    match &config.admin {
        Some(admin) => {
            let seeded = state
                .accounts()
                .seed_admin(&admin.username, admin.password.expose_secret())
                .await;
            match seeded {
                Ok(Some(_)) => {}
                Ok(None) => tracing::info!("admin account already present"),
                Err(Error::Conflict(reason)) => {
                    tracing::warn!(%reason, "admin seeding skipped");
                }
                Err(err) => return Err(err.into()),
            }
        }
        None => tracing::info!("SHOP_ADMIN_PASSWORD not set; skipping admin seeding"),
    }

    let app = router(state);
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("shop listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
