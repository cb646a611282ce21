//! Wallet registry server.
//!
//! Run from repo root: `cargo run -p wallet-server`
//! Backend, addresses and limits come from the environment (see `.env.example`).

use tokio::net::TcpListener;
use wallet_registry::{app, connect, AppState, Settings, WalletService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wallet_registry=info,wallet_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let store = connect(&settings).await?;
    let service = WalletService::new(store);
    let router = app(AppState::new(service.clone()), &settings);

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        backend = %settings.backend,
        "wallet server listening"
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.close().await;
    tracing::info!("wallet server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let res = tokio::signal::ctrl_c().await;
        hold_on_error(res, "ctrl-c").await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => hold_on_error(Err(e), "SIGTERM").await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

/// A signal source that could not be installed never fires.
async fn hold_on_error(res: std::io::Result<()>, source: &str) {
    if let Err(e) = res {
        tracing::error!(error = %e, source, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
