//! CareCall server entry point.
//!
//! Loads configuration from the environment, wires the simulated
//! collaborators, and serves the HTTP API with graceful shutdown on
//! SIGTERM/SIGINT.

use tracing_subscriber::EnvFilter;

use carecall::adapters::http;
use carecall::bootstrap::{build_state, Collaborators};
use carecall::config::{AiProviderKind, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.server.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if config.is_production() && config.ai.provider == AiProviderKind::Mock {
        tracing::warn!("production environment is running on the mock AI provider");
    }

    let collaborators = Collaborators::from_config(&config)?;
    let provider = collaborators.ai_provider.provider_info();
    tracing::info!(
        provider = %provider.name,
        model = %provider.model,
        max_context_tokens = provider.max_context_tokens,
        "AI provider ready"
    );
    let state = build_state(&config, collaborators);
    let app = http::router(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        classifier = ?config.conversation.classifier,
        environment = ?config.server.environment,
        "carecall listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
