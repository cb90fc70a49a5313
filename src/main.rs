use std::process::ExitCode;

use french_trainer_backend::config::Config;
use french_trainer_backend::db::PhraseStore;
use french_trainer_backend::logging::{self, LogSettings};
use french_trainer_backend::services::llm_provider::LLMProvider;
use french_trainer_backend::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let _log_guard = logging::init_tracing(&LogSettings::from_env());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let store = match PhraseStore::connect(&config.store).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "phrase store not initialized");
            return ExitCode::FAILURE;
        }
    };

    let oracle = match LLMProvider::new(config.llm.clone()) {
        Ok(oracle) => oracle,
        Err(err) => {
            tracing::error!(error = %err, "grading oracle not initialized");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        store = store.backend(),
        model = oracle.model(),
        selection = ?config.selection,
        "services initialized"
    );

    let state = AppState::new(store, oracle, config.selection, config.grading_timeout);
    let app = french_trainer_backend::create_app(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "bind listener failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%addr, "french-trainer-backend listening");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Graceful shutdown complete");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
