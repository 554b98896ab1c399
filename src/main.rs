use habit_tracker::{router, AppState, Config, FileStore, Tracker};
use habit_tracker::state::SharedStore;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let store = match FileStore::open(&config.data_path) {
        Ok(store) => store,
        Err(err) if err.is_corrupt() => {
            error!("{err}; starting from an empty store");
            FileStore::empty(&config.data_path)
        }
        Err(err) => return Err(err.into()),
    };
    info!(path = %store.path().display(), seed = ?config.history_seed, "store ready");

    let store: SharedStore = Box::new(store);
    let state = AppState::new(Tracker::new(store, config.history_seed));
    let app = router(state);

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
