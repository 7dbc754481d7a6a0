use tracing_subscriber::EnvFilter;

use podium_server::config::ServerConfig;
use podium_server::{build_app, spawn_jobs};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load();
    config.validate();
    let listen_addr = config.listen_addr.clone();

    let (app, state) = match build_app(config).await {
        Ok(built) => built,
        Err(e) => {
            tracing::error!(error = %e, "failed to build application state");
            std::process::exit(1);
        },
    };
    spawn_jobs(&state);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        },
    };
    tracing::info!(addr = %listen_addr, "podium server listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}
