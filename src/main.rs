//! openvj server entry point.
//!
//! Bootstrap order: configuration → logging → metrics → application
//! wiring (storage, sessions, route table, hooks) → HTTP listener.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use openvj::config::load_config;
use openvj::context::AppContext;
use openvj::http::HttpServer;
use openvj::observability;

#[derive(Parser)]
#[command(name = "openvj", about = "openvj web platform server", version)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "openvj.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    observability::logging::init(&config.observability.log_level);
    tracing::info!(config = %args.config.display(), "openvj starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(err) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %err,
                "failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.server.bind_address.clone();
    let app = Arc::new(AppContext::bootstrap(config).await?);
    tracing::info!(
        routes = app.routes.len(),
        enforce_https = app.config.http.enforce_https,
        "application wired"
    );

    openvj::session::spawn_purge_task(
        app.sessions.clone(),
        Duration::from_secs(app.config.session.purge_interval_secs),
    );

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    HttpServer::new(app).run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
