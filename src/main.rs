//! Managed HTTP server (demo binary).
//!
//! Serves "Hello, world!" on every path with bounded timeouts and drains
//! gracefully on SIGINT/SIGTERM.
//!
//! ```text
//!   settings file (optional) ──▶ CLI overrides ──▶ ServerConfig
//!                                                      │
//!                                                      ▼
//!   SIGINT / SIGTERM ──▶ halt(deadline) ──▶ ManagedServer ──▶ run()
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::Parser;

use managed_http::config::{load_settings, ServerSettings};
use managed_http::lifecycle::signals::shutdown_signal;
use managed_http::observability::init_tracing;
use managed_http::{with_logger, ManagedServer, ServerConfig, TracingLogger};

#[derive(Parser, Debug)]
#[command(name = "managed-http")]
#[command(about = "HTTP server with bounded timeouts and graceful shutdown", long_about = None)]
struct Cli {
    /// TOML settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address; overrides the settings file.
    #[arg(short, long)]
    address: Option<String>,

    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long, default_value_t = 10)]
    grace_secs: u64,

    /// Route announcements through tracing instead of stderr.
    #[arg(long)]
    tracing_announcements: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("managed_http=info");

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => ServerSettings {
            address: ":8080".to_string(),
            ..Default::default()
        },
    };
    if let Some(address) = cli.address {
        settings.address = address;
    }

    let handler = Router::new().fallback(|| async { "Hello, world!\n" });

    let mut options = Vec::new();
    if cli.tracing_announcements {
        options.push(with_logger(Arc::new(TracingLogger)));
    }

    let server = Arc::new(ManagedServer::new(
        Some(ServerConfig::from_settings(settings, handler)),
        options,
    ));

    tracing::info!(
        address = %server.address(),
        timeouts = ?server.timeouts(),
        "Configuration loaded"
    );

    let mut runner = {
        let server = server.clone();
        tokio::spawn(async move { server.run().await })
    };

    tokio::select! {
        result = &mut runner => {
            // Run ended on its own (bind or serve failure).
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    if let Err(err) = server.halt_after(Duration::from_secs(cli.grace_secs)).await {
        tracing::warn!(error = %err, "Shutdown was not clean");
    }

    runner.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
