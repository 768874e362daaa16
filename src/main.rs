//! Endpoint router binary.
//!
//! # Data Flow
//!
//! ```text
//!   config.toml ──▶ RouterConfig ──▶ RouterOptions
//!                                         │
//!   inventory::handlers() ──▶ RouterBuilder::register_handler ──▶ Router (immutable)
//!                                                                   │
//!          ┌────────────────────────┬───────────────────────────────┤
//!          ▼                        ▼                               ▼
//!   `routes`: print table   `resolve`: print logical path   `serve`: HttpServer
//! ```

mod inventory;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use endpoint_router::config::{load_config, RouterConfig};
use endpoint_router::lifecycle::{signals, Shutdown};
use endpoint_router::observability::{logging, metrics};
use endpoint_router::routing::{Router, RouterBuilder, RouterOptions};
use endpoint_router::HttpServer;

#[derive(Parser)]
#[command(name = "endpoint-router")]
#[command(about = "Serve annotated handler types as HTTP endpoints", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the registered handlers over HTTP (default)
    Serve,
    /// Print the compiled route table
    Routes {
        /// Emit JSON instead of aligned text
        #[arg(long)]
        json: bool,
    },
    /// Print the logical path a raw URL resolves to
    Resolve { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Routes { json } => {
            let router = build_router(&config);
            print_routes(&router, json)
        }
        Commands::Resolve { url } => {
            let router = build_router(&config);
            println!("{}", router.resolve(&url));
            Ok(())
        }
    }
}

fn build_router(config: &RouterConfig) -> Router {
    let mut builder = RouterBuilder::new(RouterOptions::from_config(&config.api));
    for (handler, base_path) in inventory::handlers() {
        builder.register_handler(&handler, base_path);
    }
    builder.build()
}

fn print_routes(router: &Router, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let routes = router.routes();
    if json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    let width = routes.iter().map(|r| r.path.len()).max().unwrap_or(0);
    for route in &routes {
        println!(
            "{:<7} {:<width$}  {}::{} ({:?})",
            route.verb.as_str(),
            route.path,
            route.handler,
            route.method,
            route.flag,
            width = width
        );
    }
    Ok(())
}

async fn serve(config: RouterConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(&config.observability)?;

    tracing::info!("endpoint-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount = %config.api.mount,
        compatibility_mode = config.api.compatibility_mode,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = Arc::new(build_router(&config));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config, router);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
