use std::sync::Arc;

use clap::Parser;

use vidshelf::delivery::{transcode::Transcoder, DeliveryRouter};
use vidshelf::{catalog, cli, config, http};

/// Wait for the first Ctrl+C (graceful shutdown).
/// A second Ctrl+C while transcodes are still draining force-exits immediately.
async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down — waiting for in-flight requests...");
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nvidshelf: forced exit");
            std::process::exit(1);
        }
    });
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .init();

    let args = cli::Args::parse();

    let file_config = config::find_config_file(args.config.as_deref())
        .and_then(|path| {
            match config::load_config(&path) {
                Ok(cfg) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    Some(cfg)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}", e);
                    None
                }
            }
        });

    let config = config::Config::resolve(file_config, &args);

    tracing::info!("Scanning {} for video files", config.root.display());

    // Synchronous scan -- blocks the thread; acceptable since the server has not started yet
    let catalog = match catalog::scan(&config.root, &config.media) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let transcoder = Transcoder::locate(config.ffmpeg.as_deref());
    let router = DeliveryRouter::new(Arc::clone(&catalog), config.media.clone(), transcoder);
    let state = http::state::AppState {
        router,
        title: config.title.clone(),
    };
    let app = http::build_router(state);

    let host = if config.localhost { "127.0.0.1" } else { "0.0.0.0" };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("error: failed to bind {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!(
        "Serving {} videos from {} on http://{}",
        catalog.len(),
        catalog.root().display(),
        addr
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
    {
        tracing::error!("HTTP server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Goodbye.");
}
