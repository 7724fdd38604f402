use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use mimalloc::MiMalloc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ridejournal::cli::{Cli, Command};
use ridejournal::config::Config;
use ridejournal::journey::{self, Journey};
use ridejournal::pipeline::{manifest, process};
use ridejournal::routes;
use ridejournal::state::AppState;
use ridejournal::types::route::RouteIndex;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const EVICTION_INTERVAL: Duration = Duration::from_secs(300);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match cli.command {
        Command::Serve { port, data_dir } => {
            let mut config = config;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(serve(config))
        }
        Command::ProcessPhotos {
            input,
            output,
            manifest: manifest_path,
            url_prefix,
        } => {
            let options = manifest::ManifestOptions {
                input_dir: input,
                output_dir: output,
                manifest_path,
                trip_start: config.trip_start,
                today: Utc::now().date_naive(),
                url_prefix,
            };
            let (photos, summary) = manifest::process_directory(&options)
                .with_context(|| format!("failed to process {}", options.input_dir.display()))?;
            manifest::write_manifest(&options.manifest_path, &photos)
                .with_context(|| format!("failed to write {}", options.manifest_path.display()))?;
            tracing::info!(
                "Wrote {} ({} of {} photos placed)",
                options.manifest_path.display(),
                summary.written,
                summary.scanned
            );
            Ok(())
        }
        Command::ImportRoute {
            input,
            output,
            merge_weather,
        } => {
            let previous = merge_weather
                .map(|path| {
                    journey::load_route(&path)
                        .map(RouteIndex::new)
                        .with_context(|| format!("failed to read {}", path.display()))
                })
                .transpose()?;
            let route = process::import_directory(&input, previous.as_ref())
                .with_context(|| format!("failed to import {}", input.display()))?;
            process::write_route(&output, &route)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!("Wrote {} ({} days)", output.display(), route.features.len());
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let journey = Journey::load(&config)
        .with_context(|| format!("failed to load journey from {}", config.data_dir.display()))?;
    let photo_files = ServeDir::new(config.photo_files_dir());
    let addr = format!("0.0.0.0:{}", config.port);
    let session_ttl = config.session_ttl;
    let preview_ttl = config.preview_cache_ttl;
    let state = AppState::new(config, journey);

    // Idle sessions and stale previews
    let eviction_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(EVICTION_INTERVAL).await;
            eviction_state.evict_idle_sessions(session_ttl);
            eviction_state.evict_expired_previews(preview_ttl);
        }
    });

    let app = routes::api()
        .nest_service("/photos", photo_files)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("ridejournal listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Unlock: POST http://{}/api/auth", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
