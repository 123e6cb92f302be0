//! Balloon route planner.
//!
//! Keeps an in-memory map of live balloon positions, wind vectors and a
//! requested route in sync with the route backend:
//! - Fetches telemetry and wind snapshots on startup
//! - Geocodes two place names and draws the backend's route between them
//! - Exports the map as GeoJSON
//! - Optionally keeps refreshing until interrupted

mod config;
mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use router_client::{HttpRouteService, NominatimGeocoder};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::RouterConfig;
use session::{Session, SessionOptions};

#[derive(Parser, Debug)]
#[command(name = "balloon-router")]
#[command(about = "Plan balloon routes over live telemetry and wind data")]
struct Args {
    /// Configuration file
    #[arg(long, env = "ROUTER_CONFIG", default_value = "config/router.yaml")]
    config: PathBuf,

    /// Route backend URL (overrides the config file)
    #[arg(long, env = "BACKEND_URL")]
    backend_url: Option<String>,

    /// Geocoding service URL (overrides the config file)
    #[arg(long, env = "GEOCODER_URL")]
    geocoder_url: Option<String>,

    /// Start place name
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Destination place name
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Write the map as GeoJSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep running: refresh snapshots and read `<from> -> <to>` route
    /// requests from stdin until Ctrl+C
    #[arg(long)]
    watch: bool,

    /// Snapshot refresh interval in watch mode
    #[arg(long, env = "REFRESH_SECS", default_value = "3600")]
    refresh_secs: u64,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Logs go to stderr; stdout may carry the GeoJSON export.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    info!("Starting balloon router");

    let config = RouterConfig::load(&args.config)?
        .with_overrides(args.backend_url.clone(), args.geocoder_url.clone());

    let service = Arc::new(HttpRouteService::new(&config.backend_client())?);
    let geocoder = NominatimGeocoder::new(&config.geocoder_client())?;
    info!(
        backend = %service.base_url(),
        geocoder = %config.geocoder.base_url,
        "Clients ready"
    );

    let options = SessionOptions {
        from: args.from,
        to: args.to,
        output: args.output,
        watch: args.watch,
        refresh_interval: Duration::from_secs(args.refresh_secs.max(1)),
    };

    let session = Session::new(config.engine()?, geocoder, service, options);
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
    };
    let stats = session
        .run(BufReader::new(tokio::io::stdin()), shutdown)
        .await?;

    info!(
        markers = stats.markers,
        wind_glyphs = stats.wind_glyphs,
        route_overlays = stats.route_overlays,
        refresh_cycles = stats.refresh_cycles,
        last_snapshot_at = ?stats.last_snapshot_at,
        "Session complete"
    );

    Ok(())
}
