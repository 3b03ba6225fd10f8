//! CLI entry point for the TransLoc to GTFS bridge.
//!
//! Runs the HTTP server, or produces a single static table or realtime feed
//! from the command line.

use anyhow::Result;
use bytes::Bytes;
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transloc_gtfs::{
    config::Settings,
    feed::{assemble, encode},
    fetch::{BasicClient, fetch_bytes},
    parser::parse_feed,
    realtime::fetch_snapshot,
    server::{self, AppState},
    static_feed::{StaticFeedBuilder, StaticTable},
    stats::FeedSummary,
    upstream::{self, validate_agency_id},
};

#[derive(Parser)]
#[command(name = "transloc_gtfs")]
#[command(about = "Serve TransLoc data as GTFS and GTFS-Realtime", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the environment settings of the same name.
#[derive(Args, Default)]
struct SettingsArgs {
    /// TransLoc API base URL [env: TRANSLOC_BASE_URL]
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Vehicle status endpoint [env: TRANSLOC_VEHICLE_URL]
    #[arg(long, global = true)]
    vehicle_url: Option<String>,

    /// JSON lookups file [env: LOOKUPS_PATH]
    #[arg(long, global = true)]
    lookups: Option<String>,

    /// Upstream request timeout in seconds [env: TRANSLOC_TIMEOUT_SECS]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl SettingsArgs {
    fn overrides(&self) -> HashMap<&'static str, String> {
        [
            ("TRANSLOC_BASE_URL", self.base_url.clone()),
            ("TRANSLOC_VEHICLE_URL", self.vehicle_url.clone()),
            ("LOOKUPS_PATH", self.lookups.clone()),
            ("TRANSLOC_TIMEOUT_SECS", self.timeout_secs.map(|s| s.to_string())),
        ]
        .into_iter()
        .filter_map(|(key, value)| Some((key, value?)))
        .collect()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on, overriding BIND_ADDR
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Write one static GTFS table for an agency
    Schedule {
        agency_id: String,

        /// Table file name, e.g. stop_times.txt
        #[arg(value_name = "TABLE")]
        table: StaticTable,

        /// File to write to instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write an encoded GTFS-Realtime feed for an agency
    Realtime {
        agency_id: String,

        #[arg(short, long, value_enum, default_value_t = FeedKind::VehiclePositions)]
        kind: FeedKind,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Decode a GTFS-Realtime feed from a file or URL and summarize it
    Inspect {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FeedKind {
    TripUpdates,
    VehiclePositions,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();
    let settings = Settings::from_env_with(&cli.settings.overrides())?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transloc_gtfs.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    match cli.command {
        Commands::Serve { bind } => {
            let state = Arc::new(AppState {
                source: upstream::from_settings(&settings)?,
                lookups: settings.lookups()?,
            });
            let bind_addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
            server::serve(&bind_addr, state).await?;
        }
        Commands::Schedule {
            agency_id,
            table,
            output,
        } => {
            let agency_id = validate_agency_id(&agency_id)?;
            let source = upstream::from_settings(&settings)?;
            let lookups = settings.lookups()?;

            let builder =
                StaticFeedBuilder::new(source.as_ref(), &lookups, Local::now().date_naive());
            let body = builder.render(table, agency_id).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &body)?;
                    info!(path = %path.display(), %table, bytes = body.len(), "Table written");
                }
                None => print!("{body}"),
            }
        }
        Commands::Realtime {
            agency_id,
            kind,
            output,
        } => {
            let agency_id = validate_agency_id(&agency_id)?;
            let source = upstream::from_settings(&settings)?;

            let snapshot = fetch_snapshot(source.as_ref(), agency_id).await;
            let message = match kind {
                FeedKind::TripUpdates => assemble(&snapshot.trip_updates()),
                FeedKind::VehiclePositions => assemble(&snapshot.vehicle_positions()),
            };
            let bytes = encode(&message);

            std::fs::write(&output, &bytes)?;
            info!(
                path = %output.display(),
                entities = message.entity.len(),
                bytes = bytes.len(),
                "Feed written"
            );
        }
        Commands::Inspect { source } => {
            let bytes = fetcher(&source).await?;
            let feed = parse_feed(&bytes)?;
            let summary = FeedSummary::from_feed(&feed);

            info!(
                version = %summary.gtfs_realtime_version,
                timestamp = summary.timestamp,
                entities = summary.total_entities,
                position_pct = summary.position_pct(),
                "Feed decoded"
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &str) -> Result<Bytes> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, url).await?
    } else {
        std::fs::read(url)?.into()
    };
    Ok(bytes)
}
