use std::{
    fs::OpenOptions,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use attendance_dashboard::{AppState, AttendanceLog, LogSource, build_router, graceful_shutdown};

/// The web server for the attendance dashboard and the attendance log API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The address to serve the app from.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    host: IpAddr,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// File path to the attendance log CSV served by the log API.
    #[arg(long, env = "DATA_FILE_PATH", default_value = "data/attendance_log.csv")]
    data_file_path: PathBuf,

    /// Where to copy the latest log from on refresh, a file path or an HTTP(S) URL.
    ///
    /// Refreshing fails with an error message if this is not set.
    #[arg(long, env = "LOG_SOURCE")]
    log_source: Option<LogSource>,

    /// The base URL of the attendance API the dashboard reads from.
    ///
    /// Defaults to the log API served by this process.
    #[arg(long, env = "API_BASE_URL")]
    api_base_url: Option<String>,

    /// The canonical timezone used for the table's date filter, e.g. "Asia/Ho_Chi_Minh".
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The number of rows per page in the attendance table.
    #[arg(long, env = "PAGE_SIZE", default_value_t = 10)]
    page_size: usize,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::new(args.host, args.port);
    let api_base_url = args
        .api_base_url
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", args.port));

    if args.log_source.is_none() {
        tracing::warn!("No log source configured, refreshing the dashboard will fail.");
    }

    let state = match AppState::new(
        &api_base_url,
        AttendanceLog::new(&args.data_file_path),
        args.log_source,
        &args.timezone,
        args.page_size.max(1),
    ) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!(
        "Serving {} from {}, dashboard reads from {}",
        args.data_file_path.display(),
        addr,
        api_base_url
    );
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Region and refresh errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
