//! Attendance Dashboard is a web app for reviewing face-recognition attendance logs.
//!
//! This library serves two things from one router:
//! - a JSON API over the attendance log CSV (summary counters, daily buckets,
//!   per-student success rates, raw records and a refresh hook), and
//! - a dashboard that consumes that API, renders ECharts charts and a
//!   searchable, sortable attendance table as HTML.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod api_client;
mod app_state;
mod attendance;
mod dashboard;
mod endpoints;
mod html;
mod internal_server_error;
mod log_api;
mod not_found;
mod routing;
mod timestamp;

#[cfg(test)]
mod test_utils;

pub use api_client::{AttendanceApi, HttpAttendanceApi};
pub use app_state::AppState;
pub use attendance::{
    ApiResponse, AttendanceRecord, DailyBucket, RecognitionStatus, RefreshResponse,
    StudentRateBucket, SummaryCounters,
};
pub use dashboard::{
    ChartKind, ChartOptions, ChartRegistry, ChartTheme, Dataset, DashboardConfig,
    DashboardController, LegendPosition, RefreshState, Region, RegionError, RenderedChart,
    SeriesColor, SortColumn, SortOrder, TableQuery, TooltipStyle, create_bar_chart,
    create_line_chart, create_pie_chart, dashboard_routes,
};
pub use log_api::{AttendanceLog, LogApiState, LogSource, log_api_routes};
pub use routing::build_router;

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request to the attendance API could not be completed, or its
    /// response body could not be decoded.
    ///
    /// The string holds the underlying error for the logs. It is not shown to
    /// the user, who gets a message specific to the dashboard region instead.
    #[error("could not reach the attendance API: {0}")]
    Transport(String),

    /// The attendance API answered, but with a status other than "success".
    ///
    /// Holds the message from the payload, or a generic fallback if the
    /// payload had none.
    #[error("{0}")]
    Application(String),

    /// A chart was rendered into a container that the dashboard does not declare.
    #[error("chart container '{0}' not found")]
    ContainerNotFound(String),

    /// A refresh was requested while another one is still in flight.
    #[error("a refresh is already in progress")]
    RefreshInProgress,

    /// The refresh endpoint was called but no upstream log source is configured.
    #[error("no log source configured")]
    NoLogSource,

    /// The latest log could not be copied from the upstream log source.
    #[error("failed to download log file: {0}")]
    LogDownload(String),

    /// The attendance log could not be parsed as CSV.
    #[error("could not parse the attendance log: {0}")]
    InvalidCSV(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the lock on the dashboard's rendered regions.
    #[error("could not acquire the dashboard lock")]
    DashboardLockError,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DashboardLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert notice for an htmx request.
    ///
    /// The response uses an error status code so that htmx swaps it into the
    /// alert container (`hx-target-error`) and leaves the requesting region as is.
    /// `HX-Reswap: innerHTML` keeps the container itself in the page.
    fn into_alert_response(self) -> Response {
        let (status_code, details) = match self {
            Error::Application(message) => (StatusCode::BAD_GATEWAY, message),
            Error::Transport(_) => (
                StatusCode::BAD_GATEWAY,
                "Unable to connect to the attendance API.".to_owned(),
            ),
            Error::ContainerNotFound(container_id) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("The chart container '{container_id}' does not exist on this page."),
            ),
            Error::RefreshInProgress => (
                StatusCode::CONFLICT,
                "A refresh is already in progress, please wait for it to finish.".to_owned(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        Alert::error(details).into_error_response(status_code)
    }
}
