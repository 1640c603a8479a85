//! Implements a struct that holds the state of the server.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    Error,
    api_client::HttpAttendanceApi,
    dashboard::{DashboardConfig, DashboardController},
    log_api::{AttendanceLog, LogApiState, LogSource},
    timestamp::get_timezone,
};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The dashboard and the regions it last rendered.
    pub dashboard: Arc<DashboardController<HttpAttendanceApi>>,

    /// The attendance log served by the log API.
    pub log_api: LogApiState,
}

impl AppState {
    /// Create the state for a server that serves the log API from `log` and a
    /// dashboard that reads from the attendance API at `api_base_url`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g.
    /// "Asia/Ho_Chi_Minh". It sets the calendar day used by the table's date filter.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn new(
        api_base_url: &str,
        log: AttendanceLog,
        log_source: Option<LogSource>,
        local_timezone: &str,
        page_size: usize,
    ) -> Result<Self, Error> {
        let timezone = get_timezone(local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_owned()))?;

        let config = DashboardConfig {
            timezone,
            page_size,
        };

        Ok(Self {
            dashboard: Arc::new(DashboardController::new(
                HttpAttendanceApi::new(api_base_url),
                config,
            )),
            log_api: LogApiState::new(log, log_source),
        })
    }
}

impl FromRef<AppState> for Arc<DashboardController<HttpAttendanceApi>> {
    fn from_ref(state: &AppState) -> Self {
        state.dashboard.clone()
    }
}

impl FromRef<AppState> for LogApiState {
    fn from_ref(state: &AppState) -> Self {
        state.log_api.clone()
    }
}
