//! The attendance log API.
//!
//! Serves the JSON endpoints the dashboard reads from, computed from the
//! attendance log CSV written by the face recognition service.

mod aggregation;
mod handlers;
mod log_file;
mod refresh;

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;

pub use handlers::log_api_routes;
pub use log_file::AttendanceLog;
pub use refresh::LogSource;

/// The state shared by the log API handlers.
#[derive(Debug, Clone)]
pub struct LogApiState {
    log: AttendanceLog,
    source: Option<LogSource>,
    client: Client,
    // Held for the whole refresh so two refreshes never write the log at once.
    refresh_lock: Arc<Mutex<()>>,
}

impl LogApiState {
    /// Serve `log`, copying it from `source` on refresh if there is one.
    pub fn new(log: AttendanceLog, source: Option<LogSource>) -> Self {
        Self {
            log,
            source,
            client: Client::new(),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }
}
