//! The client side of the attendance API.
//!
//! [AttendanceApi] is the seam between the dashboard and the backend. The
//! dashboard only ever sees the decoded response envelopes; deciding whether a
//! response counts as a success is left to the caller.

use std::future::Future;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    Error,
    attendance::{
        ApiResponse, AttendanceRecord, DailyBucket, RefreshResponse, StudentRateBucket,
        SummaryCounters,
    },
    endpoints,
};

/// The attendance API as seen by the dashboard.
///
/// Every method fails with [Error::Transport] if the request could not be
/// made or the body was not valid JSON. Application level failures are
/// returned as a decoded envelope whose status is not "success".
pub trait AttendanceApi: Send + Sync + 'static {
    /// `GET /api/attendance-data`
    fn attendance_data(
        &self,
    ) -> impl Future<Output = Result<ApiResponse<Vec<AttendanceRecord>>, Error>> + Send;

    /// `GET /api/attendance-summary`
    fn attendance_summary(
        &self,
    ) -> impl Future<Output = Result<ApiResponse<SummaryCounters>, Error>> + Send;

    /// `GET /api/attendance-by-date`
    fn attendance_by_date(
        &self,
    ) -> impl Future<Output = Result<ApiResponse<Vec<DailyBucket>>, Error>> + Send;

    /// `GET /api/student-success-rate`
    fn student_success_rate(
        &self,
    ) -> impl Future<Output = Result<ApiResponse<Vec<StudentRateBucket>>, Error>> + Send;

    /// `POST /api/refresh`
    fn refresh(&self) -> impl Future<Output = Result<RefreshResponse, Error>> + Send;
}

/// An [AttendanceApi] that talks to the attendance API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAttendanceApi {
    client: Client,
    base_url: String,
}

impl HttpAttendanceApi {
    /// Create a client for the API served at `base_url`, e.g. "http://127.0.0.1:5000".
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        let url = self.url(endpoint);
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .inspect_err(|error| tracing::error!("request to {url} failed: {error}"))
            .map_err(|error| Error::Transport(error.to_string()))?;

        decode_body(&url, response).await
    }
}

/// Decode a JSON body regardless of the HTTP status code.
///
/// The attendance API reports failures as `{"status": "error", "message": ...}`
/// with a 500, and that message is what the user should see.
async fn decode_body<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T, Error> {
    let status_code = response.status();

    response
        .json::<T>()
        .await
        .inspect_err(|error| {
            tracing::error!("could not decode response from {url} ({status_code}): {error}")
        })
        .map_err(|error| Error::Transport(error.to_string()))
}

impl AttendanceApi for HttpAttendanceApi {
    async fn attendance_data(&self) -> Result<ApiResponse<Vec<AttendanceRecord>>, Error> {
        self.get_json(endpoints::ATTENDANCE_DATA_API).await
    }

    async fn attendance_summary(&self) -> Result<ApiResponse<SummaryCounters>, Error> {
        self.get_json(endpoints::ATTENDANCE_SUMMARY_API).await
    }

    async fn attendance_by_date(&self) -> Result<ApiResponse<Vec<DailyBucket>>, Error> {
        self.get_json(endpoints::ATTENDANCE_BY_DATE_API).await
    }

    async fn student_success_rate(&self) -> Result<ApiResponse<Vec<StudentRateBucket>>, Error> {
        self.get_json(endpoints::STUDENT_SUCCESS_RATE_API).await
    }

    async fn refresh(&self) -> Result<RefreshResponse, Error> {
        let url = self.url(endpoints::REFRESH_API);
        tracing::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .inspect_err(|error| tracing::error!("request to {url} failed: {error}"))
            .map_err(|error| Error::Transport(error.to_string()))?;

        decode_body(&url, response).await
    }
}
