//! HTTP handlers for the attendance log API.

use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    Error,
    attendance::{
        ApiResponse, AttendanceRecord, DailyBucket, RefreshResponse, SUCCESS_STATUS,
        StudentRateBucket, SummaryCounters,
    },
    endpoints,
};

use super::{
    LogApiState,
    aggregation::{attendance_by_date, attendance_records, student_success_rates, summarize},
    refresh::refresh_log,
};

/// The routes for the attendance log API.
pub fn log_api_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    LogApiState: FromRef<S>,
{
    Router::new()
        .route(endpoints::ATTENDANCE_DATA_API, get(get_attendance_data))
        .route(endpoints::ATTENDANCE_SUMMARY_API, get(get_attendance_summary))
        .route(endpoints::ATTENDANCE_BY_DATE_API, get(get_attendance_by_date))
        .route(
            endpoints::STUDENT_SUCCESS_RATE_API,
            get(get_student_success_rate),
        )
        .route(endpoints::REFRESH_API, post(post_refresh))
}

/// Every record in the log, or an error if the log is empty.
async fn get_attendance_data(
    State(state): State<LogApiState>,
) -> Json<ApiResponse<Vec<AttendanceRecord>>> {
    let entries = state.log.read().await;

    if entries.is_empty() {
        return Json(ApiResponse::error("No data available"));
    }

    Json(ApiResponse::success(attendance_records(&entries)))
}

async fn get_attendance_summary(
    State(state): State<LogApiState>,
) -> Json<ApiResponse<SummaryCounters>> {
    let entries = state.log.read().await;

    Json(ApiResponse::success(summarize(&entries)))
}

async fn get_attendance_by_date(
    State(state): State<LogApiState>,
) -> Json<ApiResponse<Vec<DailyBucket>>> {
    let entries = state.log.read().await;

    Json(ApiResponse::success(attendance_by_date(&entries)))
}

async fn get_student_success_rate(
    State(state): State<LogApiState>,
) -> Json<ApiResponse<Vec<StudentRateBucket>>> {
    let entries = state.log.read().await;

    Json(ApiResponse::success(student_success_rates(&entries)))
}

/// Copy the latest log from the log source over the served log.
///
/// Failures are answered with a 500 and `{"status": "error", "message": ...}`.
async fn post_refresh(State(state): State<LogApiState>) -> Response {
    let _guard = state.refresh_lock.lock().await;

    match refresh_log(&state.log, state.source.as_ref(), &state.client).await {
        Ok(()) => Json(RefreshResponse {
            status: Some(SUCCESS_STATUS.to_owned()),
            data: None,
            message: Some("Data refreshed successfully".to_owned()),
            file_path: Some(state.log.path().display().to_string()),
        })
        .into_response(),
        Err(error) => {
            tracing::error!("could not refresh the attendance log: {error}");

            let message = match error {
                Error::NoLogSource => "No log source configured".to_owned(),
                Error::LogDownload(_) => "Failed to download log file".to_owned(),
                error => format!("Error refreshing data: {error}"),
            };

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RefreshResponse::error(message)),
            )
                .into_response()
        }
    }
}
