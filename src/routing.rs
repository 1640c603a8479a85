//! Application router configuration.

use axum::{Router, routing::get};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    api_client::HttpAttendanceApi,
    dashboard::dashboard_routes,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    log_api::log_api_routes,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(log_api_routes::<AppState>())
        .merge(dashboard_routes::<HttpAttendanceApi, AppState>())
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::{AppState, endpoints, log_api::AttendanceLog, test_utils::TempLog};

    use super::build_router;

    fn get_test_server(log: &TempLog) -> TestServer {
        // Nothing listens on port 9, the dashboard routes are not exercised here.
        let state = AppState::new(
            "http://127.0.0.1:9",
            AttendanceLog::new(log.path()),
            None,
            "Etc/UTC",
            10,
        )
        .expect("Could not create app state.");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn serves_log_api() {
        let log = TempLog::with_contents(
            "router-log-api",
            "student_id,student_name,timestamp,status\ns1,An,2024-01-01 10:00:00,1\n",
        );
        let server = get_test_server(&log);

        let response = server.get(endpoints::ATTENDANCE_SUMMARY_API).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["unique_students"], 1);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let log = TempLog::in_new_directory("router-not-found");
        let server = get_test_server(&log);

        let response = server.get("/definitely/not/a/page").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Page Not Found"));
    }

    #[tokio::test]
    async fn error_page_is_served() {
        let log = TempLog::in_new_directory("router-error-page");
        let server = get_test_server(&log);

        let response = server.get(endpoints::INTERNAL_ERROR_VIEW).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("Sorry, something went wrong."));
    }
}
