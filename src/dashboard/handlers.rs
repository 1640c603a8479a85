//! Dashboard HTTP handlers and the page layout.
//!
//! The handlers are generic over the [AttendanceApi] so that the router can
//! serve the HTTP client in production and a scripted API in tests.

use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::Query;
use axum_htmx::HxResponseTrigger;
use maud::{Markup, html};

use crate::{
    alert::Alert,
    api_client::AttendanceApi,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, HeadElement, PAGE_CONTAINER_STYLE, Script, base, loading_spinner,
    },
};

use super::{controller::DashboardController, table::TableQuery};

/// The event sent to the page after a successful refresh. Every region listens
/// for it and re-fetches itself.
pub(super) const DASHBOARD_REFRESHED_EVENT: &str = "dashboard-refreshed";

// The release bundled with charming, served from `static/`.
const ECHARTS_SCRIPT: Script = Script {
    src: "/static/echarts-5.5.1.min.js",
    integrity: "sha384-Mx5lkUEQPM1pOJCwFtUICyX45KNojXbkWdYhkKUKsbv391mavbfoAmONbzkgYPzR",
};

/// The routes for the dashboard page and its regions.
pub fn dashboard_routes<A, S>() -> Router<S>
where
    A: AttendanceApi,
    S: Clone + Send + Sync + 'static,
    Arc<DashboardController<A>>: FromRef<S>,
{
    Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page::<A>))
        .route(endpoints::DASHBOARD_SUMMARY, get(get_summary_region::<A>))
        .route(
            endpoints::DASHBOARD_DAILY_ATTENDANCE_CHART,
            get(get_daily_attendance_region::<A>),
        )
        .route(
            endpoints::DASHBOARD_STUDENT_SUCCESS_CHART,
            get(get_student_success_region::<A>),
        )
        .route(endpoints::DASHBOARD_TABLE, get(get_attendance_table::<A>))
        .route(
            endpoints::DASHBOARD_TABLE_RELOAD,
            get(reload_attendance_table::<A>),
        )
        .route(endpoints::DASHBOARD_REFRESH, post(refresh_dashboard::<A>))
}

/// Display the dashboard with every region loaded.
///
/// Regions that fail to load are shown empty with an alert explaining what failed.
pub async fn get_dashboard_page<A: AttendanceApi>(
    State(controller): State<Arc<DashboardController<A>>>,
) -> Response {
    let failures = controller.load_all().await;
    let alerts: Vec<Alert> = failures.iter().map(|failure| failure.alert()).collect();

    let regions = controller.summary_view().and_then(|summary| {
        Ok([
            summary,
            controller.daily_attendance_view()?,
            controller.student_success_view()?,
            controller.table_region_view(&TableQuery::default())?,
        ])
    });

    match regions {
        Ok([summary, daily_attendance, student_success, table]) => dashboard_view(
            summary,
            daily_attendance,
            student_success,
            table,
            alerts,
        )
        .into_response(),
        Err(error) => error.into_response(),
    }
}

/// Re-fetch and render the summary region.
pub async fn get_summary_region<A: AttendanceApi>(
    State(controller): State<Arc<DashboardController<A>>>,
) -> Response {
    if let Err(failure) = controller.load_summary().await {
        return failure.into_response();
    }

    controller
        .summary_view()
        .map(IntoResponse::into_response)
        .unwrap_or_else(|error| error.into_alert_response())
}

/// Re-fetch and render the daily attendance chart region.
pub async fn get_daily_attendance_region<A: AttendanceApi>(
    State(controller): State<Arc<DashboardController<A>>>,
) -> Response {
    if let Err(failure) = controller.load_daily_attendance().await {
        return failure.into_response();
    }

    controller
        .daily_attendance_view()
        .map(IntoResponse::into_response)
        .unwrap_or_else(|error| error.into_alert_response())
}

/// Re-fetch and render the student success chart region.
pub async fn get_student_success_region<A: AttendanceApi>(
    State(controller): State<Arc<DashboardController<A>>>,
) -> Response {
    if let Err(failure) = controller.load_student_success().await {
        return failure.into_response();
    }

    controller
        .student_success_view()
        .map(IntoResponse::into_response)
        .unwrap_or_else(|error| error.into_alert_response())
}

/// Filter, sort and page the rows that were last fetched, without fetching.
pub async fn get_attendance_table<A: AttendanceApi>(
    State(controller): State<Arc<DashboardController<A>>>,
    Query(query): Query<TableQuery>,
) -> Response {
    controller
        .table_results_view(&query)
        .map(IntoResponse::into_response)
        .unwrap_or_else(|error| error.into_alert_response())
}

/// Re-fetch the attendance records and render the table region, keeping the
/// filters from `query`.
pub async fn reload_attendance_table<A: AttendanceApi>(
    State(controller): State<Arc<DashboardController<A>>>,
    Query(query): Query<TableQuery>,
) -> Response {
    if let Err(failure) = controller.load_table().await {
        return failure.into_response();
    }

    controller
        .table_region_view(&TableQuery {
            page: None,
            ..query
        })
        .map(IntoResponse::into_response)
        .unwrap_or_else(|error| error.into_alert_response())
}

/// Ask the attendance API to re-sync its log.
///
/// On success the response tells every region to reload itself.
pub async fn refresh_dashboard<A: AttendanceApi>(
    State(controller): State<Arc<DashboardController<A>>>,
) -> Response {
    match controller.refresh().await {
        Ok(alert) => (
            HxResponseTrigger::normal([DASHBOARD_REFRESHED_EVENT]),
            alert,
        )
            .into_response(),
        Err(failure) => failure.into_response(),
    }
}

fn dashboard_view(
    summary: Markup,
    daily_attendance: Markup,
    student_success: Markup,
    table: Markup,
    alerts: Vec<Alert>,
) -> Markup {
    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex justify-between flex-wrap items-end w-full mb-4 gap-4"
            {
                h1 class="text-2xl font-bold" { "Attendance Dashboard" }

                button
                    id="refresh-button"
                    type="button"
                    class=(BUTTON_PRIMARY_STYLE)
                    hx-post=(endpoints::DASHBOARD_REFRESH)
                    hx-target="#alert-container"
                    hx-target-error="#alert-container"
                    hx-swap="innerHTML"
                    hx-indicator="#loading-overlay"
                    hx-disabled-elt="this"
                {
                    "Refresh Data"
                }
            }

            @if !alerts.is_empty() {
                div id="page-alerts" class="w-full"
                {
                    @for alert in alerts {
                        (alert.into_html())
                    }
                }
            }

            div class="w-full space-y-6"
            {
                (summary)

                div class="grid grid-cols-1 lg:grid-cols-2 gap-6"
                {
                    (daily_attendance)
                    (student_success)
                }

                (table)
            }
        }

        div id="loading-overlay" class="loading-overlay htmx-indicator"
        {
            (loading_spinner())
            span class="text-white" { "Updating data..." }
        }
    };

    base(
        "Dashboard",
        &[HeadElement::ScriptLink(ECHARTS_SCRIPT)],
        &content,
    )
}
