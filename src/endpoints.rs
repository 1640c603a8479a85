//! The endpoint URIs for the dashboard pages, the dashboard fragments and the attendance API.

/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/";
/// The summary cards region, re-fetched from the API.
pub const DASHBOARD_SUMMARY: &str = "/dashboard/summary";
/// The daily attendance chart region, re-fetched from the API.
pub const DASHBOARD_DAILY_ATTENDANCE_CHART: &str = "/dashboard/charts/daily-attendance";
/// The student success rate chart region, re-fetched from the API.
pub const DASHBOARD_STUDENT_SUCCESS_CHART: &str = "/dashboard/charts/student-success";
/// The attendance table region, filtered, sorted and paged over the rows
/// already fetched. Never calls the API.
pub const DASHBOARD_TABLE: &str = "/dashboard/table";
/// The attendance table region, re-fetched from the API.
pub const DASHBOARD_TABLE_RELOAD: &str = "/dashboard/table/reload";
/// The route for the manual refresh button.
pub const DASHBOARD_REFRESH: &str = "/dashboard/refresh";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The raw attendance records.
pub const ATTENDANCE_DATA_API: &str = "/api/attendance-data";
/// The summary counters over the whole log.
pub const ATTENDANCE_SUMMARY_API: &str = "/api/attendance-summary";
/// Successful and failed recognitions per day.
pub const ATTENDANCE_BY_DATE_API: &str = "/api/attendance-by-date";
/// Recognition success rate per student.
pub const STUDENT_SUCCESS_RATE_API: &str = "/api/student-success-rate";
/// Re-sync the attendance log from the upstream log source.
pub const REFRESH_API: &str = "/api/refresh";
