//! The dashboard controller: fetches each region's data, transforms it and
//! keeps the last rendered state of every region.
//!
//! Each region loads independently. A failed load leaves that region showing
//! whatever it showed before and is reported as a [RegionError], which renders
//! as an alert notice.

use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::Markup;
use time_tz::Tz;

use crate::{Error, alert::Alert, api_client::AttendanceApi};

use super::{
    cards::summary_region_view,
    charts::{
        ChartOptions, ChartRegistry, chart_region_view, create_bar_chart, create_pie_chart,
    },
    table::{AttendanceTable, TableQuery, table_region_view, table_results_view},
    transforms::{
        SummaryText, daily_attendance_chart_data, recognition_share_chart_data,
        student_success_chart_data, summary_text, table_rows,
    },
};
use crate::endpoints;

pub(super) const DAILY_ATTENDANCE_CHART_ID: &str = "daily-attendance-chart";
pub(super) const STUDENT_SUCCESS_CHART_ID: &str = "student-success-chart";
pub(super) const RECOGNITION_SHARE_CHART_ID: &str = "recognition-share-chart";

/// The notice shown after a successful refresh.
const REFRESH_SUCCESS_MESSAGE: &str = "Data has been updated from the log source.";

/// Display settings for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    /// The timezone used to display timestamps and to match the table's date filter.
    pub timezone: &'static Tz,
    /// The number of rows per page in the attendance table.
    pub page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            timezone: time_tz::timezones::db::etc::UTC,
            page_size: 10,
        }
    }
}

/// Whether a manual refresh is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh is running.
    Idle,
    /// A refresh request has been sent and has not finished yet.
    Loading,
}

/// A part of the dashboard that loads on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The headline counters and the recognition share chart.
    Summary,
    /// The successful and failed recognitions per day.
    DailyAttendanceChart,
    /// The success rate per student.
    StudentSuccessChart,
    /// The attendance records.
    Table,
    /// The manual refresh of the attendance log.
    Refresh,
}

impl Region {
    /// The message shown when the API fails without saying why.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Region::Summary => "Unable to load overview data",
            Region::DailyAttendanceChart => "Unable to load daily attendance chart",
            Region::StudentSuccessChart => "Unable to load student success rate chart",
            Region::Table => "Unable to load attendance data",
            Region::Refresh => "Unable to update data",
        }
    }

    /// The message shown when the API could not be reached.
    pub fn transport_message(self) -> &'static str {
        match self {
            Region::Refresh => "Unable to connect to API to update data",
            region => region.fallback_message(),
        }
    }
}

/// A region that could not be loaded.
#[derive(Debug, PartialEq)]
pub struct RegionError {
    /// The region that failed.
    pub region: Region,
    /// Why it failed.
    pub error: Error,
}

impl RegionError {
    fn new(region: Region, error: Error) -> Self {
        tracing::error!("could not load {region:?}: {error}");

        Self { region, error }
    }

    /// The notice to show the user.
    pub fn alert(&self) -> Alert {
        match &self.error {
            Error::Application(message) => Alert::error(message.as_str()),
            Error::Transport(_) => Alert::error(self.region.transport_message()),
            _ => Alert::error(self.region.fallback_message()),
        }
    }
}

impl IntoResponse for RegionError {
    fn into_response(self) -> Response {
        match self.error {
            Error::Application(_) | Error::Transport(_) => {
                self.alert().into_error_response(StatusCode::BAD_GATEWAY)
            }
            error => error.into_alert_response(),
        }
    }
}

/// The last successfully loaded state of every region.
#[derive(Debug)]
struct DashboardRegions {
    summary: Option<SummaryText>,
    charts: ChartRegistry,
    table: Option<AttendanceTable>,
}

/// Loads, transforms and renders the dashboard's regions.
#[derive(Debug)]
pub struct DashboardController<A> {
    api: A,
    config: DashboardConfig,
    regions: Mutex<DashboardRegions>,
    refresh_state: Mutex<RefreshState>,
}

impl<A: AttendanceApi> DashboardController<A> {
    /// Create a controller that has not loaded anything yet.
    pub fn new(api: A, config: DashboardConfig) -> Self {
        Self {
            api,
            config,
            regions: Mutex::new(DashboardRegions {
                summary: None,
                charts: ChartRegistry::new(&[
                    DAILY_ATTENDANCE_CHART_ID,
                    STUDENT_SUCCESS_CHART_ID,
                    RECOGNITION_SHARE_CHART_ID,
                ]),
                table: None,
            }),
            refresh_state: Mutex::new(RefreshState::Idle),
        }
    }

    fn lock_regions(&self) -> Result<MutexGuard<'_, DashboardRegions>, Error> {
        self.regions
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire dashboard lock: {error}"))
            .map_err(|_| Error::DashboardLockError)
    }

    /// Fetch the summary counters and rebuild the summary region.
    pub async fn load_summary(&self) -> Result<(), RegionError> {
        let region = Region::Summary;
        let summary = self
            .api
            .attendance_summary()
            .await
            .and_then(|response| response.into_data(region.fallback_message()))
            .map_err(|error| RegionError::new(region, error))?;

        let share = recognition_share_chart_data(&summary);
        let mut regions = self
            .lock_regions()
            .map_err(|error| RegionError::new(region, error))?;

        create_pie_chart(
            &mut regions.charts,
            RECOGNITION_SHARE_CHART_ID,
            share.labels,
            share.data,
            share.colors,
            true,
            ChartOptions::default(),
        )
        .map_err(|error| RegionError::new(region, error))?;
        regions.summary = Some(summary_text(&summary));

        Ok(())
    }

    /// Fetch the per-day counts and rebuild the daily attendance chart.
    pub async fn load_daily_attendance(&self) -> Result<(), RegionError> {
        let region = Region::DailyAttendanceChart;
        let buckets = self
            .api
            .attendance_by_date()
            .await
            .and_then(|response| response.into_data(region.fallback_message()))
            .map_err(|error| RegionError::new(region, error))?;

        let chart = daily_attendance_chart_data(&buckets);
        let mut regions = self
            .lock_regions()
            .map_err(|error| RegionError::new(region, error))?;

        create_bar_chart(
            &mut regions.charts,
            DAILY_ATTENDANCE_CHART_ID,
            chart.labels,
            chart.datasets,
            chart.options,
        )
        .map(|_| ())
        .map_err(|error| RegionError::new(region, error))
    }

    /// Fetch the per-student rates and rebuild the student success chart.
    pub async fn load_student_success(&self) -> Result<(), RegionError> {
        let region = Region::StudentSuccessChart;
        let buckets = self
            .api
            .student_success_rate()
            .await
            .and_then(|response| response.into_data(region.fallback_message()))
            .map_err(|error| RegionError::new(region, error))?;

        let chart = student_success_chart_data(&buckets);
        let mut regions = self
            .lock_regions()
            .map_err(|error| RegionError::new(region, error))?;

        create_bar_chart(
            &mut regions.charts,
            STUDENT_SUCCESS_CHART_ID,
            chart.labels,
            chart.datasets,
            chart.options,
        )
        .map(|_| ())
        .map_err(|error| RegionError::new(region, error))
    }

    /// Fetch the attendance records and replace the table's rows.
    ///
    /// The table does not check the response status: a response without
    /// records gives an empty table.
    pub async fn load_table(&self) -> Result<(), RegionError> {
        let region = Region::Table;
        let response = self
            .api
            .attendance_data()
            .await
            .map_err(|error| RegionError::new(region, error))?;

        if !response.is_success() {
            tracing::warn!(
                "attendance data responded with status {:?}: {:?}",
                response.status,
                response.message
            );
        }

        let rows = table_rows(response.data.unwrap_or_default(), self.config.timezone);
        let mut regions = self
            .lock_regions()
            .map_err(|error| RegionError::new(region, error))?;
        regions.table = Some(AttendanceTable::new(rows));

        Ok(())
    }

    /// Load every region concurrently, returning the regions that failed.
    pub async fn load_all(&self) -> Vec<RegionError> {
        let (summary, daily_attendance, student_success, table) = tokio::join!(
            self.load_summary(),
            self.load_daily_attendance(),
            self.load_student_success(),
            self.load_table(),
        );

        [summary, daily_attendance, student_success, table]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    /// Ask the API to re-sync the attendance log.
    ///
    /// This does not reload any region. On success the caller tells the page
    /// to re-fetch each region on its own.
    ///
    /// # Errors
    /// Fails with [Error::RefreshInProgress] if another refresh has not finished.
    pub async fn refresh(&self) -> Result<Alert, RegionError> {
        let region = Region::Refresh;
        let _loading = RefreshGuard::begin(&self.refresh_state)
            .map_err(|error| RegionError::new(region, error))?;

        let response = self
            .api
            .refresh()
            .await
            .map_err(|error| RegionError::new(region, error))?;

        response
            .into_acknowledgement(region.fallback_message())
            .map_err(|error| RegionError::new(region, error))?;

        tracing::info!("attendance log refreshed");

        Ok(Alert::success(REFRESH_SUCCESS_MESSAGE))
    }

    /// The current state of the manual refresh.
    pub fn refresh_state(&self) -> RefreshState {
        *self
            .refresh_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The table page size.
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Render the summary region from its last loaded state.
    pub fn summary_view(&self) -> Result<Markup, Error> {
        let regions = self.lock_regions()?;

        Ok(summary_region_view(
            regions.summary.as_ref(),
            regions.charts.get(RECOGNITION_SHARE_CHART_ID),
            RECOGNITION_SHARE_CHART_ID,
        ))
    }

    /// Render the daily attendance region from its last loaded state.
    pub fn daily_attendance_view(&self) -> Result<Markup, Error> {
        let regions = self.lock_regions()?;

        Ok(chart_region_view(
            "Daily Attendance",
            endpoints::DASHBOARD_DAILY_ATTENDANCE_CHART,
            DAILY_ATTENDANCE_CHART_ID,
            regions.charts.get(DAILY_ATTENDANCE_CHART_ID),
            "Daily attendance is not available.",
        ))
    }

    /// Render the student success region from its last loaded state.
    pub fn student_success_view(&self) -> Result<Markup, Error> {
        let regions = self.lock_regions()?;

        Ok(chart_region_view(
            "Student Success Rate",
            endpoints::DASHBOARD_STUDENT_SUCCESS_CHART,
            STUDENT_SUCCESS_CHART_ID,
            regions.charts.get(STUDENT_SUCCESS_CHART_ID),
            "Student success rates are not available.",
        ))
    }

    /// Render the whole table region, including its filter form.
    pub fn table_region_view(&self, query: &TableQuery) -> Result<Markup, Error> {
        let regions = self.lock_regions()?;

        Ok(table_region_view(
            regions.table.as_ref(),
            query,
            self.config.page_size,
        ))
    }

    /// Render the table rows matching `query` without fetching.
    ///
    /// Before the first load this is an empty table.
    pub fn table_results_view(&self, query: &TableQuery) -> Result<Markup, Error> {
        let regions = self.lock_regions()?;
        let empty = AttendanceTable::default();
        let table = regions.table.as_ref().unwrap_or(&empty);

        Ok(table_results_view(
            &table.query(query, self.config.page_size),
            query,
        ))
    }
}

/// Holds the refresh state at [RefreshState::Loading] until dropped.
struct RefreshGuard<'a> {
    state: &'a Mutex<RefreshState>,
}

impl<'a> RefreshGuard<'a> {
    fn begin(state: &'a Mutex<RefreshState>) -> Result<Self, Error> {
        let mut current = state
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire refresh lock: {error}"))
            .map_err(|_| Error::DashboardLockError)?;

        if *current == RefreshState::Loading {
            return Err(Error::RefreshInProgress);
        }

        *current = RefreshState::Loading;

        Ok(Self { state })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = RefreshState::Idle;
    }
}
