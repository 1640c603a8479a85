//! Pure mappings from API payloads to the shapes the charts, cards and table render.

use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    attendance::{AttendanceRecord, DailyBucket, RecognitionStatus, StudentRateBucket, SummaryCounters},
    timestamp::{date_key, format_display_timestamp, offset_at, parse_timestamp},
};

use super::{
    charts::{ChartOptions, Dataset, SeriesColor},
    palette::{ColorPair, danger_colors, success_colors, warning_colors},
};

const BORDER_WIDTH: u32 = 2;

/// The summary counters as display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SummaryText {
    pub unique_students: String,
    pub successful_recognitions: String,
    pub failed_recognitions: String,
    pub success_rate: String,
}

pub(super) fn summary_text(summary: &SummaryCounters) -> SummaryText {
    SummaryText {
        unique_students: summary.unique_students.to_string(),
        successful_recognitions: summary.successful_recognitions.to_string(),
        failed_recognitions: summary.failed_recognitions.to_string(),
        success_rate: format!("{}%", summary.success_rate),
    }
}

/// Labels and index-aligned datasets for a bar chart.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct BarChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

/// Labels, values and segment colours for a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PieChartData {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub colors: Vec<&'static str>,
}

/// Successful and failed recognitions per day, in the order the API returned the days.
pub(super) fn daily_attendance_chart_data(buckets: &[DailyBucket]) -> BarChartData {
    let success = success_colors();
    let danger = danger_colors();

    BarChartData {
        labels: buckets.iter().map(|bucket| bucket.date.clone()).collect(),
        datasets: vec![
            Dataset {
                label: "Success".to_owned(),
                data: buckets.iter().map(|bucket| bucket.successful as f64).collect(),
                fill: SeriesColor::Uniform(success.fill),
                border: SeriesColor::Uniform(success.border),
                border_width: BORDER_WIDTH,
            },
            Dataset {
                label: "Failed".to_owned(),
                data: buckets.iter().map(|bucket| bucket.failed as f64).collect(),
                fill: SeriesColor::Uniform(danger.fill),
                border: SeriesColor::Uniform(danger.border),
                border_width: BORDER_WIDTH,
            },
        ],
        options: ChartOptions {
            x_axis_title: Some("Date".to_owned()),
            y_axis_title: Some("Count".to_owned()),
            begin_at_zero: true,
            ..Default::default()
        },
    }
}

/// How well a student is being recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RateBand {
    /// 80% and above.
    Good,
    /// At least 50% but below 80%.
    Fair,
    /// Below 50%.
    Poor,
}

impl RateBand {
    pub fn of(success_rate: f64) -> Self {
        if success_rate >= 80.0 {
            RateBand::Good
        } else if success_rate >= 50.0 {
            RateBand::Fair
        } else {
            RateBand::Poor
        }
    }

    pub fn colors(self) -> ColorPair {
        match self {
            RateBand::Good => success_colors(),
            RateBand::Fair => warning_colors(),
            RateBand::Poor => danger_colors(),
        }
    }
}

/// One bar per student, coloured by that student's own success rate.
pub(super) fn student_success_chart_data(buckets: &[StudentRateBucket]) -> BarChartData {
    let colors: Vec<ColorPair> = buckets
        .iter()
        .map(|bucket| RateBand::of(bucket.success_rate).colors())
        .collect();

    BarChartData {
        labels: buckets
            .iter()
            .map(|bucket| bucket.student_name.clone())
            .collect(),
        datasets: vec![Dataset {
            label: "Success rate (%)".to_owned(),
            data: buckets.iter().map(|bucket| bucket.success_rate).collect(),
            fill: SeriesColor::PerPoint(colors.iter().map(|pair| pair.fill).collect()),
            border: SeriesColor::PerPoint(colors.iter().map(|pair| pair.border).collect()),
            border_width: BORDER_WIDTH,
        }],
        options: ChartOptions {
            x_axis_title: Some("Students".to_owned()),
            y_axis_title: Some("Rate (%)".to_owned()),
            begin_at_zero: true,
            y_max: Some(100.0),
            ..Default::default()
        },
    }
}

/// The split between successful and failed recognitions.
pub(super) fn recognition_share_chart_data(summary: &SummaryCounters) -> PieChartData {
    PieChartData {
        labels: vec!["Success".to_owned(), "Failed".to_owned()],
        data: vec![
            summary.successful_recognitions as f64,
            summary.failed_recognitions as f64,
        ],
        colors: vec![success_colors().border, danger_colors().border],
    }
}

/// An attendance record ready for the table.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TableRow {
    pub student_id: String,
    pub student_name: String,
    /// `None` if the API sent a timestamp that could not be parsed.
    pub timestamp: Option<OffsetDateTime>,
    /// The localized timestamp, or the raw text if it could not be parsed.
    pub display_timestamp: String,
    /// The calendar day in local time, `YYYY-MM-DD`.
    pub date: Option<String>,
    pub status: RecognitionStatus,
}

pub(super) fn table_rows(records: Vec<AttendanceRecord>, timezone: &Tz) -> Vec<TableRow> {
    records
        .into_iter()
        .map(|record| {
            let timestamp = parse_timestamp(&record.timestamp);
            if timestamp.is_none() {
                tracing::warn!(
                    "could not parse timestamp {:?} for student {}",
                    record.timestamp,
                    record.student_id
                );
            }

            let local = timestamp.map(|timestamp| (timestamp, offset_at(timezone, timestamp)));

            TableRow {
                display_timestamp: local
                    .map(|(timestamp, offset)| format_display_timestamp(timestamp, offset))
                    .unwrap_or_else(|| record.timestamp.clone()),
                date: local.map(|(timestamp, offset)| date_key(timestamp, offset)),
                timestamp,
                student_id: record.student_id,
                student_name: record.student_name,
                status: record.status,
            }
        })
        .collect()
}
