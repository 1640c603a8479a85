//! Summaries of the attendance log served by the log API.

use std::collections::{BTreeMap, HashSet};

use time::UtcOffset;

use crate::{
    attendance::{AttendanceRecord, DailyBucket, RecognitionStatus, StudentRateBucket, SummaryCounters},
    timestamp::{date_key, format_log_timestamp},
};

use super::log_file::LogEntry;

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    successful: u64,
    failed: u64,
}

impl Tally {
    fn add(&mut self, status: RecognitionStatus) {
        match status {
            RecognitionStatus::Success => self.successful += 1,
            RecognitionStatus::Failed => self.failed += 1,
        }
    }

    fn total(self) -> u64 {
        self.successful + self.failed
    }

    fn success_rate(self) -> f64 {
        success_rate(self.successful, self.total())
    }
}

/// `successful` as a percentage of `total`, rounded to two decimal places.
///
/// Zero when `total` is zero.
pub fn success_rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let rate = successful as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// The log entries as wire records, with timestamps as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn attendance_records(entries: &[LogEntry]) -> Vec<AttendanceRecord> {
    entries
        .iter()
        .map(|entry| AttendanceRecord {
            student_id: entry.student_id.clone(),
            student_name: entry.student_name.clone(),
            timestamp: format_log_timestamp(entry.timestamp),
            status: entry.status,
        })
        .collect()
}

/// The headline counters for the whole log. An empty log gives all zeros.
pub fn summarize(entries: &[LogEntry]) -> SummaryCounters {
    let mut tally = Tally::default();
    let mut students = HashSet::new();

    for entry in entries {
        tally.add(entry.status);
        students.insert(entry.student_id.as_str());
    }

    SummaryCounters {
        unique_students: students.len() as u64,
        successful_recognitions: tally.successful,
        failed_recognitions: tally.failed,
        success_rate: tally.success_rate(),
        total_records: entries.len() as u64,
    }
}

/// Successful and failed attempts per UTC calendar day, oldest day first.
pub fn attendance_by_date(entries: &[LogEntry]) -> Vec<DailyBucket> {
    let mut days: BTreeMap<String, Tally> = BTreeMap::new();

    for entry in entries {
        days.entry(date_key(entry.timestamp, UtcOffset::UTC))
            .or_default()
            .add(entry.status);
    }

    days.into_iter()
        .map(|(date, tally)| DailyBucket {
            date,
            successful: tally.successful,
            failed: tally.failed,
        })
        .collect()
}

/// The success rate of each (student ID, name) pair, ordered by ID then name.
///
/// A student logged under two names gets one bucket per name.
pub fn student_success_rates(entries: &[LogEntry]) -> Vec<StudentRateBucket> {
    let mut students: BTreeMap<(&str, &str), Tally> = BTreeMap::new();

    for entry in entries {
        students
            .entry((entry.student_id.as_str(), entry.student_name.as_str()))
            .or_default()
            .add(entry.status);
    }

    students
        .into_iter()
        .map(|((student_id, student_name), tally)| StudentRateBucket {
            student_id: student_id.to_owned(),
            student_name: student_name.to_owned(),
            successful: tally.successful,
            failed: tally.failed,
            total: tally.total(),
            success_rate: tally.success_rate(),
        })
        .collect()
}

#[cfg(test)]
mod aggregation_tests {
    use time::{OffsetDateTime, macros::datetime};

    use crate::attendance::RecognitionStatus;

    use super::{
        LogEntry, attendance_by_date, attendance_records, student_success_rates, success_rate,
        summarize,
    };

    fn entry(id: &str, name: &str, timestamp: OffsetDateTime, success: bool) -> LogEntry {
        LogEntry {
            student_id: id.to_owned(),
            student_name: name.to_owned(),
            timestamp,
            status: if success {
                RecognitionStatus::Success
            } else {
                RecognitionStatus::Failed
            },
        }
    }

    fn sample_log() -> Vec<LogEntry> {
        vec![
            entry("s2", "Binh", datetime!(2024-01-02 09:00 UTC), false),
            entry("s1", "An", datetime!(2024-01-01 10:00 UTC), true),
            entry("s1", "An", datetime!(2024-01-02 10:00 UTC), true),
            entry("s2", "Binh", datetime!(2024-01-02 11:00 UTC), true),
            entry("s3", "Chi", datetime!(2024-01-01 23:59:59 UTC), false),
            entry("s1", "An", datetime!(2024-01-03 08:00 UTC), false),
        ]
    }

    #[test]
    fn rate_is_rounded_to_two_decimals() {
        assert_eq!(success_rate(1, 3), 33.33);
        assert_eq!(success_rate(2, 3), 66.67);
        assert_eq!(success_rate(4, 4), 100.0);
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn summary_counts_statuses_and_distinct_students() {
        let summary = summarize(&sample_log());

        assert_eq!(summary.total_records, 6);
        assert_eq!(summary.successful_recognitions, 3);
        assert_eq!(summary.failed_recognitions, 3);
        assert_eq!(summary.unique_students, 3);
        assert_eq!(summary.success_rate, 50.0);
    }

    #[test]
    fn empty_log_summary_is_all_zeros() {
        let summary = summarize(&[]);

        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.successful_recognitions, 0);
        assert_eq!(summary.failed_recognitions, 0);
        assert_eq!(summary.unique_students, 0);
        assert_eq!(summary.success_rate, 0.0);
    }

    #[test]
    fn days_are_ascending_with_counts() {
        let days = attendance_by_date(&sample_log());

        let got: Vec<(&str, u64, u64)> = days
            .iter()
            .map(|day| (day.date.as_str(), day.successful, day.failed))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2024-01-01", 1, 1),
                ("2024-01-02", 2, 1),
                ("2024-01-03", 0, 1),
            ]
        );
    }

    #[test]
    fn students_are_sorted_with_rates() {
        let students = student_success_rates(&sample_log());

        assert_eq!(students.len(), 3);
        assert_eq!(students[0].student_id, "s1");
        assert_eq!(students[0].successful, 2);
        assert_eq!(students[0].failed, 1);
        assert_eq!(students[0].total, 3);
        assert_eq!(students[0].success_rate, 66.67);
        assert_eq!(students[1].student_id, "s2");
        assert_eq!(students[1].success_rate, 50.0);
        assert_eq!(students[2].student_name, "Chi");
        assert_eq!(students[2].success_rate, 0.0);
    }

    #[test]
    fn records_use_log_timestamp_format() {
        let records = attendance_records(&sample_log()[..1]);

        assert_eq!(records[0].timestamp, "2024-01-02 09:00:00");
        assert_eq!(records[0].status, RecognitionStatus::Failed);
    }
}
