//! A scripted [AttendanceApi] for controller and handler tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use tokio::sync::Notify;

use crate::{
    Error,
    api_client::AttendanceApi,
    attendance::{
        ApiResponse, AttendanceRecord, DailyBucket, RecognitionStatus, RefreshResponse,
        StudentRateBucket, SummaryCounters,
    },
};

type Scripted<T> = Result<ApiResponse<T>, Error>;

struct Responses {
    attendance_data: Scripted<Vec<AttendanceRecord>>,
    summary: Scripted<SummaryCounters>,
    by_date: Scripted<Vec<DailyBucket>>,
    student_success: Scripted<Vec<StudentRateBucket>>,
    refresh: Result<RefreshResponse, Error>,
}

/// Lets a test hold a refresh request open until it calls [RefreshGate::release].
#[derive(Clone, Default)]
pub(crate) struct RefreshGate {
    requested: Arc<Notify>,
    released: Arc<Notify>,
}

impl RefreshGate {
    pub(crate) async fn wait_until_requested(&self) {
        self.requested.notified().await;
    }

    pub(crate) fn release(&self) {
        self.released.notify_one();
    }
}

/// Answers every call with the response set for it, and counts the fetches.
///
/// Clones share their responses, so a test can keep a handle and change the
/// script after the API has been handed to a controller.
#[derive(Clone)]
pub(crate) struct FakeApi {
    responses: Arc<Mutex<Responses>>,
    fetch_count: Arc<AtomicUsize>,
    refresh_gate: Arc<Mutex<Option<RefreshGate>>>,
}

impl FakeApi {
    /// An API where every endpoint succeeds with the sample data.
    pub(crate) fn healthy() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Responses {
                attendance_data: Ok(ApiResponse::success(sample_records())),
                summary: Ok(ApiResponse::success(sample_summary())),
                by_date: Ok(ApiResponse::success(sample_daily_buckets())),
                student_success: Ok(ApiResponse::success(sample_student_rates())),
                refresh: Ok(ApiResponse {
                    status: Some("success".to_owned()),
                    data: None,
                    message: Some("Data refreshed successfully".to_owned()),
                    file_path: Some("data/attendance_log.csv".to_owned()),
                }),
            })),
            fetch_count: Arc::new(AtomicUsize::new(0)),
            refresh_gate: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn set_attendance_data(&self, response: Scripted<Vec<AttendanceRecord>>) {
        self.responses.lock().unwrap().attendance_data = response;
    }

    pub(crate) fn set_summary(&self, response: Scripted<SummaryCounters>) {
        self.responses.lock().unwrap().summary = response;
    }

    pub(crate) fn set_by_date(&self, response: Scripted<Vec<DailyBucket>>) {
        self.responses.lock().unwrap().by_date = response;
    }

    pub(crate) fn set_student_success(&self, response: Scripted<Vec<StudentRateBucket>>) {
        self.responses.lock().unwrap().student_success = response;
    }

    pub(crate) fn set_refresh(&self, response: Result<RefreshResponse, Error>) {
        self.responses.lock().unwrap().refresh = response;
    }

    /// Make the next refresh calls wait for the returned gate.
    pub(crate) fn hold_refresh(&self) -> RefreshGate {
        let gate = RefreshGate::default();
        *self.refresh_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// The number of GET requests made so far.
    pub(crate) fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn fetched<T: Clone>(&self, select: impl FnOnce(&Responses) -> &Scripted<T>) -> Scripted<T> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let responses = self.responses.lock().unwrap();
        select(&*responses).clone()
    }
}

impl AttendanceApi for FakeApi {
    async fn attendance_data(&self) -> Result<ApiResponse<Vec<AttendanceRecord>>, Error> {
        self.fetched(|responses| &responses.attendance_data)
    }

    async fn attendance_summary(&self) -> Result<ApiResponse<SummaryCounters>, Error> {
        self.fetched(|responses| &responses.summary)
    }

    async fn attendance_by_date(&self) -> Result<ApiResponse<Vec<DailyBucket>>, Error> {
        self.fetched(|responses| &responses.by_date)
    }

    async fn student_success_rate(&self) -> Result<ApiResponse<Vec<StudentRateBucket>>, Error> {
        self.fetched(|responses| &responses.student_success)
    }

    async fn refresh(&self) -> Result<RefreshResponse, Error> {
        let gate = self.refresh_gate.lock().unwrap().clone();

        if let Some(gate) = gate {
            gate.requested.notify_one();
            gate.released.notified().await;
        }

        self.responses.lock().unwrap().refresh.clone()
    }
}

pub(crate) fn sample_records() -> Vec<AttendanceRecord> {
    vec![
        AttendanceRecord {
            student_id: "s1".to_owned(),
            student_name: "An".to_owned(),
            timestamp: "2024-01-01T10:00Z".to_owned(),
            status: RecognitionStatus::Success,
        },
        AttendanceRecord {
            student_id: "s2".to_owned(),
            student_name: "Binh".to_owned(),
            timestamp: "2024-01-02T09:00Z".to_owned(),
            status: RecognitionStatus::Failed,
        },
    ]
}

pub(crate) fn sample_summary() -> SummaryCounters {
    SummaryCounters {
        unique_students: 5,
        successful_recognitions: 40,
        failed_recognitions: 10,
        success_rate: 80.0,
        total_records: 50,
    }
}

pub(crate) fn sample_daily_buckets() -> Vec<DailyBucket> {
    vec![
        DailyBucket {
            date: "2024-01-01".to_owned(),
            successful: 25,
            failed: 5,
        },
        DailyBucket {
            date: "2024-01-02".to_owned(),
            successful: 15,
            failed: 5,
        },
    ]
}

pub(crate) fn sample_student_rates() -> Vec<StudentRateBucket> {
    vec![
        StudentRateBucket {
            student_id: "s1".to_owned(),
            student_name: "An".to_owned(),
            successful: 9,
            failed: 1,
            total: 10,
            success_rate: 90.0,
        },
        StudentRateBucket {
            student_id: "s2".to_owned(),
            student_name: "Binh".to_owned(),
            successful: 3,
            failed: 7,
            total: 10,
            success_rate: 30.0,
        },
    ]
}
