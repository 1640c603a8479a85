//! The attendance entities exchanged between the attendance API and the dashboard.
//!
//! Every type here is a wire type: the log API serializes it, the dashboard
//! deserializes it, and neither side keeps it around longer than one request.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The value of the `status` field on every successful API response.
pub const SUCCESS_STATUS: &str = "success";
/// The value of the `status` field on a failed API response.
pub const ERROR_STATUS: &str = "error";

/// Whether a face recognition attempt matched a student.
///
/// The log stores this as `1` for success and `0` for failure. Any value other
/// than `1` is read as a failure since the model has no partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecognitionStatus {
    /// No student was matched, `0` in the log.
    Failed,
    /// A student was matched, `1` in the log.
    Success,
}

impl RecognitionStatus {
    /// The integer code used in the log and on the wire.
    pub fn code(self) -> i64 {
        match self {
            RecognitionStatus::Failed => 0,
            RecognitionStatus::Success => 1,
        }
    }
}

impl From<i64> for RecognitionStatus {
    fn from(value: i64) -> Self {
        if value == 1 {
            RecognitionStatus::Success
        } else {
            RecognitionStatus::Failed
        }
    }
}

impl Serialize for RecognitionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for RecognitionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The log API may emit `1.0` if the CSV column was read as floats.
        let value = f64::deserialize(deserializer)?;

        Ok(if value == 1.0 {
            RecognitionStatus::Success
        } else {
            RecognitionStatus::Failed
        })
    }
}

/// A single recognition attempt from the attendance log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The student's ID, a string or a number depending on how the log was written.
    #[serde(deserialize_with = "string_or_number")]
    pub student_id: String,
    /// The student's display name.
    pub student_name: String,
    /// When the attempt happened, as an ISO-like datetime string.
    pub timestamp: String,
    /// Whether the attempt succeeded.
    pub status: RecognitionStatus,
}

/// The headline numbers for the whole log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCounters {
    /// The number of distinct student IDs in the log.
    pub unique_students: u64,
    /// The number of attempts with status 1.
    pub successful_recognitions: u64,
    /// The number of attempts with status 0.
    pub failed_recognitions: u64,
    /// Successful attempts as a percentage of all attempts, 0–100.
    pub success_rate: f64,
    /// The number of rows in the log.
    #[serde(default)]
    pub total_records: u64,
}

/// Successful and failed recognitions on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    /// The calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Attempts with status 1 on that day.
    pub successful: u64,
    /// Attempts with status 0 on that day.
    pub failed: u64,
}

/// The recognition success rate of one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRateBucket {
    /// The student's ID.
    #[serde(default, deserialize_with = "string_or_number")]
    pub student_id: String,
    /// The student's display name.
    pub student_name: String,
    /// Attempts with status 1.
    #[serde(default)]
    pub successful: u64,
    /// Attempts with status 0.
    #[serde(default)]
    pub failed: u64,
    /// All attempts.
    #[serde(default)]
    pub total: u64,
    /// Successful attempts as a percentage of all attempts, 0–100.
    pub success_rate: f64,
}

/// The envelope wrapped around every attendance API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// `"success"` on the happy path, anything else is an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// The payload, absent on errors.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A human readable message, usually only present on errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The path the log was written to, only sent by the refresh endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            status: Some(SUCCESS_STATUS.to_owned()),
            data: Some(data),
            message: None,
            file_path: None,
        }
    }

    /// A failed response carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some(ERROR_STATUS.to_owned()),
            data: None,
            message: Some(message.into()),
            file_path: None,
        }
    }

    /// Whether the status is "success". The payload may still be missing.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(SUCCESS_STATUS)
    }

    /// Take the payload out of a successful response.
    ///
    /// # Errors
    /// Returns [crate::Error::Application] with the payload's message, or
    /// `fallback_message` if there is none, when the status is not "success" or
    /// the payload is missing.
    pub fn into_data(self, fallback_message: &str) -> Result<T, crate::Error> {
        match (self.is_success(), self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(crate::Error::Application(
                self.message
                    .unwrap_or_else(|| fallback_message.to_owned()),
            )),
        }
    }

    /// Check that a response without a payload succeeded, returning its message.
    ///
    /// # Errors
    /// Returns [crate::Error::Application] when the status is not "success".
    pub fn into_acknowledgement(self, fallback_message: &str) -> Result<Option<String>, crate::Error> {
        if self.is_success() {
            Ok(self.message)
        } else {
            Err(crate::Error::Application(
                self.message
                    .unwrap_or_else(|| fallback_message.to_owned()),
            ))
        }
    }
}

/// The payload of the refresh endpoint, which carries no data.
pub type RefreshResponse = ApiResponse<serde_json::Value>;

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(text) => text,
        StringOrNumber::Integer(number) => number.to_string(),
        StringOrNumber::Float(number) => number.to_string(),
    })
}
