//! Re-syncing the attendance log from its upstream source.

use std::{convert::Infallible, fmt, path::PathBuf, str::FromStr};

use reqwest::Client;

use crate::Error;

use super::log_file::AttendanceLog;

/// Where the latest attendance log is copied from on refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    /// A CSV file on this machine, e.g. one synced by the recognition service.
    File(PathBuf),
    /// A CSV file served over HTTP(S).
    Url(String),
}

impl FromStr for LogSource {
    type Err = Infallible;

    /// Anything starting with `http://` or `https://` is a URL, everything else is a path.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Ok(LogSource::Url(source.to_owned()))
        } else {
            Ok(LogSource::File(PathBuf::from(source)))
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::File(path) => write!(f, "{}", path.display()),
            LogSource::Url(url) => write!(f, "{url}"),
        }
    }
}

impl LogSource {
    /// Fetch the latest log.
    ///
    /// # Errors
    /// Returns [Error::LogDownload] if the file could not be read, the request
    /// failed or the server answered with an error status.
    pub async fn fetch(&self, client: &Client) -> Result<Vec<u8>, Error> {
        match self {
            LogSource::File(path) => tokio::fs::read(path).await.map_err(|error| {
                Error::LogDownload(format!("could not read {}: {error}", path.display()))
            }),
            LogSource::Url(url) => {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map_err(|error| Error::LogDownload(error.to_string()))?;

                response
                    .bytes()
                    .await
                    .map(|bytes| bytes.to_vec())
                    .map_err(|error| Error::LogDownload(error.to_string()))
            }
        }
    }
}

/// Copy the latest log from `source` over `log`.
///
/// # Errors
/// Returns [Error::NoLogSource] if `source` is `None`, otherwise any error
/// from [LogSource::fetch] or [AttendanceLog::replace].
pub async fn refresh_log(
    log: &AttendanceLog,
    source: Option<&LogSource>,
    client: &Client,
) -> Result<(), Error> {
    let source = source.ok_or(Error::NoLogSource)?;
    tracing::info!("refreshing attendance log from {source}");

    let contents = source.fetch(client).await?;
    log.replace(&contents).await?;

    tracing::info!(
        "attendance log {} refreshed ({} bytes)",
        log.path().display(),
        contents.len()
    );

    Ok(())
}

#[cfg(test)]
mod refresh_tests {
    use std::path::PathBuf;

    use reqwest::Client;

    use crate::{Error, log_api::log_file::AttendanceLog, test_utils::TempLog};

    use super::{LogSource, refresh_log};

    const LOG_TEXT: &str = "student_id,student_name,timestamp,status\n\
                            s1,An,2024-01-01 10:00:00,1\n\
                            s2,Binh,2024-01-02 09:00:00,0\n";

    #[test]
    fn parses_urls_and_paths() {
        assert_eq!(
            "https://example.com/log.csv".parse::<LogSource>(),
            Ok(LogSource::Url("https://example.com/log.csv".to_owned()))
        );
        assert_eq!(
            "http://127.0.0.1:8000/log.csv".parse::<LogSource>(),
            Ok(LogSource::Url("http://127.0.0.1:8000/log.csv".to_owned()))
        );
        assert_eq!(
            "artifacts/log.csv".parse::<LogSource>(),
            Ok(LogSource::File(PathBuf::from("artifacts/log.csv")))
        );
    }

    #[tokio::test]
    async fn copies_file_source_over_log() {
        let source = TempLog::with_contents("refresh-source", LOG_TEXT);
        let target = TempLog::in_new_directory("refresh-target");
        let log = AttendanceLog::new(target.path());

        refresh_log(
            &log,
            Some(&LogSource::File(source.path().to_owned())),
            &Client::new(),
        )
        .await
        .unwrap();

        assert_eq!(log.read().await.len(), 2);
    }

    #[tokio::test]
    async fn fails_without_source() {
        let log = AttendanceLog::new(TempLog::unused_path("refresh-no-source"));

        let result = refresh_log(&log, None, &Client::new()).await;

        assert_eq!(result, Err(Error::NoLogSource));
    }

    #[tokio::test]
    async fn missing_source_file_is_a_download_error() {
        let log = AttendanceLog::new(TempLog::unused_path("refresh-missing-target"));
        let source = LogSource::File(TempLog::unused_path("refresh-missing-source"));

        let result = refresh_log(&log, Some(&source), &Client::new()).await;

        assert!(matches!(result, Err(Error::LogDownload(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn unreachable_url_is_a_download_error() {
        let log = AttendanceLog::new(TempLog::unused_path("refresh-unreachable"));
        // Port 9 (discard) is not expected to accept HTTP connections.
        let source = LogSource::Url("http://127.0.0.1:9/log.csv".to_owned());

        let result = refresh_log(&log, Some(&source), &Client::new()).await;

        assert!(matches!(result, Err(Error::LogDownload(_))), "got {result:?}");
    }
}
