//! Scratch attendance log files for tests.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// A file under the system temp directory that is removed on drop.
///
/// Names include the process ID and a counter so tests can run in parallel.
pub(crate) struct TempLog {
    path: PathBuf,
    directory: Option<PathBuf>,
}

impl TempLog {
    /// A path that no test has written to.
    pub(crate) fn unused_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(unique_name(name, "csv"))
    }

    /// A log file holding `contents`.
    #[track_caller]
    pub(crate) fn with_contents(name: &str, contents: &str) -> Self {
        let path = Self::unused_path(name);
        std::fs::write(&path, contents).expect("could not write temp log");

        Self {
            path,
            directory: None,
        }
    }

    /// A path inside a directory that does not exist yet.
    pub(crate) fn in_new_directory(name: &str) -> Self {
        let directory = std::env::temp_dir().join(unique_name(name, "d"));

        Self {
            path: directory.join("attendance_log.csv"),
            directory: Some(directory),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempLog {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);

        if let Some(directory) = &self.directory {
            let _ = std::fs::remove_dir_all(directory);
        }
    }
}

fn unique_name(name: &str, extension: &str) -> String {
    format!(
        "attendance-dashboard-{name}-{}-{}.{extension}",
        std::process::id(),
        NEXT_ID.fetch_add(1, Ordering::SeqCst)
    )
}
