//! Runs one fallible job per input document, collecting failures instead of
//! stopping at the first one.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A failed batch item, identified by its input (usually a file path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{item}: {message}")]
pub struct BatchItemError {
    pub item: String,
    pub message: String,
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<T> {
    pub succeeded: Vec<(String, T)>,
    pub failed: Vec<BatchItemError>,
}

impl<T> BatchReport<T> {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Done. OK: n  Failed: m`
    pub fn summary(&self) -> String {
        format!(
            "Done. OK: {}  Failed: {}",
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

/// Runs `process` for every item. An `Err` is recorded against its item and
/// the remaining items still run.
pub fn run_batch<I, S, T, E, F>(items: I, mut process: F) -> BatchReport<T>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    E: fmt::Display,
    F: FnMut(&str) -> Result<T, E>,
{
    let mut report = BatchReport {
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    for item in items {
        let item = item.as_ref();
        match process(item) {
            Ok(value) => {
                log::debug!("batch item {item} ok");
                report.succeeded.push((item.to_string(), value));
            }
            Err(e) => {
                log::warn!("batch item {item} failed: {e}");
                report.failed.push(BatchItemError {
                    item: item.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    report
}
