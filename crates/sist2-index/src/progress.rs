//! Progress reporting to a supervising process.
//!
//! Enrichment scripts are run under a supervisor (sist2-admin) that scrapes
//! their stdout for lines starting with [`PROGRESS_MARKER`] and shows them in
//! its Tasks page.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// Line prefix the supervisor greps for on our stdout.
pub const PROGRESS_MARKER: &str = "$PROGRESS";

/// One progress update for the supervising process.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressReport {
    /// Files processed so far.
    pub done: u64,
    /// Total files to process, including those already done.
    pub count: u64,
    /// Whether the script is still discovering files to process.
    pub waiting: bool,
}

impl ProgressReport {
    /// Render the line exactly as the supervisor parses it.
    pub fn to_line(&self) -> String {
        let payload = serde_json::to_string(self).unwrap_or_default();
        format!("{} {}", PROGRESS_MARKER, payload)
    }

    /// Write the line to stdout and flush immediately.
    ///
    /// The supervisor expects near-real-time updates, so each call is one
    /// discrete, flushed line. Write failures are ignored: reporting must
    /// never abort the script doing the actual work.
    pub fn emit(&self) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", self.to_line());
        let _ = stdout.flush();
    }
}

/// Report progress to the supervising process.
pub fn print_progress(done: u64, count: u64, waiting: bool) {
    ProgressReport {
        done,
        count,
        waiting,
    }
    .emit();
}
