use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::upload::UploadOutcome;

/// The one message reported to the caller after a run: the last chunk's
/// status and body plus the total chunk count.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub submit_status: u16,
    pub data: Value,
    pub total: usize,
    pub submitted_at: String,
}

impl SubmissionReport {
    pub fn from_outcome(outcome: UploadOutcome) -> Self {
        Self {
            submit_status: outcome.status,
            data: outcome.data,
            total: outcome.chunk_count,
            submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &SubmissionReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
