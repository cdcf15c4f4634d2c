use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SubmitError {
    #[error("invalid project id: {0}")]
    InvalidProjectId(String),

    #[error("failed to parse {kind} payload: {message}")]
    ParsePayload { kind: String, message: String },

    #[error("no parent project found for case in {project}: {record}")]
    MissingParentProject { project: String, record: String },

    #[error("submitter id generation failed: {0}")]
    GenerationFailed(String),

    #[error("accession sequence for {project} reached {value}, past the 4-digit limit")]
    SequenceOverflow { project: String, value: u64 },

    #[error("nothing to submit")]
    EmptyPayload,

    #[error("chunk {sent} of {total} failed with status {status}: {message}")]
    ChunkUpload {
        status: u16,
        sent: usize,
        total: usize,
        message: String,
    },

    #[error("case lookup request failed: {0}")]
    LookupHttp(String),

    #[error("case lookup returned status {status}: {message}")]
    LookupStatus { status: u16, message: String },

    #[error("submission request failed: {0}")]
    UploadHttp(String),

    #[error("missing config file commons-submit.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}
