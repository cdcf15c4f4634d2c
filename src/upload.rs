use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{ContentKind, ProjectId, SubmitMethod};
use crate::error::SubmitError;
use crate::gateway::{ChunkResponse, SubmissionClient};

/// Aggregated result of one submission run: the status and body of the last
/// chunk's response plus how many chunks were sent.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub status: u16,
    pub data: Value,
    pub chunk_count: usize,
}

/// Collaborator notified after every network response, so an external
/// session monitor can treat uploads as user activity.
pub trait ActivityTracker {
    fn record_activity(&self);
}

pub struct NoopTracker;

impl ActivityTracker for NoopTracker {
    fn record_activity(&self) {}
}

/// Sends chunks strictly in order. Chunk `i + 1` is not issued until chunk
/// `i`'s response has been received; the server may depend on successive
/// writes to one project landing in submission order. The first failed or
/// non-success response aborts the rest of the queue; chunks already sent
/// stay applied on the server and are reported through the error.
pub fn upload_chunks<S: SubmissionClient>(
    client: &S,
    tracker: &dyn ActivityTracker,
    project: &ProjectId,
    kind: ContentKind,
    method: SubmitMethod,
    chunks: &[String],
) -> Result<UploadOutcome, SubmitError> {
    let Some((final_chunk, leading)) = chunks.split_last() else {
        return Err(SubmitError::EmptyPayload);
    };

    let total = chunks.len();
    for (index, chunk) in leading.iter().enumerate() {
        send_chunk(client, tracker, project, kind, method, chunk, index, total)?;
    }
    let last = send_chunk(
        client,
        tracker,
        project,
        kind,
        method,
        final_chunk,
        total - 1,
        total,
    )?;
    Ok(UploadOutcome {
        status: last.status,
        data: last.data,
        chunk_count: total,
    })
}

#[allow(clippy::too_many_arguments)]
fn send_chunk<S: SubmissionClient>(
    client: &S,
    tracker: &dyn ActivityTracker,
    project: &ProjectId,
    kind: ContentKind,
    method: SubmitMethod,
    chunk: &str,
    index: usize,
    total: usize,
) -> Result<ChunkResponse, SubmitError> {
    let response = client.upload_chunk(project, kind, method, chunk);
    tracker.record_activity();
    let response = response?;
    debug!(
        project = %project,
        chunk = index + 1,
        total,
        status = response.status,
        "chunk uploaded"
    );
    if !(200..300).contains(&response.status) {
        warn!(
            project = %project,
            sent = index + 1,
            total,
            status = response.status,
            "aborting remaining chunks"
        );
        return Err(SubmitError::ChunkUpload {
            status: response.status,
            sent: index + 1,
            total,
            message: response.data.to_string(),
        });
    }
    Ok(response)
}
