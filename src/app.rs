use tracing::info;

use crate::accession::AccessionAllocator;
use crate::chunk::split_chunks;
use crate::domain::{ProjectId, SubmitMethod};
use crate::error::SubmitError;
use crate::gateway::SubmissionClient;
use crate::payload::{SubmissionPayload, normalize};
use crate::upload::{ActivityTracker, UploadOutcome, upload_chunks};

#[derive(Debug, Clone, Copy)]
pub struct SubmitOptions {
    pub method: SubmitMethod,
    pub max_rows_per_chunk: i64,
}

/// One submission pipeline over a concrete transport and activity tracker.
/// Every `submit` call is an independent run with its own allocator, so two
/// runs never share lookup state.
pub struct App<S: SubmissionClient, T: ActivityTracker> {
    client: S,
    tracker: T,
}

impl<S: SubmissionClient, T: ActivityTracker> App<S, T> {
    pub fn new(client: S, tracker: T) -> Self {
        Self { client, tracker }
    }

    pub fn client(&self) -> &S {
        &self.client
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn submit(
        &self,
        project: &ProjectId,
        payload: &SubmissionPayload,
        options: SubmitOptions,
    ) -> Result<UploadOutcome, SubmitError> {
        info!(project = %project, kind = %payload.kind, "starting submission run");

        let mut allocator = AccessionAllocator::new();
        let normalized = normalize(payload, project, &mut allocator, &self.client)?;
        let chunks = split_chunks(&normalized, options.max_rows_per_chunk);
        info!(project = %project, chunks = chunks.len(), "payload normalized");

        let outcome = upload_chunks(
            &self.client,
            &self.tracker,
            project,
            normalized.kind,
            options.method,
            &chunks,
        )?;
        info!(
            project = %project,
            status = outcome.status,
            chunks = outcome.chunk_count,
            "submission run complete"
        );
        Ok(outcome)
    }
}
