use std::collections::HashMap;

use tracing::debug;

use crate::domain::ProjectId;
use crate::error::SubmitError;
use crate::gateway::{CaseLookup, SubmissionClient};

const SEQUENCE_LIMIT: u32 = 9999;

/// Per-run allocator of case submitter ids. Memoizes one server lookup per
/// project and hands out contiguous sequence numbers above the last known
/// server-side id. Scoped to a single submission run; concurrent runs each
/// build their own allocator so lookup state is never shared between them.
#[derive(Debug, Default)]
pub struct AccessionAllocator {
    lookups: HashMap<ProjectId, CaseLookup>,
    offsets: HashMap<ProjectId, u32>,
}

impl AccessionAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next free submitter id for `project`. The first call per
    /// project queries the server; later calls reuse the cached base, so N
    /// generations for one project cost one lookup and yield N distinct
    /// sequential ids. Failed lookups are not cached and will be re-queried.
    pub fn next_id<S: SubmissionClient>(
        &mut self,
        client: &S,
        project: &ProjectId,
    ) -> Result<String, SubmitError> {
        let lookup = match self.lookups.get(project) {
            Some(lookup) => lookup.clone(),
            None => {
                let resolved = match client.latest_case(project) {
                    Ok(Some(lookup)) => lookup,
                    Ok(None) => {
                        return Err(SubmitError::MissingParentProject {
                            project: project.to_string(),
                            record: String::new(),
                        });
                    }
                    Err(err @ SubmitError::GenerationFailed(_)) => return Err(err),
                    Err(err) => return Err(SubmitError::GenerationFailed(err.to_string())),
                };
                debug!(
                    project = %project,
                    last_sequence = resolved.last_sequence,
                    prefix = %resolved.accession_prefix,
                    "resolved case lookup"
                );
                self.lookups.insert(project.clone(), resolved.clone());
                resolved
            }
        };

        let offset = self.offsets.entry(project.clone()).or_insert(0);
        *offset += 1;
        let sequence = lookup.last_sequence + *offset;
        if sequence > SEQUENCE_LIMIT {
            // Four digits is a hard format limit; refuse rather than wrap.
            return Err(SubmitError::SequenceOverflow {
                project: project.to_string(),
                value: u64::from(sequence),
            });
        }

        Ok(format!("{}{:04}", lookup.accession_prefix, sequence))
    }
}
