use serde_json::Value;
use tracing::debug;

use crate::accession::AccessionAllocator;
use crate::domain::{CASE_TYPE, ContentKind, ProjectId, predict_content_kind};
use crate::error::SubmitError;
use crate::gateway::SubmissionClient;

/// Raw submission content plus its declared kind. Built once from the
/// uploaded text and consumed by one submission run.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub kind: ContentKind,
    pub content: String,
}

impl SubmissionPayload {
    pub fn new(content: String, hint: Option<ContentKind>) -> Self {
        let kind = predict_content_kind(&content, hint);
        Self { kind, content }
    }
}

/// Physical column positions for the logical fields the normalizer needs.
/// A header may mark required columns with a leading `*`; the starred name
/// wins over the plain one. Resolved once per payload, never per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldColumns {
    pub type_col: Option<usize>,
    pub project_col: Option<usize>,
    pub submitter_col: Option<usize>,
}

impl FieldColumns {
    pub fn resolve(header_fields: &[&str]) -> Self {
        let find = |name: &str| {
            let starred = format!("*{name}");
            header_fields
                .iter()
                .position(|field| *field == starred)
                .or_else(|| header_fields.iter().position(|field| *field == name))
        };
        Self {
            type_col: find("type"),
            project_col: find("project_id"),
            submitter_col: find("submitter_id"),
        }
    }
}

fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Rewrites the payload so every case record carries a submitter id,
/// generating missing ones through `allocator`. Records of other types and
/// cases that already have an id pass through unchanged.
pub fn normalize<S: SubmissionClient>(
    payload: &SubmissionPayload,
    target: &ProjectId,
    allocator: &mut AccessionAllocator,
    client: &S,
) -> Result<SubmissionPayload, SubmitError> {
    if payload.content.trim().is_empty() {
        return Err(SubmitError::EmptyPayload);
    }
    match payload.kind {
        ContentKind::Json => normalize_json(payload, target, allocator, client),
        ContentKind::Tsv => normalize_tsv(payload, allocator, client),
    }
}

fn normalize_json<S: SubmissionClient>(
    payload: &SubmissionPayload,
    target: &ProjectId,
    allocator: &mut AccessionAllocator,
    client: &S,
) -> Result<SubmissionPayload, SubmitError> {
    let mut record: Value =
        serde_json::from_str(&payload.content).map_err(|err| SubmitError::ParsePayload {
            kind: payload.kind.to_string(),
            message: err.to_string(),
        })?;

    let is_case = record.get("type").and_then(Value::as_str) == Some(CASE_TYPE);
    let has_id = record
        .get("submitter_id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty());

    if is_case && !has_id {
        let id = generate_for_record(allocator, client, target, || record.to_string())?;
        debug!(project = %target, submitter_id = %id, "assigned case submitter id");
        record["submitter_id"] = Value::String(id);
        return Ok(SubmissionPayload {
            kind: payload.kind,
            content: record.to_string(),
        });
    }

    Ok(payload.clone())
}

fn normalize_tsv<S: SubmissionClient>(
    payload: &SubmissionPayload,
    allocator: &mut AccessionAllocator,
    client: &S,
) -> Result<SubmissionPayload, SubmitError> {
    let lines = split_lines(&payload.content);
    let header = lines[0];
    let header_fields = header.split('\t').collect::<Vec<_>>();
    let columns = FieldColumns::resolve(&header_fields);

    let mut out = Vec::with_capacity(lines.len());
    out.push(header.to_string());

    for line in lines.iter().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let mut cells = line.split('\t').map(str::to_string).collect::<Vec<_>>();

        let row_type = columns.type_col.and_then(|col| cells.get(col));
        if row_type.map(String::as_str) != Some(CASE_TYPE) {
            out.push(line.to_string());
            continue;
        }
        let Some(submitter_col) = columns.submitter_col else {
            out.push(line.to_string());
            continue;
        };
        let has_id = cells.get(submitter_col).is_some_and(|id| !id.is_empty());
        if has_id {
            out.push(line.to_string());
            continue;
        }

        let project = columns
            .project_col
            .and_then(|col| cells.get(col))
            .ok_or_else(|| {
                SubmitError::GenerationFailed(format!("case row has no project id: {line}"))
            })?
            .parse::<ProjectId>()
            .map_err(|err| SubmitError::GenerationFailed(err.to_string()))?;

        let id = generate_for_record(allocator, client, &project, || line.to_string())?;
        debug!(project = %project, submitter_id = %id, "assigned case submitter id");
        if cells.len() <= submitter_col {
            cells.resize(submitter_col + 1, String::new());
        }
        cells[submitter_col] = id;
        out.push(cells.join("\t"));
    }

    Ok(SubmissionPayload {
        kind: payload.kind,
        content: format!("{}\n", out.join("\n")),
    })
}

fn generate_for_record<S: SubmissionClient>(
    allocator: &mut AccessionAllocator,
    client: &S,
    project: &ProjectId,
    render: impl FnOnce() -> String,
) -> Result<String, SubmitError> {
    match allocator.next_id(client, project) {
        Ok(id) => Ok(id),
        Err(SubmitError::MissingParentProject { project, .. }) => {
            Err(SubmitError::MissingParentProject {
                project,
                record: render(),
            })
        }
        Err(err) => Err(err),
    }
}
