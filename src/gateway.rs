use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{Value, json};

use crate::domain::{ContentKind, ProjectId, SubmitMethod};
use crate::error::SubmitError;

/// State of the most recent case record for a project, as resolved from the
/// remote service. `last_sequence` is the numeric tail of that record's
/// submitter id; `accession_prefix` is the parent project's dbGaP prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseLookup {
    pub last_sequence: u32,
    pub accession_prefix: String,
}

#[derive(Debug, Clone)]
pub struct ChunkResponse {
    pub status: u16,
    pub data: Value,
}

pub trait SubmissionClient: Send + Sync {
    /// Resolves the latest case for `project`. `Ok(None)` means the server
    /// answered but no case or no parent accession prefix exists, which is
    /// a recoverable no-data condition, not a transport error.
    fn latest_case(&self, project: &ProjectId) -> Result<Option<CaseLookup>, SubmitError>;

    fn upload_chunk(
        &self,
        project: &ProjectId,
        kind: ContentKind,
        method: SubmitMethod,
        body: &str,
    ) -> Result<ChunkResponse, SubmitError>;
}

#[derive(Clone)]
pub struct HttpSubmissionClient {
    client: Client,
    api_base: String,
    submission_base: String,
}

impl HttpSubmissionClient {
    pub fn new(api_base: &str, submission_base: &str) -> Result<Self, SubmitError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("commons-submit/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SubmitError::UploadHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| SubmitError::UploadHttp(err.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            submission_base: submission_base.trim_end_matches('/').to_string(),
        })
    }

    fn upload_url(&self, project: &ProjectId) -> String {
        if project.is_root_program() {
            format!("{}/", self.submission_base)
        } else {
            format!(
                "{}/{}/{}/",
                self.submission_base,
                project.program(),
                project.project()
            )
        }
    }
}

impl SubmissionClient for HttpSubmissionClient {
    fn latest_case(&self, project: &ProjectId) -> Result<Option<CaseLookup>, SubmitError> {
        let query = format!(
            "query {{ case(project_id: \"{}\", first: 1, order_by_desc: \"submitter_id\") \
             {{ id submitter_id projects {{ dbgap_accession_number }} }} }}",
            project.as_str()
        );
        let response = self
            .client
            .post(format!("{}/graphql/", self.api_base))
            .json(&json!({ "query": query, "variables": null }))
            .send()
            .map_err(|err| SubmitError::LookupHttp(err.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|err| SubmitError::LookupHttp(err.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(SubmitError::LookupStatus {
                status,
                message: text,
            });
        }
        let body: Value = serde_json::from_str(&text)
            .map_err(|err| SubmitError::LookupHttp(err.to_string()))?;

        parse_case_lookup(&body)
    }

    fn upload_chunk(
        &self,
        project: &ProjectId,
        kind: ContentKind,
        method: SubmitMethod,
        body: &str,
    ) -> Result<ChunkResponse, SubmitError> {
        let url = self.upload_url(project);
        let request = match method {
            SubmitMethod::Put => self.client.put(&url),
            SubmitMethod::Post => self.client.post(&url),
        };
        let response = request
            .header(reqwest::header::CONTENT_TYPE, kind.mime())
            .body(body.to_string())
            .send()
            .map_err(|err| SubmitError::UploadHttp(err.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|err| SubmitError::UploadHttp(err.to_string()))?;
        let data = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(ChunkResponse { status, data })
    }
}

/// Extracts the lookup result from a GraphQL response body. An empty case
/// list or a case with no parent accession prefix resolves to `None`. A
/// body carrying GraphQL errors or no data section is a failed query, not
/// a no-data condition, and a submitter id without a numeric four-digit
/// tail is a malformed response.
pub fn parse_case_lookup(body: &Value) -> Result<Option<CaseLookup>, SubmitError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages = errors
                .iter()
                .filter_map(|error| error.get("message").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            let messages = if messages.is_empty() {
                Value::Array(errors.clone()).to_string()
            } else {
                messages
            };
            return Err(SubmitError::GenerationFailed(format!(
                "lookup query failed: {messages}"
            )));
        }
    }
    let Some(data) = body.get("data").filter(|value| !value.is_null()) else {
        return Err(SubmitError::GenerationFailed(
            "lookup response has no data".to_string(),
        ));
    };

    let Some(case) = data.pointer("/case/0").filter(|value| !value.is_null()) else {
        return Ok(None);
    };

    let Some(prefix) = case
        .pointer("/projects/0/dbgap_accession_number")
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };

    let submitter_id = case
        .get("submitter_id")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            SubmitError::GenerationFailed("lookup response has no submitter_id".to_string())
        })?;
    let tail_start = submitter_id
        .char_indices()
        .rev()
        .nth(3)
        .map(|(index, _)| index)
        .unwrap_or(0);
    let last_sequence = submitter_id[tail_start..].parse::<u32>().map_err(|_| {
        SubmitError::GenerationFailed(format!(
            "submitter id {submitter_id} has no numeric 4-digit tail"
        ))
    })?;

    Ok(Some(CaseLookup {
        last_sequence,
        accession_prefix: prefix.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_lookup_success() {
        let body = json!({
            "data": {
                "case": [{
                    "id": "abc",
                    "submitter_id": "DB0007",
                    "projects": [{ "dbgap_accession_number": "DB" }]
                }]
            }
        });
        let lookup = parse_case_lookup(&body).unwrap().unwrap();
        assert_eq!(lookup.last_sequence, 7);
        assert_eq!(lookup.accession_prefix, "DB");
    }

    #[test]
    fn parse_lookup_no_case() {
        let body = json!({ "data": { "case": [] } });
        assert_eq!(parse_case_lookup(&body).unwrap(), None);
    }

    #[test]
    fn parse_lookup_graphql_errors_are_failures() {
        let body = json!({
            "errors": [{ "message": "unauthorized query" }],
            "data": null
        });
        let err = parse_case_lookup(&body).unwrap_err();
        assert_matches!(err, SubmitError::GenerationFailed(message) => {
            assert!(message.contains("unauthorized query"));
        });
    }

    #[test]
    fn parse_lookup_missing_data_is_a_failure() {
        let body = json!({ "message": "service unavailable" });
        let err = parse_case_lookup(&body).unwrap_err();
        assert_matches!(err, SubmitError::GenerationFailed(_));
    }

    #[test]
    fn parse_lookup_no_accession_prefix() {
        let body = json!({
            "data": {
                "case": [{ "id": "abc", "submitter_id": "DB0007", "projects": [] }]
            }
        });
        assert_eq!(parse_case_lookup(&body).unwrap(), None);
    }

    #[test]
    fn parse_lookup_malformed_tail() {
        let body = json!({
            "data": {
                "case": [{
                    "id": "abc",
                    "submitter_id": "DB-seven",
                    "projects": [{ "dbgap_accession_number": "DB" }]
                }]
            }
        });
        let err = parse_case_lookup(&body).unwrap_err();
        assert_matches!(err, SubmitError::GenerationFailed(_));
    }

    #[test]
    fn upload_url_layout() {
        let client = HttpSubmissionClient::new(
            "https://commons.example/api/v0/submission",
            "https://commons.example/api/v0/submission/",
        )
        .unwrap();

        let project: ProjectId = "PROG-proj".parse().unwrap();
        assert_eq!(
            client.upload_url(&project),
            "https://commons.example/api/v0/submission/PROG/proj/"
        );

        let root: ProjectId = "_root-any".parse().unwrap();
        assert_eq!(
            client.upload_url(&root),
            "https://commons.example/api/v0/submission/"
        );
    }
}
