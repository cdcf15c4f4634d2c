use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SubmitError;

/// Node type whose records receive generated submitter ids.
pub const CASE_TYPE: &str = "case";

/// Reserved program name that routes uploads to the API root path.
pub const ROOT_PROGRAM: &str = "_root";

fn project_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+-[A-Za-z0-9_.-]+$").unwrap())
}

/// A submission scope in `<program>-<project>` form, e.g. `PROG-proj`.
/// The project part may itself contain dashes; the program is everything
/// before the first one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn program(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    pub fn project(&self) -> &str {
        self.0.split_once('-').map(|(_, rest)| rest).unwrap_or("")
    }

    pub fn is_root_program(&self) -> bool {
        self.program() == ROOT_PROGRAM
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = SubmitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        if !project_id_pattern().is_match(&normalized) {
            return Err(SubmitError::InvalidProjectId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Tsv,
    Json,
}

impl ContentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentKind::Tsv => "text/tab-separated-values",
            ContentKind::Json => "application/json",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Tsv => write!(f, "tsv"),
            ContentKind::Json => write!(f, "json"),
        }
    }
}

/// Guesses the content kind from the raw text. Content evidence wins even
/// over an explicit hint: text opening with a JSON bracket is an object
/// graph, anything containing a tab is tabular. The hint (or TSV) only
/// breaks ties when the text itself is not decisive.
pub fn predict_content_kind(content: &str, hint: Option<ContentKind>) -> ContentKind {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return ContentKind::Json;
    }
    if content.contains('\t') {
        return ContentKind::Tsv;
    }
    hint.unwrap_or(ContentKind::Tsv)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMethod {
    Put,
    Post,
}

impl SubmitMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitMethod::Put => "PUT",
            SubmitMethod::Post => "POST",
        }
    }
}

impl fmt::Display for SubmitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
