use std::fs;

use assert_matches::assert_matches;

use commons_submitter::config::{ConfigLoader, DEFAULT_MAX_ROWS_PER_CHUNK};
use commons_submitter::domain::SubmitMethod;
use commons_submitter::error::SubmitError;

#[test]
fn load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commons-submit.json");
    fs::write(
        &path,
        r#"{
            "api_base": "https://commons.example/api/v0/submission/",
            "max_rows_per_chunk": 1000,
            "method": "post"
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(
        resolved.api_base,
        "https://commons.example/api/v0/submission"
    );
    assert_eq!(resolved.submission_base, resolved.api_base);
    assert_eq!(resolved.max_rows_per_chunk, 1000);
    assert_eq!(resolved.method, SubmitMethod::Post);
}

#[test]
fn defaults_applied_when_fields_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minimal.json");
    fs::write(&path, r#"{ "api_base": "https://commons.example/api" }"#).unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(resolved.max_rows_per_chunk, DEFAULT_MAX_ROWS_PER_CHUNK);
    assert_eq!(resolved.method, SubmitMethod::Put);
}

#[test]
fn explicit_path_must_exist() {
    let err = ConfigLoader::resolve(Some("/nonexistent/commons-submit.json")).unwrap_err();
    assert_matches!(err, SubmitError::ConfigRead(_));
}

#[test]
fn malformed_config_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, SubmitError::ConfigParse(_));
}
