use std::fs;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use commons_submitter::app::{App, SubmitOptions};
use commons_submitter::config::ConfigLoader;
use commons_submitter::domain::{ContentKind, ProjectId, SubmitMethod};
use commons_submitter::error::SubmitError;
use commons_submitter::gateway::HttpSubmissionClient;
use commons_submitter::output::{JsonOutput, SubmissionReport};
use commons_submitter::payload::SubmissionPayload;
use commons_submitter::upload::NoopTracker;

#[derive(Parser)]
#[command(name = "commons-submit")]
#[command(about = "Submit TSV/JSON payloads to a data-commons submission API")]
#[command(version, author)]
struct Cli {
    /// Target project in <program>-<project> form
    project: String,

    /// Path to the TSV or JSON file to submit
    file: String,

    #[arg(long)]
    config: Option<String>,

    /// Content kind to assume when the file itself is not decisive
    #[arg(long)]
    kind: Option<ContentKind>,

    /// Override the configured HTTP method (put replaces, post creates)
    #[arg(long)]
    method: Option<SubmitMethod>,

    /// Override the configured chunk bound; 0 or less disables chunking
    #[arg(long)]
    max_rows: Option<i64>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<SubmitError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SubmitError) -> u8 {
    match error {
        SubmitError::InvalidProjectId(_)
        | SubmitError::MissingConfig
        | SubmitError::ConfigRead(_)
        | SubmitError::ConfigParse(_) => 2,
        SubmitError::LookupHttp(_)
        | SubmitError::LookupStatus { .. }
        | SubmitError::UploadHttp(_)
        | SubmitError::ChunkUpload { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    let project: ProjectId = cli.project.parse()?;
    let content = fs::read_to_string(&cli.file).map_err(|err| SubmitError::ParsePayload {
        kind: "file".to_string(),
        message: format!("{}: {err}", cli.file),
    })?;
    let payload = SubmissionPayload::new(content, cli.kind);

    let client = HttpSubmissionClient::new(&config.api_base, &config.submission_base)?;
    let app = App::new(client, NoopTracker);
    let options = SubmitOptions {
        method: cli.method.unwrap_or(config.method),
        max_rows_per_chunk: cli.max_rows.unwrap_or(config.max_rows_per_chunk),
    };

    let outcome = app.submit(&project, &payload, options)?;
    let report = SubmissionReport::from_outcome(outcome);
    JsonOutput::print_report(&report).into_diagnostic()?;
    Ok(())
}
