//! `wes-logschema` - validate WES structured logs from the command line
//!
//! ## Commands
//!
//! - `validate-run`: validate a run document (bare `RunLog` or full run response)
//! - `validate-task`: validate a task, optionally inheriting a run's `log_schema`
//! - `demo`: walk through the built-in validation scenarios
//! - `example`: print an example `RunLog` API response
//! - `fetch`: download the schema document behind a `schema_uri`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use logschema_core::{
    render_outcome, render_report_md, write_report_json, FetchConfig, LogFormat, LogSchema,
    RecordPosition, ReportEntry, RunLog, RunResponse, SchemaFetcher, TaskLog, ValidationOutcome,
    ValidationReport, Validator, FETCH_TIMEOUT_ENV,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "wes-logschema")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate WES structured_log payloads against their log_schema", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run document and any task logs it carries
    ValidateRun {
        /// Path to a RunLog or run response JSON document
        file: PathBuf,

        /// Write a JSON validation report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print a Markdown summary instead of one line per record
        #[arg(long)]
        markdown: bool,
    },

    /// Validate a single task document
    ValidateTask {
        /// Path to a TaskLog JSON document
        file: PathBuf,

        /// Run document whose log_schema the task inherits
        #[arg(long)]
        parent: Option<PathBuf>,
    },

    /// Run the built-in validation scenarios
    Demo,

    /// Print an example RunLog API response
    Example,

    /// Fetch the schema document referenced by a schema URI
    Fetch {
        /// Absolute HTTP(S) schema URI
        #[arg(long)]
        uri: String,

        /// Request timeout in seconds
        #[arg(long, env = FETCH_TIMEOUT_ENV, default_value = "10")]
        timeout_secs: u64,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    logschema_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::ValidateRun {
            file,
            report,
            markdown,
        } => cmd_validate_run(&file, report.as_deref(), markdown),
        Commands::ValidateTask { file, parent } => cmd_validate_task(&file, parent.as_deref()),
        Commands::Demo => cmd_demo(),
        Commands::Example => cmd_example(),
        Commands::Fetch {
            uri,
            timeout_secs,
            output,
        } => cmd_fetch(&uri, timeout_secs, output.as_deref()).await,
    }
}

fn cmd_validate_run(file: &Path, report: Option<&Path>, markdown: bool) -> Result<()> {
    let doc = RunResponse::from_path(file)
        .with_context(|| format!("Failed to load run document {:?}", file))?;

    let labelled = labelled_outcomes(&Validator::new(), &doc);

    if !markdown {
        if labelled.is_empty() {
            println!("→ No structured_log present, skipped");
        }
        for (label, outcome) in &labelled {
            println!("{}", record_line(label, outcome));
        }
    }

    let report_artifact = ValidationReport::new(
        labelled
            .iter()
            .map(|(label, outcome)| ReportEntry::new(label.clone(), outcome))
            .collect(),
    );

    if markdown {
        print!("{}", render_report_md(&report_artifact));
    }

    if let Some(path) = report {
        write_report_json(path, &report_artifact)?;
        info!("Wrote validation report to {:?}", path);
    }

    if !report_artifact.summary.all_valid {
        bail!(
            "{} of {} structured log(s) failed validation",
            report_artifact.summary.invalid,
            report_artifact.summary.total
        );
    }
    Ok(())
}

/// Validate the run and its tasks, labelling each outcome after the run id,
/// the run name or `run`, with `/task[i]` appended for tasks.
fn labelled_outcomes(
    validator: &Validator,
    doc: &RunResponse,
) -> Vec<(String, ValidationOutcome)> {
    let run_label = doc
        .run_id
        .clone()
        .or_else(|| doc.run_log.name.clone())
        .unwrap_or_else(|| "run".to_string());

    validator
        .validate_run_with_tasks(&doc.run_log, &doc.task_logs)
        .into_iter()
        .map(|(position, outcome)| {
            let label = match position {
                RecordPosition::Run => run_label.clone(),
                RecordPosition::Task(i) => format!("{}/task[{}]", run_label, i),
            };
            (label, outcome)
        })
        .collect()
}

fn record_line(label: &str, outcome: &ValidationOutcome) -> String {
    format!("{}: {}", label, outcome)
}

fn cmd_validate_task(file: &Path, parent: Option<&Path>) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read task document {:?}", file))?;
    let task: TaskLog = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse task document {:?}", file))?;

    let parent_schema = match parent {
        Some(path) => RunResponse::from_path(path)
            .with_context(|| format!("Failed to load parent run document {:?}", path))?
            .run_log
            .log_schema,
        None => None,
    };

    match Validator::new().validate_task(&task, parent_schema.as_ref()) {
        None => {
            println!("→ No structured_log present, skipped");
            Ok(())
        }
        Some(outcome) => {
            if task.log_schema.is_none() {
                if let Some(schema) = &parent_schema {
                    println!("Inherited schema: {}", schema.schema_uri);
                }
            }
            print!("{}", render_outcome(&outcome));
            if !outcome.valid {
                bail!("task structured_log failed validation");
            }
            Ok(())
        }
    }
}

/// A named demonstration case.
struct Scenario {
    title: &'static str,
    outcome: Option<ValidationOutcome>,
    inherited_from: Option<String>,
}

fn demo_scenarios(validator: &Validator) -> Vec<Scenario> {
    let ro_crate_run = RunLog {
        start_time: Some("2024-01-01T10:00:00Z".to_string()),
        end_time: Some("2024-01-01T12:00:00Z".to_string()),
        exit_code: Some(0),
        ..RunLog::new("variant-calling-pipeline")
    }
    .with_structured_log(
        r##"{
            "@context": "https://w3id.org/ro/crate/1.1/context",
            "@graph": [
                {"@id": "./", "@type": "Dataset", "name": "variant-calling-pipeline run 001"},
                {
                    "@id": "#run-001",
                    "@type": "CreateAction",
                    "name": "WES Run 001",
                    "startTime": "2024-01-01T10:00:00Z",
                    "endTime": "2024-01-01T12:00:00Z"
                }
            ]
        }"##,
    )
    .with_log_schema(
        LogSchema::new("https://w3id.org/ro/crate/1.1")
            .with_format(LogFormat::RoCrate)
            .with_media_type("application/ld+json")
            .with_schema_version("1.1"),
    );

    let opm_run = RunLog {
        exit_code: Some(0),
        ..RunLog::new("genomic-alignment")
    }
    .with_structured_log(
        r#"{
            "wasGeneratedBy": {
                "id": "alignment-output-001",
                "activity": "bwa-mem2-align",
                "time": "2024-01-01T11:00:00Z"
            },
            "used": {"activity": "bwa-mem2-align", "entity": "sample-reads-001"},
            "agent": {"id": "user:researcher-01"}
        }"#,
    )
    .with_log_schema(LogSchema::new("https://www.w3.org/TR/prov-o/").with_format(LogFormat::Opm));

    let unschematised_run =
        RunLog::default().with_structured_log(r#"{"wasGeneratedBy": {"id": "run-002"}}"#);

    let parent_schema =
        LogSchema::new("https://w3id.org/ro/crate/1.1").with_format(LogFormat::RoCrate);
    let task = TaskLog {
        start_time: Some("2024-01-01T10:00:00Z".to_string()),
        end_time: Some("2024-01-01T10:30:00Z".to_string()),
        exit_code: Some(0),
        ..TaskLog::default()
    }
    .with_structured_log(
        r##"{
            "@context": "https://w3id.org/ro/crate/1.1/context",
            "@graph": [{"@id": "#task-bwa-001", "@type": "CreateAction", "name": "BWA-MEM2 task"}]
        }"##,
    );

    let malformed_run = RunLog::default()
        .with_structured_log("{this is not valid json")
        .with_log_schema(LogSchema::new("https://www.w3.org/TR/prov-o/").with_format(LogFormat::Opm));

    vec![
        Scenario {
            title: "RunLog with RO-Crate",
            outcome: validator.validate_run(&ro_crate_run),
            inherited_from: None,
        },
        Scenario {
            title: "RunLog with OPM",
            outcome: validator.validate_run(&opm_run),
            inherited_from: None,
        },
        Scenario {
            title: "Missing schema declaration",
            outcome: validator.validate_run(&unschematised_run),
            inherited_from: None,
        },
        Scenario {
            title: "TaskLog with schema inheritance",
            outcome: validator.validate_task(&task, Some(&parent_schema)),
            inherited_from: Some(parent_schema.schema_uri.clone()),
        },
        Scenario {
            title: "Malformed JSON",
            outcome: validator.validate_run(&malformed_run),
            inherited_from: None,
        },
    ]
}

fn cmd_demo() -> Result<()> {
    println!("WES Logging Schema validation demo\n");

    for (i, scenario) in demo_scenarios(&Validator::new()).iter().enumerate() {
        println!("Scenario {}: {}", i + 1, scenario.title);
        if let Some(uri) = &scenario.inherited_from {
            println!("  Inherited schema: {}", uri);
        }
        match &scenario.outcome {
            Some(outcome) => {
                for line in render_outcome(outcome).lines() {
                    println!("  {}", line);
                }
            }
            None => println!("  → No structured_log present, skipped"),
        }
        println!();
    }

    println!("Example API Response:");
    cmd_example()
}

fn example_run_log() -> RunLog {
    RunLog {
        start_time: Some("2024-01-01T10:00:00Z".to_string()),
        end_time: Some("2024-01-01T12:00:00Z".to_string()),
        exit_code: Some(0),
        stdout: Some("https://storage.example.com/stdout.txt".to_string()),
        ..RunLog::new("example-workflow")
    }
    .with_structured_log(r#"{"@context":"https://w3id.org/ro/crate/1.1/context","@graph":[]}"#)
    .with_log_schema(
        LogSchema::new("https://w3id.org/ro/crate/1.1")
            .with_format(LogFormat::RoCrate)
            .with_media_type("application/ld+json")
            .with_schema_version("1.1"),
    )
}

fn cmd_example() -> Result<()> {
    let json = serde_json::to_string_pretty(&example_run_log())
        .context("Failed to serialize example RunLog")?;
    println!("{}", json);
    Ok(())
}

async fn cmd_fetch(uri: &str, timeout_secs: u64, output: Option<&Path>) -> Result<()> {
    let config = FetchConfig::default().with_timeout(Duration::from_secs(timeout_secs));
    let fetcher = SchemaFetcher::new(config).context("Failed to build HTTP client")?;

    let body = fetcher
        .fetch_checked(&LogSchema::new(uri))
        .await
        .with_context(|| format!("Failed to fetch schema {}", uri))?;

    match output {
        Some(path) => {
            std::fs::write(path, &body).with_context(|| format!("Failed to write {:?}", path))?;
            info!("Wrote {} bytes to {:?}", body.len(), path);
        }
        None => println!("{}", String::from_utf8_lossy(&body)),
    }
    Ok(())
}
