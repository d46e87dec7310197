use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use statusflow_source::{FsDefinitionProvider, Source, SourceConfig, SourceError};
use statusflow_workflow::{IdContext, Status, StatusId, WorkflowDefinition};

/// Statusflow - inspect and validate workflow status graphs
#[derive(Parser)]
#[command(name = "statusflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.statusflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Directory of workflow definition files (default: <data-dir>/workflows)
  #[arg(long, global = true)]
  definitions: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print a workflow with its statuses and transitions
  Show {
    workflow_id: String,

    /// Print the normalized definition as JSON
    #[arg(long)]
    json: bool,
  },

  /// List the transitions leaving a status
  Transitions {
    /// Status id, `workflowId/localId` or a local id with --workflow
    status_id: String,

    /// Workflow completing a local status id
    #[arg(long)]
    workflow: Option<String>,
  },

  /// Validate workflow definitions (default: every definition file)
  Check { workflow_ids: Vec<String> },
}

fn main() -> Result<ExitCode> {
  tracing_subscriber::registry()
    .with(EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| "statusflow=info".into()),
    ))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(data_dir) => data_dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".statusflow"),
  };
  let definitions_dir = cli
    .definitions
    .unwrap_or_else(|| data_dir.join("workflows"));

  match cli.command {
    Some(Commands::Show { workflow_id, json }) => {
      let source = open_source(&data_dir, &definitions_dir)?;
      show(&source, &workflow_id, json)?;
    }
    Some(Commands::Transitions {
      status_id,
      workflow,
    }) => {
      let source = open_source(&data_dir, &definitions_dir)?;
      transitions(&source, &status_id, workflow.as_deref())?;
    }
    Some(Commands::Check { workflow_ids }) => {
      return check(&data_dir, &definitions_dir, workflow_ids);
    }
    None => {
      println!("statusflow - use --help to see available commands");
    }
  }

  Ok(ExitCode::SUCCESS)
}

fn load_config(data_dir: &Path) -> Result<SourceConfig> {
  let path = data_dir.join("config.json");
  if !path.is_file() {
    return Ok(SourceConfig::default());
  }

  let content = fs::read_to_string(&path)
    .with_context(|| format!("failed to read config file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))
}

fn open_source(data_dir: &Path, definitions_dir: &Path) -> Result<Source> {
  let config = load_config(data_dir)?;
  debug!(definitions = %definitions_dir.display(), "opening workflow source");

  Source::builder(FsDefinitionProvider::new(definitions_dir))
    .config(config)
    .build()
    .context("failed to create workflow source")
}

fn show(source: &Source, workflow_id: &str, json: bool) -> Result<()> {
  if json {
    let definition = source
      .get_workflow_definition(workflow_id)
      .with_context(|| format!("failed to load workflow '{workflow_id}'"))?;
    println!("{}", serde_json::to_string_pretty(&*definition)?);
    return Ok(());
  }

  let Some(workflow) = source
    .get_workflow(workflow_id)
    .with_context(|| format!("failed to load workflow '{workflow_id}'"))?
  else {
    bail!("workflow '{workflow_id}' not found");
  };

  let definition = source.get_workflow_definition(workflow_id)?;

  println!("{}", workflow.id);
  println!("  initial: {}", workflow.initial_status_id);

  for status in source.get_all_statuses(workflow_id)? {
    for line in describe_status(source, &definition, &status) {
      println!("{line}");
    }
  }

  Ok(())
}

/// Lines printed by `show` for one status: the status, then one line per
/// outgoing transition. Targets that fail to resolve are reported on their
/// own line.
fn describe_status(source: &Source, definition: &WorkflowDefinition, status: &Status) -> Vec<String> {
  let mut lines = vec![format!("  {} ({})", status.id, status.label)];

  match source.transitions(&status.id) {
    Ok(transitions) => {
      for transition in transitions.iter() {
        lines.push(edge_line(transition.end_id(), transition.label()));
      }
    }
    Err(_) => {
      let targets = definition
        .status(&status.id)
        .map(|status| &status.transitions);
      for (end_id, config) in targets.into_iter().flatten() {
        match source.status(end_id) {
          Ok(_) => lines.push(edge_line(
            end_id,
            config.get("label").and_then(|label| label.as_str()),
          )),
          Err(e) => lines.push(format!("    -> {end_id} (unresolved: {})", error_chain(&e))),
        }
      }
    }
  }

  lines
}

fn edge_line(end_id: &StatusId, label: Option<&str>) -> String {
  match label {
    Some(label) => format!("    -> {end_id} [{label}]"),
    None => format!("    -> {end_id}"),
  }
}

fn transitions(source: &Source, status_id: &str, workflow_id: Option<&str>) -> Result<()> {
  let transitions = source
    .get_transitions(status_id, IdContext::from(workflow_id))
    .with_context(|| format!("failed to resolve transitions of '{status_id}'"))?;

  for transition in transitions.iter() {
    let end = &transition.end;
    match transition.label() {
      Some(label) => println!("{} ({}) [{label}]", end.id, end.label),
      None => println!("{} ({})", end.id, end.label),
    }
  }

  Ok(())
}

fn check(data_dir: &Path, definitions_dir: &Path, workflow_ids: Vec<String>) -> Result<ExitCode> {
  let provider = FsDefinitionProvider::new(definitions_dir);
  let workflow_ids = if workflow_ids.is_empty() {
    provider
      .workflow_ids()
      .context("failed to list workflow definitions")?
  } else {
    workflow_ids
  };
  let source = open_source(data_dir, definitions_dir)?;

  let mut failures = 0;
  for workflow_id in &workflow_ids {
    match source.get_workflow_definition(workflow_id) {
      Ok(definition) => {
        println!("ok      {workflow_id} ({} statuses)", definition.statuses.len());
      }
      Err(SourceError::Definition { source, .. }) => {
        failures += 1;
        println!("invalid {workflow_id}: {source}");
      }
      Err(e) => {
        failures += 1;
        println!("error   {workflow_id}: {}", error_chain(&e));
      }
    }
  }

  if failures > 0 {
    eprintln!("{failures} of {} workflows failed", workflow_ids.len());
    return Ok(ExitCode::FAILURE);
  }
  Ok(ExitCode::SUCCESS)
}

fn error_chain(error: &SourceError) -> String {
  let mut message = error.to_string();
  let mut source = std::error::Error::source(error);
  while let Some(cause) = source {
    message.push_str(": ");
    message.push_str(&cause.to_string());
    source = cause.source();
  }
  message
}
