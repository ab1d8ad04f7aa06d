use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;
use sqlinfer::{
  Config, SourceQuery,
  config::{parse_acronyms, parse_overrides},
  engine::postgres::PgEngine,
  orchestrator::generate,
};
use tokio::io::AsyncWriteExt;

use crate::ui::InferCommand;

#[derive(Debug, Clone)]
pub struct InferConfig {
  pub database_url: String,
  pub queries: PathBuf,
  pub output: Option<PathBuf>,
  pub config: Config,
}

impl InferConfig {
  pub fn from_command(command: InferCommand) -> anyhow::Result<Self> {
    let InferCommand {
      database_url,
      queries,
      output,
      package_path,
      type_overrides,
      acronyms,
      timeout,
      verbose: _,
      quiet: _,
    } = command;

    if package_path.trim().is_empty() {
      anyhow::bail!("Package path (--package-path) must not be empty");
    }
    let deadline = match timeout {
      Some(0) => anyhow::bail!("Timeout (--timeout) must be at least one second"),
      Some(secs) => Some(Duration::from_secs(secs)),
      None => None,
    };

    let config = Config::builder()
      .package_path(package_path)
      .overrides(parse_overrides(&type_overrides)?)
      .acronyms(parse_acronyms(&acronyms)?)
      .maybe_deadline(deadline)
      .build();

    Ok(Self {
      database_url,
      queries,
      output,
      config,
    })
  }
}

/// The query file handed over by the query parser.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QueryManifest {
  queries: Vec<SourceQuery>,
}

pub async fn load_manifest(path: &Path) -> anyhow::Result<Vec<SourceQuery>> {
  let contents = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("Failed to read query manifest {}", path.display()))?;
  parse_manifest(&contents).with_context(|| format!("Invalid query manifest {}", path.display()))
}

pub fn parse_manifest(contents: &str) -> anyhow::Result<Vec<SourceQuery>> {
  let mut de = serde_json::Deserializer::from_str(contents);
  let manifest: QueryManifest = serde_path_to_error::deserialize(&mut de)
    .map_err(|err| anyhow::anyhow!("{} (at {})", err.inner(), err.path()))?;

  if let Some(name) = manifest.queries.iter().map(|query| &query.name).duplicates().next() {
    anyhow::bail!("Duplicate query name '{name}'");
  }
  Ok(manifest.queries)
}

pub async fn write_output(path: Option<&Path>, json: &str) -> anyhow::Result<()> {
  let Some(path) = path else {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    return Ok(());
  };

  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::write(path, json)
    .await
    .with_context(|| format!("Failed to write {}", path.display()))
}

pub async fn infer_queries(config: InferConfig) -> anyhow::Result<()> {
  let queries = load_manifest(&config.queries).await?;
  log::info!("loaded {} queries from {}", queries.len(), config.queries.display());

  let engine = PgEngine::connect(&config.database_url)
    .await
    .context("Failed to connect to the database")?;
  let output = generate(engine, &config.config, &queries).await?;

  let json = serde_json::to_string_pretty(&output)?;
  write_output(config.output.as_deref(), &json).await?;
  if let Some(path) = &config.output {
    log::info!("wrote typed queries to {}", path.display());
  }
  Ok(())
}
