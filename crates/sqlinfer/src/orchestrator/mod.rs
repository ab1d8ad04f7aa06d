use std::{collections::BTreeSet, time::Duration};

use serde::Serialize;

use crate::{
  config::Config,
  engine::Engine,
  error::{Error, Result},
  inferrer::{Inferrer, SourceQuery, TypedQuery},
  target::TargetType,
};

/// Everything a renderer needs from one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
  /// Package that defines the synthesized declarations.
  pub package_path: String,
  pub queries: Vec<TypedQuery>,
  /// Synthesized enums and composites, dependencies first.
  pub declarations: Vec<TargetType>,
  /// Packages other than `package_path` that the typed queries refer to.
  pub imports: BTreeSet<String>,
  #[serde(skip)]
  pub stats: GenerationStats,
}

/// Statistics about one run, reported in the summary log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
  pub queries_typed: usize,
  pub enums_synthesized: usize,
  pub composites_synthesized: usize,
  /// Distinct catalog types looked up, builtins included.
  pub catalog_types_fetched: usize,
}

/// Drives one all-or-nothing generation run: every query is typed, or the run
/// fails with the first error and produces nothing.
pub struct Orchestrator<E: Engine> {
  inferrer: Inferrer<E>,
  deadline: Option<Duration>,
}

impl<E: Engine> Orchestrator<E> {
  pub fn new(engine: E, config: &Config) -> Self {
    Self {
      inferrer: Inferrer::new(engine, config),
      deadline: config.deadline,
    }
  }

  /// Types every query in order over the orchestrator's engine.
  ///
  /// # Errors
  ///
  /// Returns the first inference or resolution error, or
  /// [`Error::DeadlineExceeded`] when the configured deadline passes first.
  pub async fn run(mut self, queries: &[SourceQuery]) -> Result<GenerationOutput> {
    let typed = match self.deadline {
      Some(deadline) => tokio::time::timeout(deadline, self.infer_all(queries))
        .await
        .map_err(|_| Error::DeadlineExceeded(deadline))??,
      None => self.infer_all(queries).await?,
    };

    let catalog_types_fetched = self.inferrer.catalog_types_fetched();
    let package_path = self.inferrer.resolver().package_path().to_string();
    let (declarations, imports) = self.inferrer.finish();
    let stats = GenerationStats {
      queries_typed: typed.len(),
      enums_synthesized: declarations
        .iter()
        .filter(|ty| matches!(ty, TargetType::Enum(_)))
        .count(),
      composites_synthesized: declarations
        .iter()
        .filter(|ty| matches!(ty, TargetType::Composite(_)))
        .count(),
      catalog_types_fetched,
    };
    log::info!(
      "typed {} queries: {} enums and {} composites synthesized from {} catalog types",
      stats.queries_typed,
      stats.enums_synthesized,
      stats.composites_synthesized,
      stats.catalog_types_fetched
    );

    Ok(GenerationOutput {
      package_path,
      queries: typed,
      declarations,
      imports,
      stats,
    })
  }

  async fn infer_all(&mut self, queries: &[SourceQuery]) -> Result<Vec<TypedQuery>> {
    let mut typed = Vec::with_capacity(queries.len());
    for query in queries {
      let result = self.inferrer.infer_types(query).await?;
      log::debug!(
        "typed query {}: {} inputs, {} outputs",
        query.name,
        result.inputs.len(),
        result.outputs.len()
      );
      typed.push(result);
    }
    Ok(typed)
  }
}

/// Runs [`Orchestrator::run`] for `queries` against `engine`.
pub async fn generate<E: Engine>(engine: E, config: &Config, queries: &[SourceQuery]) -> Result<GenerationOutput> {
  Orchestrator::new(engine, config).run(queries).await
}
