//! Turns a [`SourceQuery`] into a [`TypedQuery`].
//!
//! The statement is prepared and described by the engine, never executed. Each
//! parameter and result column type is fetched from the catalog and resolved to
//! a target type through the run's shared [`TypeResolver`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  catalog::{CatalogType, Oid, TypeFetcher},
  config::Config,
  engine::{Engine, ResultColumn},
  error::{Error, Result},
  naming::{choose_fallback_name, ensure_unique},
  resolver::TypeResolver,
  target::TargetType,
};

const COLUMN_FALLBACK_PREFIX: &str = "UnnamedColumn";
const PARAM_FALLBACK_PREFIX: &str = "unnamedParam";

/// How many rows a query is declared to return.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResultKind {
  /// Runs for its side effects; any result columns are ignored.
  Exec,
  One,
  Many,
}

/// A named query as it comes out of the query file parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceQuery {
  pub name: String,
  /// SQL with positional placeholders (`$1`, `$2`, ...).
  pub prepared_sql: String,
  /// One name per placeholder, in placeholder order.
  #[serde(default)]
  pub param_names: Vec<String>,
  pub result_kind: ResultKind,
}

impl SourceQuery {
  pub fn new(
    name: impl Into<String>,
    prepared_sql: impl Into<String>,
    param_names: Vec<String>,
    result_kind: ResultKind,
  ) -> Self {
    Self {
      name: name.into(),
      prepared_sql: prepared_sql.into(),
      param_names,
      result_kind,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParam {
  pub name: String,
  /// lowerCamel identifier for the parameter variable, unique within the
  /// query.
  pub ident: String,
  pub pg_type: CatalogType,
  pub target_type: TargetType,
  /// Always false: a parameter is assumed non-null unless the caller wraps it.
  pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputColumn {
  /// Column name exactly as the engine reports it.
  pub pg_name: String,
  /// `pg_name`, or `pg_name_<i>` when an earlier column already took the
  /// cased identifier.
  pub name: String,
  /// Cased identifier, unique within the query.
  pub ident: String,
  pub pg_type: CatalogType,
  pub target_type: TargetType,
  pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedQuery {
  pub name: String,
  pub prepared_sql: String,
  pub result_kind: ResultKind,
  pub inputs: Vec<InputParam>,
  pub outputs: Vec<OutputColumn>,
}

/// Infers types for the queries of one run against a single engine
/// connection. All queries share one catalog cache and one resolver, so a type
/// used by several queries is declared once.
pub struct Inferrer<E: Engine> {
  engine: E,
  fetcher: TypeFetcher,
  resolver: TypeResolver,
}

impl<E: Engine> Inferrer<E> {
  pub fn new(engine: E, config: &Config) -> Self {
    Self {
      engine,
      fetcher: TypeFetcher::new(),
      resolver: TypeResolver::new(config),
    }
  }

  pub async fn infer_types(&mut self, query: &SourceQuery) -> Result<TypedQuery> {
    let statement = self
      .engine
      .prepare(&query.prepared_sql)
      .await
      .map_err(|e| Error::from_prepare(&query.name, e))?;
    let param_oids = self.engine.describe_params(&statement);
    let columns = self.engine.describe_result(&statement);
    log::debug!(
      "prepared query {}: {} parameters, {} result columns",
      query.name,
      param_oids.len(),
      columns.len()
    );

    if param_oids.len() != query.param_names.len() {
      return Err(Error::ParamCountMismatch {
        query: query.name.clone(),
        declared: query.param_names.len(),
        actual: param_oids.len(),
      });
    }
    let columns = match query.result_kind {
      ResultKind::Exec => vec![],
      kind if columns.is_empty() => {
        return Err(Error::ResultKindMismatch {
          query: query.name.clone(),
          kind,
        });
      }
      _ => columns,
    };

    let mut inputs = Vec::with_capacity(param_oids.len());
    let mut used = BTreeSet::new();
    for (i, (name, oid)) in query.param_names.iter().zip(param_oids).enumerate() {
      let mut ident = self.resolver.caser().to_lower_ident(name);
      if ident.is_empty() {
        ident = choose_fallback_name(name, &format!("{PARAM_FALLBACK_PREFIX}{i}"));
      }
      let ident = ensure_unique(&ident, "", i, &used);
      used.insert(ident.clone());

      let (pg_type, target_type) = self.resolve_oid(oid).await?;
      inputs.push(InputParam {
        name: name.clone(),
        ident,
        pg_type,
        target_type,
        nullable: false,
      });
    }

    let outputs = self.infer_outputs(columns).await?;

    Ok(TypedQuery {
      name: query.name.clone(),
      prepared_sql: query.prepared_sql.clone(),
      result_kind: query.result_kind,
      inputs,
      outputs,
    })
  }

  async fn infer_outputs(&mut self, columns: Vec<ResultColumn>) -> Result<Vec<OutputColumn>> {
    let mut outputs: Vec<OutputColumn> = Vec::with_capacity(columns.len());
    let mut used_idents = BTreeSet::new();
    let mut used_names = BTreeSet::new();
    for (i, column) in columns.into_iter().enumerate() {
      let mut ident = self.resolver.caser().to_upper_ident(&column.name);
      if ident.is_empty() {
        ident = choose_fallback_name(&column.name, &format!("{COLUMN_FALLBACK_PREFIX}{i}"));
      }
      let mut name = column.name.clone();
      if used_idents.contains(&ident) {
        ident = ensure_unique(&ident, "", i, &used_idents);
        name = ensure_unique(&format!("{name}_{i}"), "_", i, &used_names);
      }
      used_idents.insert(ident.clone());
      used_names.insert(name.clone());

      let (pg_type, target_type) = self.resolve_oid(column.oid).await?;
      outputs.push(OutputColumn {
        pg_name: column.name,
        name,
        ident,
        pg_type,
        target_type,
        nullable: column.nullable.unwrap_or(true),
      });
    }
    Ok(outputs)
  }

  async fn resolve_oid(&mut self, oid: Oid) -> Result<(CatalogType, TargetType)> {
    let pg_type = self.fetcher.fetch(&mut self.engine, oid).await?;
    let target_type = self.resolver.resolve(&pg_type)?;
    Ok((pg_type, target_type))
  }

  pub fn engine(&self) -> &E {
    &self.engine
  }

  pub fn resolver(&self) -> &TypeResolver {
    &self.resolver
  }

  /// Number of distinct catalog types fetched so far.
  pub fn catalog_types_fetched(&self) -> usize {
    self.fetcher.len()
  }

  /// Ends the run, handing back the synthesized declarations and the packages
  /// the resolved types are imported from.
  pub fn finish(self) -> (Vec<TargetType>, BTreeSet<String>) {
    let imports = self.resolver.imports();
    (self.resolver.into_declarations(), imports)
  }
}
