use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;

use crate::{
  catalog::{Oid, well_known},
  engine::{Engine, ResultColumn, TypeClass, TypeHeader},
  error::EngineError,
  inferrer::{ResultKind, SourceQuery},
};

pub(crate) const FIND_BY_FIRST_NAME_SQL: &str = "SELECT first_name FROM author WHERE first_name = $1;";
pub(crate) const DELETE_AUTHOR_SQL: &str = "DELETE FROM author WHERE author_id = $1;";
pub(crate) const DELETE_AUTHOR_RETURNING_SQL: &str =
  "DELETE FROM author WHERE author_id = $1 RETURNING author_id, first_name;";
pub(crate) const FIND_DEVICES_SQL: &str = "SELECT owner_email, type FROM device WHERE type = ANY($1);";
pub(crate) const FIND_DEVICE_INFO_SQL: &str = "SELECT info, suffix FROM device_info_view;";
pub(crate) const FIND_DUPLICATE_COLUMNS_SQL: &str = "SELECT a.first_name, b.first_name FROM author a, author b;";
pub(crate) const FIND_NODES_SQL: &str = "SELECT node FROM graph;";

pub(crate) const DEVICE_TYPE: Oid = Oid(16_400);
pub(crate) const DEVICE_TYPE_ARRAY: Oid = Oid(16_399);
pub(crate) const DEVICE_INFO: Oid = Oid(16_410);
pub(crate) const NODE: Oid = Oid(16_420);
pub(crate) const EDGE: Oid = Oid(16_421);
pub(crate) const EMAIL: Oid = Oid(16_430);
pub(crate) const ANY_ELEMENT: Oid = Oid(2283);

pub(crate) const DEVICE_TYPE_LABELS: [&str; 6] = ["undefined", "phone", "laptop", "ipad", "desktop", "iot"];

#[derive(Debug, Clone)]
pub(crate) struct FakeStatement {
  params: Vec<Oid>,
  columns: Vec<ResultColumn>,
}

#[derive(Debug, Clone)]
enum TypeDef {
  Plain,
  Enum(Vec<String>),
  Composite(Vec<(String, Oid)>),
}

/// Scripted stand-in for a database. Statements and catalog types are
/// registered up front; anything else is rejected the way a real engine would.
#[derive(Debug, Default)]
pub(crate) struct FakeEngine {
  statements: HashMap<String, FakeStatement>,
  types: HashMap<Oid, (TypeHeader, TypeDef)>,
  disconnected: bool,
  latency: Option<Duration>,
  pub(crate) prepare_calls: usize,
  pub(crate) type_lookups: usize,
}

impl FakeEngine {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// The `author` table plus a `device` table using enum, array, domain and
  /// composite types, and a `graph` whose composites refer to each other.
  pub(crate) fn author_schema() -> Self {
    Self::new()
      .with_statement(
        FIND_BY_FIRST_NAME_SQL,
        vec![well_known::TEXT],
        vec![ResultColumn::new("first_name", well_known::TEXT, Some(false))],
      )
      .with_statement(DELETE_AUTHOR_SQL, vec![well_known::INT4], vec![])
      .with_statement(
        DELETE_AUTHOR_RETURNING_SQL,
        vec![well_known::INT4],
        vec![
          ResultColumn::new("author_id", well_known::INT4, Some(false)),
          ResultColumn::new("first_name", well_known::TEXT, Some(false)),
        ],
      )
      .with_statement(
        FIND_DEVICES_SQL,
        vec![DEVICE_TYPE_ARRAY],
        vec![
          ResultColumn::new("owner_email", EMAIL, None),
          ResultColumn::new("type", DEVICE_TYPE, Some(false)),
        ],
      )
      .with_statement(
        FIND_DEVICE_INFO_SQL,
        vec![],
        vec![
          ResultColumn::new("info", DEVICE_INFO, None),
          ResultColumn::new("suffix", well_known::TEXT, Some(true)),
        ],
      )
      .with_statement(
        FIND_DUPLICATE_COLUMNS_SQL,
        vec![],
        vec![
          ResultColumn::new("first_name", well_known::TEXT, Some(false)),
          ResultColumn::new("first_name", well_known::TEXT, Some(false)),
        ],
      )
      .with_statement(FIND_NODES_SQL, vec![], vec![ResultColumn::new("node", NODE, None)])
      .with_enum(DEVICE_TYPE, "device_type", &DEVICE_TYPE_LABELS)
      .with_type(DEVICE_TYPE_ARRAY, "_device_type", TypeClass::Array { elem: DEVICE_TYPE })
      .with_type(EMAIL, "email", TypeClass::Domain { base: well_known::TEXT })
      .with_composite(
        DEVICE_INFO,
        "device_info",
        &[("owner_email", EMAIL), ("type", DEVICE_TYPE), ("owner_id", well_known::INT8)],
      )
      .with_composite(NODE, "node", &[("id", well_known::INT4), ("out", EDGE)])
      .with_composite(EDGE, "edge", &[("weight", well_known::FLOAT8), ("target", NODE)])
      .with_type(ANY_ELEMENT, "anyelement", TypeClass::Pseudo)
  }

  pub(crate) fn with_statement(mut self, sql: &str, params: Vec<Oid>, columns: Vec<ResultColumn>) -> Self {
    self.statements.insert(sql.to_string(), FakeStatement { params, columns });
    self
  }

  pub(crate) fn with_type(mut self, oid: Oid, name: &str, class: TypeClass) -> Self {
    self.types.insert(oid, (header(name, class), TypeDef::Plain));
    self
  }

  pub(crate) fn with_enum(mut self, oid: Oid, name: &str, labels: &[&str]) -> Self {
    let labels = labels.iter().map(|label| (*label).to_string()).collect();
    self.types.insert(oid, (header(name, TypeClass::Enum), TypeDef::Enum(labels)));
    self
  }

  pub(crate) fn with_composite(mut self, oid: Oid, name: &str, fields: &[(&str, Oid)]) -> Self {
    let fields = fields.iter().map(|(name, oid)| ((*name).to_string(), *oid)).collect();
    self
      .types
      .insert(oid, (header(name, TypeClass::Composite), TypeDef::Composite(fields)));
    self
  }

  pub(crate) fn disconnected(mut self) -> Self {
    self.disconnected = true;
    self
  }

  /// Makes every `prepare` take `latency` before answering.
  pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  fn check_connection(&self) -> Result<(), EngineError> {
    if self.disconnected {
      return Err(EngineError::Connection("connection refused".to_string()));
    }
    Ok(())
  }

  fn type_def(&self, oid: Oid) -> Result<&(TypeHeader, TypeDef), EngineError> {
    self
      .types
      .get(&oid)
      .ok_or_else(|| EngineError::Rejected(format!("cache lookup failed for type {oid}")))
  }
}

fn header(name: &str, class: TypeClass) -> TypeHeader {
  TypeHeader {
    name: name.to_string(),
    namespace: Some("public".to_string()),
    class,
  }
}

#[async_trait]
impl Engine for FakeEngine {
  type Statement = FakeStatement;

  async fn prepare(&mut self, sql: &str) -> Result<Self::Statement, EngineError> {
    self.check_connection()?;
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    self.prepare_calls += 1;
    self
      .statements
      .get(sql)
      .cloned()
      .ok_or_else(|| EngineError::Rejected(format!("syntax error in statement {sql:?}")))
  }

  fn describe_params(&self, statement: &Self::Statement) -> Vec<Oid> {
    statement.params.clone()
  }

  fn describe_result(&self, statement: &Self::Statement) -> Vec<ResultColumn> {
    statement.columns.clone()
  }

  async fn fetch_type(&mut self, oid: Oid) -> Result<TypeHeader, EngineError> {
    self.check_connection()?;
    self.type_lookups += 1;
    self.type_def(oid).map(|(header, _)| header.clone())
  }

  async fn fetch_enum_def(&mut self, oid: Oid) -> Result<Vec<String>, EngineError> {
    self.check_connection()?;
    match self.type_def(oid)? {
      (_, TypeDef::Enum(labels)) => Ok(labels.clone()),
      (header, _) => Err(EngineError::Rejected(format!("{} is not an enum", header.name))),
    }
  }

  async fn fetch_composite_def(&mut self, oid: Oid) -> Result<Vec<(String, Oid)>, EngineError> {
    self.check_connection()?;
    match self.type_def(oid)? {
      (_, TypeDef::Composite(fields)) => Ok(fields.clone()),
      (header, _) => Err(EngineError::Rejected(format!("{} is not a composite", header.name))),
    }
  }
}

pub(crate) fn source_query(name: &str, sql: &str, params: &[&str], kind: ResultKind) -> SourceQuery {
  SourceQuery::new(name, sql, params.iter().map(|p| (*p).to_string()).collect(), kind)
}
