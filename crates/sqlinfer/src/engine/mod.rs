//! The introspection surface a database must offer for inference.
//!
//! Inference never executes a query. It prepares the statement, reads back
//! the parameter and result shape, and looks up any catalog types it has not
//! seen yet.

#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;

use crate::{catalog::Oid, error::EngineError};

/// One result column as reported by describing a prepared statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
  pub name: String,
  pub oid: Oid,
  /// `Some` only when the engine could prove nullability either way.
  pub nullable: Option<bool>,
}

impl ResultColumn {
  pub fn new(name: impl Into<String>, oid: Oid, nullable: Option<bool>) -> Self {
    Self {
      name: name.into(),
      oid,
      nullable,
    }
  }
}

/// Shape of a catalog type, without the details of the types it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHeader {
  pub name: String,
  pub namespace: Option<String>,
  pub class: TypeClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
  Scalar,
  Pseudo,
  Enum,
  Composite,
  Domain { base: Oid },
  Array { elem: Oid },
}

#[async_trait]
pub trait Engine: Send {
  /// Handle to a prepared, never executed, statement.
  type Statement: Send + Sync;

  async fn prepare(&mut self, sql: &str) -> Result<Self::Statement, EngineError>;

  /// Parameter types in placeholder order.
  fn describe_params(&self, statement: &Self::Statement) -> Vec<Oid>;

  /// Result columns in output order. Empty for statements that return no rows.
  fn describe_result(&self, statement: &Self::Statement) -> Vec<ResultColumn>;

  async fn fetch_type(&mut self, oid: Oid) -> Result<TypeHeader, EngineError>;

  /// Enum labels in declaration order.
  async fn fetch_enum_def(&mut self, oid: Oid) -> Result<Vec<String>, EngineError>;

  /// Composite fields as `(name, type)` in declaration order.
  async fn fetch_composite_def(&mut self, oid: Oid) -> Result<Vec<(String, Oid)>, EngineError>;
}
