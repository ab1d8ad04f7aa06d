use std::time::Duration;

use crate::{catalog::Oid, inferrer::ResultKind};

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by an [`Engine`](crate::engine::Engine) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
  /// The engine could not be reached, or the connection broke mid-call.
  #[error("connection error: {0}")]
  Connection(String),
  /// The engine refused the statement or the catalog lookup.
  #[error("{0}")]
  Rejected(String),
}

/// Every way a generation run can fail. None of them are recoverable: the run
/// stops at the first one and produces no output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error("connection error: {0}")]
  Connection(String),

  #[error("query {query} failed to prepare: {message}")]
  Syntax { query: String, message: String },

  #[error("query {query} has incompatible result kind :{kind}; the query doesn't return any rows")]
  ResultKindMismatch { query: String, kind: ResultKind },

  #[error("query {query} declares {declared} parameter names but the database reports {actual} parameters")]
  ParamCountMismatch {
    query: String,
    declared: usize,
    actual: usize,
  },

  #[error("no type mapping for catalog type {name} (oid {oid}); add a type override for it")]
  UnresolvableType { oid: Oid, name: String },

  #[error("catalog lookup for oid {oid} failed: {message}")]
  UnknownType { oid: Oid, message: String },

  #[error(
    "type name {name} in package {package:?} is claimed by both {first} and {second}; add a type override or an acronym to separate them"
  )]
  NameCollision {
    package: String,
    name: String,
    first: String,
    second: String,
  },

  #[error("composite type cycle: {}", .chain.join(" -> "))]
  CyclicComposite { chain: Vec<String> },

  #[error("invalid type override {value:?} for {key}: {reason}")]
  InvalidOverride { key: String, value: String, reason: String },

  #[error("invalid acronym {0:?}: expected WORD or WORD=RENDERING")]
  InvalidAcronym(String),

  #[error("generation run exceeded its deadline of {0:?}")]
  DeadlineExceeded(Duration),
}

impl Error {
  /// Attributes an engine failure during `prepare` to the query being prepared.
  pub(crate) fn from_prepare(query: &str, err: EngineError) -> Self {
    match err {
      EngineError::Connection(message) => Self::Connection(message),
      EngineError::Rejected(message) => Self::Syntax {
        query: query.to_string(),
        message,
      },
    }
  }

  /// Attributes an engine failure during a catalog lookup to the type being fetched.
  pub(crate) fn from_lookup(oid: Oid, err: EngineError) -> Self {
    match err {
      EngineError::Connection(message) => Self::Connection(message),
      EngineError::Rejected(message) => Self::UnknownType { oid, message },
    }
  }
}
