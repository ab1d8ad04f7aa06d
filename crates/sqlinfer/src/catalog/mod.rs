//! Catalog types as the database describes them.
//!
//! A [`CatalogType`] is a fully expanded tree: enums carry their labels,
//! composites carry their fields, domains and arrays carry the type they wrap.
//! [`TypeFetcher`] builds these trees from an [`Engine`](crate::engine::Engine)
//! and caches them by [`Oid`] for the length of one run.

mod fetcher;
pub mod well_known;

use std::fmt;

pub use fetcher::TypeFetcher;
use serde::{Deserialize, Serialize};

/// Identifier of a type in the database catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Oid(pub u32);

impl fmt::Display for Oid {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogType {
  pub oid: Oid,
  pub name: String,
  /// Schema the type lives in, when the engine reports it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub namespace: Option<String>,
  pub kind: CatalogKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogKind {
  Scalar,
  /// Placeholder types such as `record` or `anyelement`.
  Pseudo,
  /// Labels in declaration order.
  Enum { labels: Vec<String> },
  /// Fields in declaration order.
  Composite { fields: Vec<CompositeField> },
  Domain { base: Box<CatalogType> },
  Array { elem: Box<CatalogType> },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeField {
  pub name: String,
  #[serde(rename = "type")]
  pub ty: CatalogType,
}

impl CatalogType {
  pub fn scalar(oid: Oid, name: impl Into<String>) -> Self {
    Self::new(oid, name, CatalogKind::Scalar)
  }

  pub fn enumeration(oid: Oid, name: impl Into<String>, labels: Vec<String>) -> Self {
    Self::new(oid, name, CatalogKind::Enum { labels })
  }

  pub fn composite(oid: Oid, name: impl Into<String>, fields: Vec<CompositeField>) -> Self {
    Self::new(oid, name, CatalogKind::Composite { fields })
  }

  pub fn domain(oid: Oid, name: impl Into<String>, base: CatalogType) -> Self {
    Self::new(oid, name, CatalogKind::Domain { base: Box::new(base) })
  }

  pub fn array(oid: Oid, name: impl Into<String>, elem: CatalogType) -> Self {
    Self::new(oid, name, CatalogKind::Array { elem: Box::new(elem) })
  }

  pub fn new(oid: Oid, name: impl Into<String>, kind: CatalogKind) -> Self {
    Self {
      oid,
      name: name.into(),
      namespace: None,
      kind,
    }
  }

  #[must_use]
  pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
    self.namespace = Some(namespace.into());
    self
  }

  /// `namespace.name` when the namespace is known, otherwise the bare name.
  pub fn qualified_name(&self) -> String {
    match &self.namespace {
      Some(namespace) => format!("{namespace}.{}", self.name),
      None => self.name.clone(),
    }
  }
}

impl CompositeField {
  pub fn new(name: impl Into<String>, ty: CatalogType) -> Self {
    Self { name: name.into(), ty }
  }
}
