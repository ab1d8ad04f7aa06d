//! Types of the generated language.
//!
//! Every variant answers the same four questions: what is its base name, which
//! package defines it, what is that package's short alias, and how should it be
//! spelled from inside some other package.

mod builtins;
mod package;

use std::{borrow::Cow, collections::BTreeSet, sync::Arc};

pub use builtins::builtin_for;
pub(crate) use package::parse_opaque;
pub use package::extract_short_package;
use serde::Serialize;

use crate::catalog::CatalogType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "camelCase")]
pub enum TargetType {
  /// A type every file can name without an import, like `int32` or `[]byte`.
  Builtin { name: String },
  /// A type known only by name and package, usually supplied by the user.
  Opaque(OpaqueType),
  Enum(Arc<EnumType>),
  Composite(Arc<CompositeType>),
  Array { elem: Box<TargetType> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaqueType {
  /// Full import path, like `github.com/jackc/pgtype`. Empty for builtins.
  pub pkg_path: String,
  /// Short alias of the package, like `pgtype`. Empty for builtins.
  pub pkg: String,
  pub name: String,
}

/// A string type whose constants mirror the labels of a catalog enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumType {
  pub pkg_path: String,
  pub pkg: String,
  pub name: String,
  /// Constant identifiers, in catalog declaration order.
  pub labels: Vec<String>,
  /// Catalog label for each constant: `labels[i]` stands for `values[i]`.
  pub values: Vec<String>,
  pub source: CatalogType,
}

/// A struct type mirroring a catalog composite (row) type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeType {
  pub pkg_path: String,
  pub pkg: String,
  pub name: String,
  pub field_names: Vec<String>,
  pub field_types: Vec<TargetType>,
  pub source: CatalogType,
}

impl TargetType {
  pub fn builtin(name: impl Into<String>) -> Self {
    Self::Builtin { name: name.into() }
  }

  pub fn array(elem: TargetType) -> Self {
    Self::Array { elem: Box::new(elem) }
  }

  /// Full package path that defines the type, empty for builtins.
  pub fn import(&self) -> &str {
    match self {
      Self::Builtin { .. } => "",
      Self::Opaque(opaque) => &opaque.pkg_path,
      Self::Enum(enum_type) => &enum_type.pkg_path,
      Self::Composite(composite) => &composite.pkg_path,
      Self::Array { elem } => elem.import(),
    }
  }

  /// Last meaningful segment of [`import`](Self::import).
  pub fn package(&self) -> &str {
    match self {
      Self::Builtin { .. } => "",
      Self::Opaque(opaque) => &opaque.pkg,
      Self::Enum(enum_type) => &enum_type.pkg,
      Self::Composite(composite) => &composite.pkg,
      Self::Array { elem } => elem.package(),
    }
  }

  pub fn base_name(&self) -> Cow<'_, str> {
    match self {
      Self::Builtin { name } => Cow::Borrowed(name),
      Self::Opaque(opaque) => Cow::Borrowed(&opaque.name),
      Self::Enum(enum_type) => Cow::Borrowed(&enum_type.name),
      Self::Composite(composite) => Cow::Borrowed(&composite.name),
      Self::Array { elem } => Cow::Owned(format!("[]{}", elem.base_name())),
    }
  }

  /// Spells the type as seen from code in `pkg_path`: the bare base name for
  /// builtins and types of that same package, `alias.Name` otherwise.
  pub fn qualify_rel(&self, pkg_path: &str) -> String {
    if let Self::Array { elem } = self {
      return format!("[]{}", elem.qualify_rel(pkg_path));
    }
    let import = self.import();
    if import == pkg_path || import.is_empty() || self.package().is_empty() {
      return self.base_name().into_owned();
    }
    format!("{}.{}", self.package(), self.base_name())
  }

  /// Adds every package this type refers to, other than `own_pkg_path`.
  pub fn collect_imports(&self, own_pkg_path: &str, imports: &mut BTreeSet<String>) {
    match self {
      Self::Array { elem } => elem.collect_imports(own_pkg_path, imports),
      Self::Composite(composite) => {
        for field in &composite.field_types {
          field.collect_imports(own_pkg_path, imports);
        }
        if composite.pkg_path != own_pkg_path && !composite.pkg_path.is_empty() {
          imports.insert(composite.pkg_path.clone());
        }
      }
      _ => {
        let import = self.import();
        if !import.is_empty() && import != own_pkg_path {
          imports.insert(import.to_string());
        }
      }
    }
  }
}
