//! [`Engine`] backed by a live PostgreSQL connection through `sqlx`.
//!
//! `describe` already resolves every type it reports, including enum labels,
//! composite fields and domain or array bases. Those type infos are kept per
//! OID so the catalog lookups that follow are answered without another round
//! trip. Only the schema of a user type needs a query of its own.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{
  Column, Connection, Either, Executor, TypeInfo,
  postgres::{PgConnection, PgTypeInfo, PgTypeKind, types::Oid as PgOid},
};

use super::{Engine, ResultColumn, TypeClass, TypeHeader};
use crate::{catalog::Oid, error::EngineError};

/// OIDs below this belong to types created by `initdb`.
const FIRST_NORMAL_OID: u32 = 16_384;

const BUILTIN_NAMESPACE: &str = "pg_catalog";

const NAMESPACE_QUERY: &str = "SELECT n.nspname::text FROM pg_type t \
  JOIN pg_namespace n ON n.oid = t.typnamespace WHERE t.oid = $1";

pub struct PgEngine {
  conn: PgConnection,
  types: TypeRegistry,
  namespaces: HashMap<Oid, Option<String>>,
}

#[derive(Debug, Clone)]
pub struct PgStatement {
  params: Vec<Oid>,
  columns: Vec<ResultColumn>,
}

impl PgEngine {
  pub async fn connect(url: &str) -> Result<Self, EngineError> {
    let conn = PgConnection::connect(url).await.map_err(classify)?;
    Ok(Self {
      conn,
      types: TypeRegistry::default(),
      namespaces: HashMap::new(),
    })
  }

  /// Schema of a user type, looked up once per OID. Builtins are always in
  /// `pg_catalog`.
  async fn namespace_of(&mut self, oid: Oid) -> Result<Option<String>, EngineError> {
    if oid.0 < FIRST_NORMAL_OID {
      return Ok(Some(BUILTIN_NAMESPACE.to_string()));
    }
    if let Some(namespace) = self.namespaces.get(&oid) {
      return Ok(namespace.clone());
    }

    let namespace = sqlx::query_scalar::<_, String>(NAMESPACE_QUERY)
      .bind(PgOid(oid.0))
      .fetch_optional(&mut self.conn)
      .await
      .map_err(classify)?;
    log::debug!("type {oid} lives in namespace {namespace:?}");
    self.namespaces.insert(oid, namespace.clone());
    Ok(namespace)
  }
}

/// Type infos reported by `describe`, keyed by OID.
#[derive(Debug, Default)]
pub(crate) struct TypeRegistry {
  types: HashMap<Oid, PgTypeInfo>,
}

impl TypeRegistry {
  /// Records `info` and every type it refers to, returning its OID.
  pub(crate) fn remember(&mut self, info: &PgTypeInfo) -> Result<Oid, EngineError> {
    let oid = oid_of(info)?;
    if self.types.contains_key(&oid) {
      return Ok(oid);
    }
    self.types.insert(oid, info.clone());
    match info.kind() {
      PgTypeKind::Domain(inner) | PgTypeKind::Array(inner) | PgTypeKind::Range(inner) => {
        self.remember(inner)?;
      }
      PgTypeKind::Composite(fields) => {
        for (_, field) in fields.iter() {
          self.remember(field)?;
        }
      }
      PgTypeKind::Simple | PgTypeKind::Pseudo | PgTypeKind::Enum(_) => {}
    }
    Ok(oid)
  }

  pub(crate) fn lookup(&self, oid: Oid) -> Result<&PgTypeInfo, EngineError> {
    self
      .types
      .get(&oid)
      .ok_or_else(|| EngineError::Rejected(format!("type with oid {oid} was not reported by describe")))
  }

  /// Ranges have no declaration of their own and are treated as scalars.
  pub(crate) fn class_of(&self, oid: Oid) -> Result<TypeClass, EngineError> {
    Ok(match self.lookup(oid)?.kind() {
      PgTypeKind::Simple | PgTypeKind::Range(_) => TypeClass::Scalar,
      PgTypeKind::Pseudo => TypeClass::Pseudo,
      PgTypeKind::Enum(_) => TypeClass::Enum,
      PgTypeKind::Composite(_) => TypeClass::Composite,
      PgTypeKind::Domain(base) => TypeClass::Domain { base: oid_of(base)? },
      PgTypeKind::Array(elem) => TypeClass::Array { elem: oid_of(elem)? },
    })
  }

  pub(crate) fn enum_labels(&self, oid: Oid) -> Result<Vec<String>, EngineError> {
    let info = self.lookup(oid)?;
    match info.kind() {
      PgTypeKind::Enum(labels) => Ok(labels.to_vec()),
      _ => Err(EngineError::Rejected(format!("{} is not an enum", info.name()))),
    }
  }

  pub(crate) fn composite_fields(&self, oid: Oid) -> Result<Vec<(String, Oid)>, EngineError> {
    let info = self.lookup(oid)?;
    match info.kind() {
      PgTypeKind::Composite(fields) => fields
        .iter()
        .map(|(name, ty)| Ok((name.clone(), oid_of(ty)?)))
        .collect(),
      _ => Err(EngineError::Rejected(format!("{} is not a composite", info.name()))),
    }
  }
}

#[async_trait]
impl Engine for PgEngine {
  type Statement = PgStatement;

  async fn prepare(&mut self, sql: &str) -> Result<Self::Statement, EngineError> {
    let describe = (&mut self.conn).describe(sql).await.map_err(classify)?;

    let params = match describe.parameters() {
      Some(Either::Left(types)) => types
        .iter()
        .map(|ty| self.types.remember(ty))
        .collect::<Result<Vec<_>, _>>()?,
      Some(Either::Right(count)) => {
        return Err(EngineError::Rejected(format!(
          "engine reported {count} parameters without their types"
        )));
      }
      None => vec![],
    };

    let mut columns = Vec::with_capacity(describe.columns().len());
    for (i, column) in describe.columns().iter().enumerate() {
      let oid = self.types.remember(column.type_info())?;
      columns.push(ResultColumn::new(column.name(), oid, describe.nullable(i)));
    }

    Ok(PgStatement { params, columns })
  }

  fn describe_params(&self, statement: &Self::Statement) -> Vec<Oid> {
    statement.params.clone()
  }

  fn describe_result(&self, statement: &Self::Statement) -> Vec<ResultColumn> {
    statement.columns.clone()
  }

  async fn fetch_type(&mut self, oid: Oid) -> Result<TypeHeader, EngineError> {
    let class = self.types.class_of(oid)?;
    let name = catalog_name(self.types.lookup(oid)?.name(), oid.0 < FIRST_NORMAL_OID);
    let namespace = self.namespace_of(oid).await?;
    Ok(TypeHeader { name, namespace, class })
  }

  async fn fetch_enum_def(&mut self, oid: Oid) -> Result<Vec<String>, EngineError> {
    self.types.enum_labels(oid)
  }

  async fn fetch_composite_def(&mut self, oid: Oid) -> Result<Vec<(String, Oid)>, EngineError> {
    self.types.composite_fields(oid)
  }
}

fn oid_of(info: &PgTypeInfo) -> Result<Oid, EngineError> {
  info
    .oid()
    .map(|oid| Oid(oid.0))
    .ok_or_else(|| EngineError::Rejected(format!("type {} has no oid", info.name())))
}

/// Builtin names come back in display form (`INT4`, `TEXT[]`); the catalog
/// spells them `int4` and `_text`.
pub(crate) fn catalog_name(name: &str, builtin: bool) -> String {
  if !builtin {
    return name.to_string();
  }
  let name = name.to_ascii_lowercase();
  match name.strip_suffix("[]") {
    Some(elem) => format!("_{elem}"),
    None => name,
  }
}

pub(crate) fn classify(err: sqlx::Error) -> EngineError {
  match err {
    sqlx::Error::Database(db) => EngineError::Rejected(db.message().to_string()),
    other => EngineError::Connection(other.to_string()),
  }
}
