//! Builtin PostgreSQL types whose OIDs are fixed across installations.

use super::{CatalogType, Oid};

pub const BOOL: Oid = Oid(16);
pub const BYTEA: Oid = Oid(17);
pub const CHAR: Oid = Oid(18);
pub const NAME: Oid = Oid(19);
pub const INT8: Oid = Oid(20);
pub const INT2: Oid = Oid(21);
pub const INT4: Oid = Oid(23);
pub const TEXT: Oid = Oid(25);
pub const OID: Oid = Oid(26);
pub const JSON: Oid = Oid(114);
pub const FLOAT4: Oid = Oid(700);
pub const FLOAT8: Oid = Oid(701);
pub const BPCHAR: Oid = Oid(1042);
pub const VARCHAR: Oid = Oid(1043);
pub const DATE: Oid = Oid(1082);
pub const TIME: Oid = Oid(1083);
pub const TIMESTAMP: Oid = Oid(1114);
pub const TIMESTAMPTZ: Oid = Oid(1184);
pub const INTERVAL: Oid = Oid(1186);
pub const NUMERIC: Oid = Oid(1700);
pub const UUID: Oid = Oid(2950);
pub const JSONB: Oid = Oid(3802);

const NAMES: &[(Oid, &str)] = &[
  (BOOL, "bool"),
  (BYTEA, "bytea"),
  (CHAR, "char"),
  (NAME, "name"),
  (INT8, "int8"),
  (INT2, "int2"),
  (INT4, "int4"),
  (TEXT, "text"),
  (OID, "oid"),
  (JSON, "json"),
  (FLOAT4, "float4"),
  (FLOAT8, "float8"),
  (BPCHAR, "bpchar"),
  (VARCHAR, "varchar"),
  (DATE, "date"),
  (TIME, "time"),
  (TIMESTAMP, "timestamp"),
  (TIMESTAMPTZ, "timestamptz"),
  (INTERVAL, "interval"),
  (NUMERIC, "numeric"),
  (UUID, "uuid"),
  (JSONB, "jsonb"),
];

/// Catalog name of a well-known type, e.g. `"int4"` for [`INT4`].
pub fn name_of(oid: Oid) -> Option<&'static str> {
  NAMES.iter().find(|(known, _)| *known == oid).map(|(_, name)| *name)
}

/// The scalar catalog type for a well-known OID.
pub fn scalar(oid: Oid) -> Option<CatalogType> {
  name_of(oid).map(|name| CatalogType::scalar(oid, name).with_namespace("pg_catalog"))
}
