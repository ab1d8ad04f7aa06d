use super::{OpaqueType, TargetType};
use crate::catalog::{Oid, well_known};

/// Catalog scalars with a fixed mapping. Entries with a package path become
/// opaque types; the rest are language builtins.
const BUILTINS: &[(Oid, &str, &str)] = &[
  (well_known::BOOL, "", "bool"),
  (well_known::BYTEA, "", "[]byte"),
  (well_known::CHAR, "", "int8"),
  (well_known::NAME, "", "string"),
  (well_known::INT8, "", "int64"),
  (well_known::INT2, "", "int16"),
  (well_known::INT4, "", "int32"),
  (well_known::TEXT, "", "string"),
  (well_known::OID, "", "uint32"),
  (well_known::JSON, "", "[]byte"),
  (well_known::FLOAT4, "", "float32"),
  (well_known::FLOAT8, "", "float64"),
  (well_known::BPCHAR, "", "string"),
  (well_known::VARCHAR, "", "string"),
  (well_known::DATE, "time", "Time"),
  (well_known::TIMESTAMP, "time", "Time"),
  (well_known::TIMESTAMPTZ, "time", "Time"),
  (well_known::INTERVAL, "time", "Duration"),
  (well_known::JSONB, "", "[]byte"),
];

/// The fixed target type for a catalog scalar, if it has one.
pub fn builtin_for(oid: Oid) -> Option<TargetType> {
  let (_, pkg_path, name) = BUILTINS.iter().find(|(known, _, _)| *known == oid)?;
  if pkg_path.is_empty() {
    return Some(TargetType::builtin(*name));
  }
  Some(TargetType::Opaque(OpaqueType {
    pkg_path: (*pkg_path).to_string(),
    pkg: super::extract_short_package(pkg_path),
    name: (*name).to_string(),
  }))
}
