use std::sync::LazyLock;

use regex::Regex;

use super::OpaqueType;

static MAJOR_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v[0-9]+$").expect("valid regex"));

/// Gets the alias a package path is referred to by, like `store` for
/// `github.com/example/app/store`.
///
/// A trailing major-version segment is skipped, so `github.com/jackc/pgx/v4`
/// yields `pgx`.
pub fn extract_short_package(pkg_path: &str) -> String {
  let mut segments = pkg_path.rsplit('/');
  let last = segments.next().unwrap_or_default();
  if MAJOR_VERSION_RE.is_match(last)
    && let Some(parent) = segments.next()
  {
    return parent.to_string();
  }
  last.to_string()
}

/// Parses a qualified type like `github.com/jackc/pgtype.Int4` or a builtin
/// like `string` into an [`OpaqueType`].
///
/// The package path ends at the last `.`; a string without one is a builtin
/// with an empty package.
pub(crate) fn parse_opaque(qualified: &str) -> Result<OpaqueType, String> {
  let qualified = qualified.trim();
  if qualified.is_empty() {
    return Err("type is empty".to_string());
  }

  let Some((pkg_path, name)) = qualified.rsplit_once('.') else {
    return Ok(OpaqueType {
      pkg_path: String::new(),
      pkg: String::new(),
      name: qualified.to_string(),
    });
  };

  if pkg_path.is_empty() {
    return Err("package path before the type name is empty".to_string());
  }
  if name.is_empty() || name.contains('/') {
    return Err("expected a type name after the last '.' of the package path".to_string());
  }

  Ok(OpaqueType {
    pkg_path: pkg_path.to_string(),
    pkg: extract_short_package(pkg_path),
    name: name.to_string(),
  })
}
