use std::{collections::BTreeMap, time::Duration};

use crate::{
  error::{Error, Result},
  naming::{Caser, parse_acronym},
  target::parse_opaque,
};

/// Settings for one generation run. Everything here is already validated by
/// the time a run starts; the parse helpers below do that validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct Config {
  /// Package that receives the synthesized enum and composite types.
  #[builder(into)]
  pub package_path: String,
  /// Catalog type name (qualified like `public.citext`, or bare like `citext`)
  /// to a qualified target type like `github.com/jackc/pgtype.Text`.
  #[builder(default)]
  pub overrides: BTreeMap<String, String>,
  /// Lowercase word to its preferred rendering, e.g. `id -> ID`.
  #[builder(default)]
  pub acronyms: BTreeMap<String, String>,
  /// Upper bound on the whole run.
  pub deadline: Option<Duration>,
}

impl Config {
  pub fn caser(&self) -> Caser {
    Caser::with_acronyms(self.acronyms.iter().map(|(word, rendering)| (word, rendering.clone())))
  }
}

/// Parses `NAME=TYPE` override entries, checking that each `TYPE` is a usable
/// qualified type.
pub fn parse_overrides<I, S>(entries: I) -> Result<BTreeMap<String, String>>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut overrides = BTreeMap::new();
  for entry in entries {
    let entry = entry.as_ref();
    let Some((key, value)) = entry.split_once('=') else {
      return Err(Error::InvalidOverride {
        key: entry.to_string(),
        value: String::new(),
        reason: "expected NAME=TYPE".to_string(),
      });
    };
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() {
      return Err(Error::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
        reason: "catalog type name is empty".to_string(),
      });
    }
    parse_opaque(value).map_err(|reason| Error::InvalidOverride {
      key: key.to_string(),
      value: value.to_string(),
      reason,
    })?;
    overrides.insert(key.to_string(), value.to_string());
  }
  Ok(overrides)
}

/// Parses `WORD` or `WORD=RENDERING` acronym entries.
pub fn parse_acronyms<I, S>(entries: I) -> Result<BTreeMap<String, String>>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  entries
    .into_iter()
    .map(|entry| parse_acronym(entry.as_ref()).ok_or_else(|| Error::InvalidAcronym(entry.as_ref().to_string())))
    .collect()
}
