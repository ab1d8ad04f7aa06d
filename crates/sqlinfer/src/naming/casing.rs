use std::collections::BTreeMap;

use super::identifiers::{RESERVED_WORDS, capitalize, prefix_if_digit_start, split_words, strip_invalid};

/// Converts catalog identifiers like `author_id` into identifiers of the
/// generated language like `AuthorID`.
///
/// A `Caser` holds nothing but its acronym table, so two casers built from the
/// same table always agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caser {
  /// Lowercase word to its preferred rendering, e.g. `"id" -> "ID"`.
  acronyms: BTreeMap<String, String>,
}

impl Caser {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a caser from an acronym table. Keys match case-insensitively.
  pub fn with_acronyms<K, V>(acronyms: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: AsRef<str>,
    V: Into<String>,
  {
    let mut caser = Self::new();
    for (word, rendering) in acronyms {
      caser.add_acronym(word.as_ref(), rendering);
    }
    caser
  }

  pub fn add_acronym(&mut self, word: &str, rendering: impl Into<String>) {
    self.acronyms.insert(word.to_ascii_lowercase(), rendering.into());
  }

  /// Converts a catalog name to an UpperCamel identifier. A leading digit
  /// gets an `X` in front, so `3d_shape` becomes `X3dShape`.
  ///
  /// Returns an empty string when the name holds nothing usable; callers pick
  /// their own fallback.
  pub fn to_upper_ident(&self, name: &str) -> String {
    let mut ident = self.to_upper_suffix(name);
    prefix_if_digit_start(&mut ident, 'X');
    ident
  }

  /// UpperCamel words meant to follow an existing identifier, like the label
  /// part of an enum constant. May start with a digit.
  pub(crate) fn to_upper_suffix(&self, name: &str) -> String {
    split_words(name).iter().map(|word| self.render_word(word)).collect()
  }

  /// Converts a catalog name to a lowerCamel identifier, suffixing reserved
  /// words with `_` and prefixing a leading digit with `_`.
  pub fn to_lower_ident(&self, name: &str) -> String {
    let words = split_words(name);
    let Some((first, rest)) = words.split_first() else {
      return String::new();
    };

    let mut ident = strip_invalid(&first.to_ascii_lowercase());
    for word in rest {
      ident.push_str(&self.render_word(word));
    }

    if RESERVED_WORDS.contains(ident.as_str()) {
      ident.push('_');
    }
    prefix_if_digit_start(&mut ident, '_');
    ident
  }

  fn render_word(&self, word: &str) -> String {
    match self.acronyms.get(&word.to_ascii_lowercase()) {
      Some(acronym) => strip_invalid(acronym),
      None => capitalize(word),
    }
  }
}

/// Parses acronym flags of the form `word` or `word=Rendering`.
///
/// A bare word renders as its uppercase form, so `oid` yields `("oid", "OID")`.
pub fn parse_acronym(entry: &str) -> Option<(String, String)> {
  let (word, rendering) = match entry.split_once('=') {
    Some((word, rendering)) => (word.trim(), rendering.trim().to_string()),
    None => (entry.trim(), entry.trim().to_ascii_uppercase()),
  };
  if word.is_empty() || rendering.is_empty() {
    return None;
  }
  Some((word.to_ascii_lowercase(), rendering))
}
