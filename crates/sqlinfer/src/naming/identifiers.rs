use std::{
  collections::{BTreeSet, HashSet},
  sync::LazyLock,
};

use any_ascii::any_ascii;

/// Keywords of the generated language. A lower-case identifier that lands on
/// one of these gets a trailing underscore.
pub(crate) static RESERVED_WORDS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
  ]
  .into_iter()
  .collect()
});

/// Splits a catalog identifier into words.
///
/// The input is transliterated to ASCII first. Any run of non-alphanumeric
/// characters is a separator, and each separated chunk is further split on
/// case boundaries, so `"author_ID"`, `"authorId"` and `"AuthorID"` all yield
/// two words.
pub(crate) fn split_words(name: &str) -> Vec<String> {
  if name.is_empty() {
    return vec![];
  }

  any_ascii(name)
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|chunk| !chunk.is_empty())
    .flat_map(split_case_boundaries)
    .collect()
}

/// Cuts an ASCII alphanumeric chunk where a new word starts: at a capital
/// that follows a lowercase letter or a digit (`int4Value`), and at the last
/// capital of an uppercase run that goes on in lowercase (`IDValue`).
fn split_case_boundaries(chunk: &str) -> Vec<String> {
  let bytes = chunk.as_bytes();
  let mut words = vec![];
  let mut start = 0;

  for i in 1..bytes.len() {
    if !bytes[i].is_ascii_uppercase() {
      continue;
    }
    let prev = bytes[i - 1];
    let run_ends = prev.is_ascii_uppercase() && bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
    if prev.is_ascii_lowercase() || prev.is_ascii_digit() || run_ends {
      words.push(chunk[start..i].to_string());
      start = i;
    }
  }
  words.push(chunk[start..].to_string());
  words
}

/// Uppercases the first character of a word and lowercases the rest.
pub(crate) fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    None => String::new(),
    Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
  }
}

/// Keeps only the characters that may appear inside an identifier.
pub(crate) fn strip_invalid(ident: &str) -> String {
  ident.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect()
}

/// Identifiers may not start with a digit.
pub(crate) fn prefix_if_digit_start(ident: &mut String, prefix: char) {
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, prefix);
  }
}

/// Returns `base` if nobody has used it yet. Otherwise appends `separator` and
/// `position`, then `_2`, `_3` and so on until the result is unused.
pub(crate) fn ensure_unique(base: &str, separator: &str, position: usize, used: &BTreeSet<String>) -> String {
  if !used.contains(base) {
    return base.to_string();
  }
  let positional = format!("{base}{separator}{position}");
  if !used.contains(&positional) {
    return positional;
  }
  (2..)
    .map(|n| format!("{positional}_{n}"))
    .find(|candidate| !used.contains(candidate))
    .unwrap_or(positional)
}

/// Builds a name for a catalog object whose cased identifier came out empty:
/// the prefix followed by every letter, digit or underscore of `catalog_name`.
///
/// `choose_fallback_name("!!", "UnnamedLabel2")` is `"UnnamedLabel2"`.
pub(crate) fn choose_fallback_name(catalog_name: &str, prefix: &str) -> String {
  let mut name = String::with_capacity(prefix.len() + catalog_name.len());
  name.push_str(prefix);
  name.extend(
    catalog_name
      .chars()
      .filter(|c| c.is_alphanumeric() || *c == '_'),
  );
  name
}
