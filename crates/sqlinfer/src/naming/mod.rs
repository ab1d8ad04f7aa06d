pub mod casing;
pub(crate) mod identifiers;

pub use casing::{Caser, parse_acronym};
pub(crate) use identifiers::{choose_fallback_name, ensure_unique};
