//! Type inference for SQL queries.
//!
//! Each query is prepared against a live database, never executed, and the
//! reported parameter and result column types are resolved to types of the
//! generated language. Enum and composite catalog types get one synthesized
//! declaration per run, shared by every query that uses them.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod inferrer;
pub mod naming;
pub mod orchestrator;
pub mod resolver;
pub mod target;

pub use catalog::{CatalogKind, CatalogType, CompositeField, Oid, TypeFetcher};
pub use config::Config;
pub use engine::{Engine, ResultColumn, TypeClass, TypeHeader};
pub use error::{EngineError, Error, Result};
pub use inferrer::{InputParam, Inferrer, OutputColumn, ResultKind, SourceQuery, TypedQuery};
pub use orchestrator::{GenerationOutput, GenerationStats, Orchestrator, generate};
pub use resolver::TypeResolver;
pub use target::{CompositeType, EnumType, OpaqueType, TargetType};

#[cfg(test)]
mod tests;
