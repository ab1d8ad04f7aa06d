use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sqlinfer")]
#[command(author, version, about = "Infer parameter and result types of SQL queries from a live database")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Type every query in a manifest and write the typed queries as JSON
  Infer(InferCommand),
}

#[derive(Args, Debug)]
pub struct InferCommand {
  /// Connection string of the database to prepare queries against
  #[arg(long, env = "DATABASE_URL", value_name = "URL", hide_env_values = true)]
  pub database_url: String,

  /// Path to the JSON query manifest
  #[arg(long, value_name = "FILE")]
  pub queries: PathBuf,

  /// Path where the typed queries will be written (default: stdout)
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Package path that receives generated enum and composite types
  #[arg(long, value_name = "PATH")]
  pub package_path: String,

  /// Map a catalog type onto a qualified target type (e.g., text=github.com/jackc/pgtype.Text)
  #[arg(long = "type-override", value_name = "NAME=TYPE")]
  pub type_overrides: Vec<String>,

  /// Word to render as an acronym, optionally with its rendering (e.g., id or oids=OIDs)
  #[arg(long = "acronym", value_name = "WORD[=RENDERING]")]
  pub acronyms: Vec<String>,

  /// Abort the whole run after this many seconds
  #[arg(long, value_name = "SECS")]
  pub timeout: Option<u64>,

  /// Enable verbose output with per-query details
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}
