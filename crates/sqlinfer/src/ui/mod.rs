pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, InferCommand};

/// `RUST_LOG` wins over both flags.
pub fn init_logging(verbose: bool, quiet: bool) {
  let default_filter = match (verbose, quiet) {
    (true, _) => "debug",
    (false, true) => "error",
    (false, false) => "info",
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}
