use clap::Parser;

use crate::ui::{Cli, Commands};

mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Commands::Infer(command) => {
      ui::init_logging(command.verbose, command.quiet);
      let config = ui::commands::InferConfig::from_command(command)?;
      ui::commands::infer_queries(config).await?;
    }
  }

  Ok(())
}
