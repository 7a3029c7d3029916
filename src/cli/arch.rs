use std::path::Path;

use kpet::Database;
use tracing::instrument;

use super::OutputFormat;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ArchCommand,
}

#[derive(Debug, clap::Parser)]
enum ArchCommand {
    /// List all declared architectures
    List {
        /// Output format
        #[arg(long, value_name = "FORMAT", default_value = "plain")]
        output: OutputFormat,
    },
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, db: &Path) -> anyhow::Result<()> {
        let database = Database::open(db)?;

        match self.command {
            ArchCommand::List { output } => output.print(database.arches()),
        }
    }
}
