use std::path::Path;

use kpet::Database;
use tracing::instrument;

use super::OutputFormat;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: TreeCommand,
}

#[derive(Debug, clap::Parser)]
enum TreeCommand {
    /// List the names of all declared trees
    List(List),
}

#[derive(Debug, clap::Parser)]
struct List {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "plain")]
    output: OutputFormat,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, db: &Path) -> anyhow::Result<()> {
        let database = Database::open(db)?;

        match self.command {
            TreeCommand::List(list) => {
                let names: Vec<_> = database.trees().iter().map(|tree| tree.name()).collect();
                list.output.print(&names)
            }
        }
    }
}
