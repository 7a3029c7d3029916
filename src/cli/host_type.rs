use std::{fmt, path::Path};

use kpet::{Database, HostType};
use serde::Serialize;
use tracing::instrument;

use super::OutputFormat;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: HostTypeCommand,
}

#[derive(Debug, clap::Parser)]
enum HostTypeCommand {
    /// List all declared host types
    List {
        /// Only list host types that get their own job section
        #[arg(long)]
        eligible: bool,

        /// Output format
        #[arg(long, value_name = "FORMAT", default_value = "plain")]
        output: OutputFormat,
    },
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    name: &'a str,
    ignore_panic: bool,
}

impl<'a> From<&'a HostType> for Row<'a> {
    fn from(host_type: &'a HostType) -> Self {
        Self {
            name: host_type.name(),
            ignore_panic: host_type.ignore_panic(),
        }
    }
}

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ignore_panic {
            write!(f, "{} (ignore panic)", self.name)
        } else {
            f.write_str(self.name)
        }
    }
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, db: &Path) -> anyhow::Result<()> {
        let database = Database::open(db)?;

        match self.command {
            HostTypeCommand::List { eligible, output } => {
                let rows: Vec<Row<'_>> = if eligible {
                    database.eligible_host_types().map(Row::from).collect()
                } else {
                    database.host_types().iter().map(Row::from).collect()
                };
                output.print(&rows)
            }
        }
    }
}
