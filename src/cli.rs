use std::path::{Path, PathBuf};

mod arch;
mod host_type;
mod run;
mod tree;

use clap::ArgAction;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the database directory
    #[arg(short, long, default_value = ".", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(&self.db)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // stdout carries rendered jobs
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Inspect the trees declared in the database
    Tree(tree::Command),

    /// Inspect the architectures declared in the database
    Arch(arch::Command),

    /// Inspect the host types declared in the database
    HostType(host_type::Command),

    /// Generate test runs
    Run(run::Command),
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    fn run(self, db: &Path) -> anyhow::Result<()> {
        match self {
            Self::Tree(command) => command.run(db)?,
            Self::Arch(command) => command.run(db)?,
            Self::HostType(command) => command.run(db)?,
            Self::Run(command) => command.run(db)?,
        }
        Ok(())
    }
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// One item per line
    #[default]
    Plain,
    /// A JSON array
    Json,
}

impl OutputFormat {
    fn print<T: serde::Serialize + std::fmt::Display>(self, items: &[T]) -> anyhow::Result<()> {
        match self {
            Self::Plain => {
                for item in items {
                    println!("{item}");
                }
            }
            Self::Json => println!("{}", serde_json::to_string_pretty(items)?),
        }
        Ok(())
    }
}
