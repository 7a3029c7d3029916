use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use kpet::Database;
use tracing::{info, instrument};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: RunCommand,
}

#[derive(Debug, clap::Parser)]
enum RunCommand {
    /// Render the job XML for a tree and architecture
    Generate(Generate),

    /// Print the cases that would run, one `host/suite/case` per line
    PrintTestCases(Target),
}

/// Selects what a run is generated for.
#[derive(Debug, clap::Args)]
struct Target {
    /// The tree to run on
    #[arg(long, value_name = "NAME")]
    tree: String,

    /// The architecture to run on
    #[arg(short, long, value_name = "ARCH")]
    arch: String,
}

#[derive(Debug, clap::Parser)]
struct Generate {
    /// The tree to run on.
    ///
    /// Required unless a template is given, in which case it defaults to the
    /// template's file stem.
    #[arg(long, value_name = "NAME", required_unless_present = "template")]
    tree: Option<String>,

    /// The architecture to run on
    #[arg(short, long, value_name = "ARCH")]
    arch: String,

    /// Use this job template instead of the tree's own
    #[arg(short, long, value_name = "PATH")]
    template: Option<PathBuf>,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, db: &Path) -> anyhow::Result<()> {
        let database = Database::open(db)?;

        match self.command {
            RunCommand::Generate(command) => command.run(&database),
            RunCommand::PrintTestCases(target) => print_test_cases(&database, &target),
        }
    }
}

impl Generate {
    fn tree_name(&self) -> String {
        self.tree.clone().unwrap_or_else(|| {
            self.template
                .as_deref()
                .and_then(Path::file_stem)
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    fn run(self, database: &Database) -> anyhow::Result<()> {
        let tree = self.tree_name();
        let xml = kpet::render(database, &tree, &self.arch, self.template.as_deref())?;

        info!(%tree, arch = %self.arch, "generated job");

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{xml}")?;
        Ok(())
    }
}

fn print_test_cases(database: &Database, target: &Target) -> anyhow::Result<()> {
    let hosts = kpet::select(database, &target.tree, &target.arch)?;

    let mut stdout = io::stdout().lock();
    for host in &hosts {
        for (suite, case) in host.cases() {
            writeln!(
                stdout,
                "{}/{}/{}",
                host.host_type.name(),
                suite.description(),
                case.name()
            )?;
        }
    }
    Ok(())
}
