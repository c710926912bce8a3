use anyhow::Result;
use clap::{Parser, Subcommand};
use minigit::areas::repository::Repository;
use minigit::commands::porcelain::log::LogOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log filter, in `EnvFilter` syntax
const LOG_ENV: &str = "MINIGIT_LOG";

#[derive(Parser)]
#[command(
    name = "minigit",
    version = "0.1.0",
    about = "A minimal version-control engine",
    long_about = "A minimal version-control engine with content-addressed storage, \
    branches, a staging index and three-way merges.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stores the current content of the given files as blobs and stages them. \
        Directories are added recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Record the staged changes as a new commit",
        long_about = "This command creates a new commit from the staged files on top of HEAD."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "log",
        about = "Show the commit history",
        long_about = "This command lists the commits reachable from HEAD through first parents, newest first."
    )]
    Log {
        #[arg(long, help = "Show one commit per line")]
        oneline: bool,
    },
    #[command(
        name = "branch",
        about = "Create or list branches",
        long_about = "With a name, this command creates a branch at HEAD or at the given start point. \
        Without arguments it lists the branches."
    )]
    Branch {
        #[arg(index = 1, help = "The name of the branch to create")]
        name: Option<String>,
        #[arg(index = 2, requires = "name", help = "The branch or commit to start from")]
        start_point: Option<String>,
    },
    #[command(
        name = "checkout",
        about = "Switch to a branch or commit",
        long_about = "This command moves HEAD to the given branch or commit and rewrites the working tree to match it."
    )]
    Checkout {
        #[arg(index = 1, help = "The branch name or commit id")]
        target: String,
    },
    #[command(
        name = "merge",
        about = "Merge a branch or commit into HEAD",
        long_about = "This command fast-forwards when possible and otherwise performs a three-way merge. \
        Conflicts are written to the working tree and left for an explicit commit."
    )]
    Merge {
        #[arg(index = 1, help = "The branch name or commit id to merge")]
        target: String,
    },
    #[command(
        name = "diff",
        about = "List the files that differ between two commits",
        long_about = "This command reports the paths added, deleted or modified from the first commit to the second."
    )]
    Diff {
        #[arg(index = 1, help = "The branch or commit to compare from")]
        from: String,
        #[arg(index = 2, help = "The branch or commit to compare to")]
        to: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn open_current() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Ok(Repository::open(pwd)?)
}

fn print_summary(summary: impl std::fmt::Display) {
    let summary = summary.to_string();
    let summary = summary.trim_end_matches('\n');
    if !summary.is_empty() {
        println!("{summary}");
    }
}

fn main() -> Result<()> {
    init_tracing();
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => path,
                None => std::env::current_dir()?,
            };
            print_summary(Repository::init(path)?);
        }
        Commands::Add { paths } => print_summary(open_current()?.add(&paths)?),
        Commands::Commit { message } => print_summary(open_current()?.commit(&message)?),
        Commands::Log { oneline } => print_summary(open_current()?.log(LogOptions { oneline })?),
        Commands::Branch { name, start_point } => {
            let repository = open_current()?;
            match name {
                Some(name) => print_summary(repository.branch(&name, start_point.as_deref())?),
                None => print_summary(repository.branches()?),
            }
        }
        Commands::Checkout { target } => print_summary(open_current()?.checkout(&target)?),
        Commands::Merge { target } => {
            let outcome = open_current()?.merge(&target)?;
            print_summary(&outcome);
            if !outcome.conflicts().is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Diff { from, to } => print_summary(open_current()?.diff(&from, &to)?),
    }

    Ok(())
}
