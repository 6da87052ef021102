//! gitcc - bidirectional history bridge between Git and ClearCase
//!
//! Binary entry point.

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitcc::config::Config;
use gitcc::git::constants::special;
use gitcc::sync::{Bridge, CheckinOptions, RebaseOptions, RebaseOutcome};

#[derive(Parser)]
#[command(name = "gitcc")]
#[command(version, about = "Synchronize a Git repository with a ClearCase view", long_about = None)]
struct Cli {
    /// Configuration file (defaults to .git/gitcc.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log every git and cleartool invocation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay new ClearCase history as Git commits
    Rebase {
        /// Stash local modifications around the rebase
        #[arg(long)]
        stash: bool,

        /// Print the change groups instead of committing them
        #[arg(long)]
        dry_run: bool,

        /// Print the raw lshistory output instead of committing it
        #[arg(long)]
        lshistory: bool,

        /// Replay a saved lshistory output
        #[arg(long, value_name = "FILE")]
        load: Option<PathBuf>,

        /// Sub-directory of the repository the view maps onto
        #[arg(long)]
        subdir: Option<String>,
    },

    /// Check in Git commits made since the last synchronization
    Checkin {
        /// Check in even when ClearCase changed since the last rebase
        #[arg(short, long)]
        force: bool,

        /// Do not deliver the stream afterwards (UCM)
        #[arg(long)]
        no_deliver: bool,

        /// Check in the whole history of HEAD
        #[arg(long)]
        initial: bool,

        /// Follow every parent, not only the first-parent chain
        #[arg(long)]
        all: bool,

        /// Label applied to every checked-in element
        #[arg(long, value_name = "LABEL")]
        cclabel: Option<String>,

        /// Sub-directory of the repository the view maps onto
        #[arg(long)]
        subdir: Option<String>,
    },

    /// Mark a commit as synchronized with ClearCase
    Reset {
        /// Commit to mark
        #[arg(default_value = special::HEAD)]
        commit: String,

        /// Sub-directory of the repository the view maps onto
        #[arg(long)]
        subdir: Option<String>,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let git_dir = env::current_dir()?;
    let config = Config::load(
        &cli
            .config
            .unwrap_or_else(|| Config::default_path(&git_dir)),
    )?;

    match cli.command {
        Commands::Rebase {
            stash,
            dry_run,
            lshistory,
            load,
            subdir,
        } => {
            let bridge = Bridge::new(config, git_dir, subdir.as_deref())?;
            let options = RebaseOptions {
                stash,
                dry_run,
                print_history: lshistory,
                load,
            };
            match bridge.rebase(&options)? {
                RebaseOutcome::History(history) => print!("{}", history),
                RebaseOutcome::DryRun(groups) => {
                    for group in groups {
                        print!("{}", group);
                    }
                }
                RebaseOutcome::UpToDate => println!("Already up to date."),
                RebaseOutcome::Replayed { groups, commits } => {
                    println!("Replayed {} change groups as {} commits.", groups, commits);
                }
            }
        }
        Commands::Checkin {
            force,
            no_deliver,
            initial,
            all,
            cclabel,
            subdir,
        } => {
            let bridge = Bridge::new(config, git_dir, subdir.as_deref())?;
            let options = CheckinOptions {
                ignore_conflicts: force,
                label: cclabel.filter(|l| !l.is_empty()),
                initial,
                all_parents: all,
                deliver: !no_deliver,
            };
            let commits = bridge.checkin(&options)?;
            println!("Checked in {} commits.", commits);
        }
        Commands::Reset { commit, subdir } => {
            let bridge = Bridge::new(config, git_dir, subdir.as_deref())?;
            bridge.reset(&commit)?;
        }
    }

    Ok(())
}

/// Log to stderr, honouring `RUST_LOG` and defaulting to `info` (`debug` with `-v`)
fn init_logging(verbose: bool) {
    let default = if verbose { "gitcc=debug" } else { "gitcc=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
