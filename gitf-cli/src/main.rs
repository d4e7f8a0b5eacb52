use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{checkpoint, commit, create, delete, init, list, stage, unstage, Context};

#[derive(Parser)]
#[command(name = "gitf")]
#[command(version, about = "Prepare several git commits side by side", long_about = None)]
struct Cli {
    /// Directory holding the gitf database and staged files
    #[arg(long, global = true, env = "GITF_STORAGE_DIR")]
    storage: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the current directory as a project
    Init {
        /// Project name (defaults to the directory name)
        name: Option<String>,
    },

    /// Create a commit, optionally staging files into it
    Create {
        /// Commit name
        name: String,

        /// Files, directories or glob patterns
        files: Vec<String>,
    },

    /// Stage files into a commit and revert them in the working tree
    Stage {
        /// Commit name
        name: String,

        /// Files, directories or glob patterns
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Remove files from a commit
    Unstage {
        /// Commit name
        name: String,

        /// Files, directories or glob patterns
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Delete a commit and its staged files
    Delete {
        /// Commit name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List the commits of the current project
    List,

    /// Commit the staged files to git and merge them into the current branch
    Commit {
        /// Commit name
        name: String,

        /// Arguments passed to `git commit`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        git_args: Vec<String>,
    },

    /// Create, list or restore checkpoints
    #[command(visible_alias = "chk")]
    Checkpoint {
        /// List checkpoints instead of creating one
        #[arg(short, long, conflicts_with = "restore")]
        list: bool,

        /// Restore the last N checkpoints (default 1)
        #[arg(short, long, value_name = "N", num_args = 0..=1, default_missing_value = "1")]
        restore: Option<usize>,
    },

    /// Restore the last N checkpoints
    Restore {
        /// Number of checkpoints to restore
        #[arg(default_value_t = 1)]
        amount: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut ctx = Context::load(cli.storage)?;

    match cli.command {
        Commands::Init { name } => {
            init::run(&mut ctx, name)?;
        }
        Commands::Create { name, files } => {
            create::run(&mut ctx, name, files)?;
        }
        Commands::Stage { name, files } => {
            stage::run(&mut ctx, name, files)?;
        }
        Commands::Unstage { name, files } => {
            unstage::run(&mut ctx, name, files)?;
        }
        Commands::Delete { name, yes } => {
            delete::run(&mut ctx, name, yes)?;
        }
        Commands::List => {
            list::run(&ctx)?;
        }
        Commands::Commit { name, git_args } => {
            commit::run(&mut ctx, name, git_args)?;
        }
        Commands::Checkpoint { list: true, .. } => {
            checkpoint::list(&ctx)?;
        }
        Commands::Checkpoint {
            restore: Some(amount),
            ..
        } => {
            checkpoint::restore(&mut ctx, amount)?;
        }
        Commands::Checkpoint { .. } => {
            checkpoint::create(&mut ctx)?;
        }
        Commands::Restore { amount } => {
            checkpoint::restore(&mut ctx, amount)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_commit_forwards_git_arguments() {
        let cli = Cli::parse_from(["gitf", "commit", "feat", "-m", "Add feature", "--no-verify"]);

        match cli.command {
            Commands::Commit { name, git_args } => {
                assert_eq!(name, "feat");
                assert_eq!(git_args, vec!["-m", "Add feature", "--no-verify"]);
            }
            _ => panic!("expected commit"),
        }
    }

    #[test]
    fn test_chk_restore_defaults_to_one() {
        let cli = Cli::parse_from(["gitf", "chk", "-r"]);

        assert!(matches!(
            cli.command,
            Commands::Checkpoint {
                list: false,
                restore: Some(1)
            }
        ));
    }

    #[test]
    fn test_checkpoint_restore_takes_count() {
        let cli = Cli::parse_from(["gitf", "checkpoint", "--restore", "3"]);

        assert!(matches!(
            cli.command,
            Commands::Checkpoint {
                restore: Some(3),
                ..
            }
        ));
    }

    #[test]
    fn test_stage_requires_files() {
        assert!(Cli::try_parse_from(["gitf", "stage", "feat"]).is_err());
    }
}
