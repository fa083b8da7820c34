//! CLI subcommands (§4.M): thin argument-parsing and presentation layers
//! over the two entry points in the library crate.

pub mod changelog;
pub mod find_build;

use clap::{Parser, Subcommand};

use crate::config::CliOverrides;

#[derive(Debug, Parser)]
#[command(name = "buildcore", about = "Changelog and build-localization core")]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity; repeat for more (`-v`, `-vv`).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file (default: `~/.config/buildcore/config.toml`).
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[arg(long, global = true)]
    pub code_review_host: Option<String>,

    #[arg(long, global = true)]
    pub git_host: Option<String>,

    #[arg(long, global = true)]
    pub manifest_repo: Option<String>,

    #[arg(long, global = true)]
    pub repo_prefix: Option<String>,
}

impl From<ConfigArgs> for CliOverrides {
    fn from(args: ConfigArgs) -> Self {
        CliOverrides {
            config_path: args.config,
            code_review_host: args.code_review_host,
            git_host: args.git_host,
            manifest_repo: args.manifest_repo,
            repo_prefix: args.repo_prefix,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print added/removed revisions per repository between two builds.
    Changelog(changelog::ChangelogArgs),
    /// Print the earliest build number containing a change.
    FindBuild(find_build::FindBuildArgs),
}
