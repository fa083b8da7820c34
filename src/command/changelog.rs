//! `changelog --source <S> --target <T>` (§4.M): prints, per direction, a
//! `repoName -> [revisions]` table.

use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::{config::Config, error::Result};

#[derive(Debug, Args)]
pub struct ChangelogArgs {
    /// The source build number (the "from" side of the diff).
    #[arg(long)]
    pub source: String,

    /// The target build number (the "to" side of the diff).
    #[arg(long)]
    pub target: String,
}

pub async fn run(config: &Config, args: &ChangelogArgs, cancellation: &CancellationToken) -> Result<()> {
    let result = crate::run_changelog(config, &args.source, &args.target, cancellation).await?;

    println!("additions ({} -> {}):", args.source, args.target);
    print_direction(&result.additions);

    println!("removals ({} -> {}):", args.source, args.target);
    print_direction(&result.removals);

    Ok(())
}

fn print_direction(direction: &std::collections::HashMap<String, Vec<buildcore_client::Commit>>) {
    let mut repos: Vec<_> = direction.keys().collect();
    repos.sort();
    for repo in repos {
        let commits = &direction[repo];
        let revisions: Vec<&str> = commits.iter().map(|c| c.id.as_str()).collect();
        println!("  {repo} -> {revisions:?}");
    }
}
