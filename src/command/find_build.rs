//! `find-build --change <identifier>` (§4.M): prints `{buildNum,
//! changeNumber}` as the final line of output, machine-parseable; all
//! progress goes to stderr via the logging layer.

use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{config::Config, error::Result};

#[derive(Debug, Args)]
pub struct FindBuildArgs {
    /// A change number, commit revision, or change-signature string.
    #[arg(long)]
    pub change: String,
}

#[derive(Serialize)]
struct FindBuildOutput {
    #[serde(rename = "buildNum")]
    build_num: String,
    #[serde(rename = "changeNumber")]
    change_number: u64,
}

pub async fn run(config: &Config, args: &FindBuildArgs, cancellation: &CancellationToken) -> Result<()> {
    let result = crate::run_find_build(config, &args.change, cancellation).await?;
    let output = FindBuildOutput {
        build_num: result.build_num,
        change_number: result.change_number,
    };
    println!("{}", serde_json::to_string(&output).map_err(|e| crate::error::Error::Config(e.to_string()))?);
    Ok(())
}
