//! rm command - Remove a file or folder
//!
//! Removing a folder takes its whole subtree with it; there is no
//! confirmation step. The drive root cannot be removed.

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove a file or folder
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Path to remove
    pub path: String,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    removed: String,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &RmArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    match session.rm(&args.path).await {
        Ok(path) => {
            if formatter.is_json() {
                formatter.json(&RmOutput {
                    removed: path.to_string(),
                });
            } else {
                formatter.success(&format!("Removed {path}"));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Failed to remove '{}'", args.path), &e),
    }
}
