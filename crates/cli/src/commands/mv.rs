//! mv command - Move or rename
//!
//! An existing destination folder receives the source under its current
//! name; any other destination renames the source inside that path's parent.

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Move or rename a file or folder
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Source path
    pub source: String,

    /// Destination folder or new path
    pub target: String,
}

#[derive(Debug, Serialize)]
struct MvOutput {
    source: String,
    target: String,
    id: String,
}

/// Execute the mv command
pub async fn execute(args: MvArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &MvArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let source = session.absolute(&args.source);
    match session.mv(&args.source, &args.target).await {
        Ok(placed) => {
            if formatter.is_json() {
                formatter.json(&MvOutput {
                    source: source.to_string(),
                    target: placed.path.to_string(),
                    id: placed.node.id,
                });
            } else {
                formatter.success(&format!("Moved {source} → {}", placed.path));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Failed to move '{source}'"), &e),
    }
}
