//! cp command - Copy a file
//!
//! Destination handling matches `mv`. Folders cannot be copied.

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Copy a file
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source file
    pub source: String,

    /// Destination folder or new path
    pub target: String,
}

#[derive(Debug, Serialize)]
struct CpOutput {
    source: String,
    target: String,
    id: String,
}

/// Execute the cp command
pub async fn execute(args: CpArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &CpArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let source = session.absolute(&args.source);
    match session.cp(&args.source, &args.target).await {
        Ok(placed) => {
            if formatter.is_json() {
                formatter.json(&CpOutput {
                    source: source.to_string(),
                    target: placed.path.to_string(),
                    id: placed.node.id,
                });
            } else {
                formatter.success(&format!(
                    "Copied {source} → {} (id: {})",
                    placed.path, placed.node.id
                ));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Failed to copy '{source}'"), &e),
    }
}
