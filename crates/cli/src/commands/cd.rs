//! cd command - Change the working directory
//!
//! The target must resolve to a folder. The new directory is persisted before
//! it takes effect, so a failed write leaves the old one in place.

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Change the working directory
#[derive(Args, Debug)]
pub struct CdArgs {
    /// Target folder; `..` and relative paths are allowed
    pub path: String,
}

#[derive(Debug, Serialize)]
struct CdOutput {
    cwd: String,
}

/// Execute the cd command
pub async fn execute(args: CdArgs, ctx: &Context) -> ExitCode {
    let mut session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &mut session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &CdArgs,
    session: &mut Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    match session.cd(&args.path).await {
        Ok(cwd) => {
            if formatter.is_json() {
                formatter.json(&CdOutput {
                    cwd: cwd.to_string(),
                });
            } else {
                formatter.println(cwd.as_str());
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Cannot change directory to '{}'", args.path), &e),
    }
}
