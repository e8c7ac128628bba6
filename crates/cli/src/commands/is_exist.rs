//! is-exist command - Print whether a path exists
//!
//! Prints `true` or `false` and exits 0 either way; only failures to ask
//! (auth, network) exit non-zero.

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Print whether a path exists
#[derive(Args, Debug)]
pub struct IsExistArgs {
    /// Path to check
    pub path: String,
}

#[derive(Debug, Serialize)]
struct IsExistOutput {
    path: String,
    exists: bool,
}

/// Execute the is-exist command
pub async fn execute(args: IsExistArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &IsExistArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let path = session.absolute(&args.path);
    match session.exists(path.as_str()).await {
        Ok(exists) => {
            if formatter.is_json() {
                formatter.json(&IsExistOutput {
                    path: path.to_string(),
                    exists,
                });
            } else {
                formatter.println(&exists.to_string());
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Failed to check '{path}'"), &e),
    }
}
