//! is-dir command - Print whether a path is a folder

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Print whether a path is a folder
#[derive(Args, Debug)]
pub struct IsDirArgs {
    /// Path to check
    pub path: String,
}

#[derive(Debug, Serialize)]
struct IsDirOutput {
    path: String,
    is_dir: bool,
}

/// Execute the is-dir command
pub async fn execute(args: IsDirArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &IsDirArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let path = session.absolute(&args.path);
    match session.is_dir(path.as_str()).await {
        Ok(is_dir) => {
            if formatter.is_json() {
                formatter.json(&IsDirOutput {
                    path: path.to_string(),
                    is_dir,
                });
            } else {
                formatter.println(&is_dir.to_string());
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Failed to check '{path}'"), &e),
    }
}
