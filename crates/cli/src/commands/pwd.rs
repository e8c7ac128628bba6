//! pwd command - Print the working directory
//!
//! Reads the persisted working directory only; no drive access.

use clap::Args;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Print the working directory
#[derive(Args, Debug)]
pub struct PwdArgs {}

#[derive(Debug, Serialize)]
struct PwdOutput {
    cwd: String,
}

/// Execute the pwd command
pub async fn execute(_args: PwdArgs, ctx: &Context) -> ExitCode {
    let cwd = ctx.navigation().cwd().to_string();
    if ctx.formatter.is_json() {
        ctx.formatter.json(&PwdOutput { cwd });
    } else {
        ctx.formatter.println(&cwd);
    }
    ExitCode::Success
}
