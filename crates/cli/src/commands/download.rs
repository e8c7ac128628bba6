//! download command - Download a remote file
//!
//! An existing local directory (or a path ending in a separator) receives the
//! file under its remote name. Missing local parent directories are created.

use std::path::PathBuf;

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Download a remote file
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Remote file path
    pub remote: String,

    /// Local destination file or directory
    pub local: PathBuf,
}

#[derive(Debug, Serialize)]
struct DownloadOutput {
    path: String,
    local: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &DownloadArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = ProgressBar::spinner(formatter.config(), &format!("Downloading {}", args.remote));
    let result = session.download(&args.remote, &args.local).await;
    spinner.finish_and_clear();

    match result {
        Ok(done) => {
            if formatter.is_json() {
                formatter.json(&DownloadOutput {
                    path: done.source.to_string(),
                    local: done.local_path.display().to_string(),
                    size_bytes: done.size_bytes,
                    size_human: humansize::format_size(done.size_bytes, humansize::BINARY),
                });
            } else {
                formatter.success(&format!(
                    "Downloaded {} → {}",
                    done.source,
                    done.local_path.display()
                ));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Failed to download '{}'", args.remote), &e),
    }
}
