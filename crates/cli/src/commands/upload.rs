//! upload command - Upload a local file
//!
//! Without a remote path the file lands in the working directory under its
//! own name. An existing remote folder receives the file under its own name;
//! any other remote path names the new file inside its existing parent.

use std::path::PathBuf;

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Upload a local file
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    pub local: PathBuf,

    /// Remote folder or full destination path
    pub remote: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    local: String,
    path: String,
    id: String,
    mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &UploadArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Uploading {}", args.local.display()),
    );
    let result = session.upload(&args.local, args.remote.as_deref()).await;
    spinner.finish_and_clear();

    match result {
        Ok(placed) => {
            if formatter.is_json() {
                formatter.json(&UploadOutput {
                    local: args.local.display().to_string(),
                    path: placed.path.to_string(),
                    id: placed.node.id,
                    mime_type: placed.node.mime_type,
                    size_bytes: placed.node.size_bytes,
                });
            } else {
                formatter.success(&format!(
                    "Uploaded {} → {} (id: {})",
                    args.local.display(),
                    placed.path,
                    placed.node.id
                ));
            }
            ExitCode::Success
        }
        Err(e) => fail(
            formatter,
            &format!("Failed to upload '{}'", args.local.display()),
            &e,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use gdc_core::ROOT_ID;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_exit_codes() {
        let session = test_support::session();
        session.store().seed_folder(ROOT_ID, "Dest").unwrap();
        let formatter = test_support::quiet();

        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join("report.csv");
        std::fs::write(&local, "a,b\n").unwrap();

        let upload = |remote: Option<&str>| UploadArgs {
            local: local.clone(),
            remote: remote.map(String::from),
        };
        assert_eq!(run(&upload(Some("/Dest")), &session, &formatter).await, ExitCode::Success);
        assert!(session.exists("/Dest/report.csv").await.unwrap());

        assert_eq!(
            run(&upload(Some("/Missing/x.csv")), &session, &formatter).await,
            ExitCode::NotFound
        );

        let missing_local = UploadArgs {
            local: temp_dir.path().join("absent.txt"),
            remote: None,
        };
        assert_eq!(
            run(&missing_local, &session, &formatter).await,
            ExitCode::LocalIoError
        );
    }
}
