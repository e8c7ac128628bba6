//! mkdir command - Create a folder and any missing parents
//!
//! Succeeds without changes when the folder already exists.

use clap::Args;
use gdc_core::{DriveStore, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Create a folder
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Folder path to create
    pub path: String,
}

#[derive(Debug, Serialize)]
struct MkdirOutput {
    path: String,
    id: String,
}

/// Execute the mkdir command
pub async fn execute(args: MkdirArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &MkdirArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    match session.mkdir(&args.path).await {
        Ok(placed) => {
            if formatter.is_json() {
                formatter.json(&MkdirOutput {
                    path: placed.path.to_string(),
                    id: placed.node.id,
                });
            } else {
                formatter.success(&format!("Created folder {} (id: {})", placed.path, placed.node.id));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, &format!("Failed to create '{}'", args.path), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use gdc_core::ROOT_ID;

    #[tokio::test]
    async fn test_mkdir() {
        let session = test_support::session();
        session.store().seed_file(ROOT_ID, "file", b"").unwrap();
        let formatter = test_support::quiet();

        let mkdir = |path: &str| MkdirArgs { path: path.into() };
        assert_eq!(run(&mkdir("/a/b"), &session, &formatter).await, ExitCode::Success);
        assert_eq!(run(&mkdir("/a/b"), &session, &formatter).await, ExitCode::Success);
        assert_eq!(session.store().node_count(), 3);
        assert_eq!(run(&mkdir("/file/sub"), &session, &formatter).await, ExitCode::WrongType);
    }
}
