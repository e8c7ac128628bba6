//! stat command - Show metadata for a path

use clap::Args;
use gdc_core::{DriveStore, Node, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Show metadata for a path
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Path to inspect
    pub path: String,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    path: String,
    #[serde(flatten)]
    node: Node,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &StatArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let path = session.absolute(&args.path);
    let node = match session.stat(path.as_str()).await {
        Ok(node) => node,
        Err(e) => return fail(formatter, &format!("Failed to stat '{path}'"), &e),
    };

    if formatter.is_json() {
        formatter.json(&StatOutput {
            path: path.to_string(),
            node,
        });
    } else {
        for line in render(path.as_str(), &node) {
            formatter.println(&line);
        }
    }
    ExitCode::Success
}

fn render(path: &str, node: &Node) -> Vec<String> {
    let mut lines = vec![
        format!("Path     : {path}"),
        format!("Name     : {}", node.name),
        format!("ID       : {}", node.id),
        format!(
            "Type     : {}",
            if node.is_folder { "folder" } else { "file" }
        ),
        format!("MIME     : {}", node.mime_type),
    ];
    if let (Some(bytes), Some(human)) = (node.size_bytes, &node.size_human) {
        lines.push(format!("Size     : {human} ({bytes} bytes)"));
    }
    if let Some(modified) = node.modified_time {
        lines.push(format!("Modified : {}", modified.strftime("%Y-%m-%d %H:%M:%S UTC")));
    }
    if !node.parent_ids.is_empty() {
        lines.push(format!("Parents  : {}", node.parent_ids.join(", ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use gdc_core::ROOT_ID;

    #[test]
    fn test_render_folder() {
        let node = Node::folder("f1", "Docs", vec!["root".into()]);
        insta::assert_snapshot!(render("/Docs", &node).join("\n"), @r"
        Path     : /Docs
        Name     : Docs
        ID       : f1
        Type     : folder
        MIME     : application/vnd.google-apps.folder
        Parents  : root
        ");
    }

    #[tokio::test]
    async fn test_stat_missing() {
        let session = test_support::session();
        session.store().seed_folder(ROOT_ID, "Docs").unwrap();
        let formatter = test_support::quiet();

        let stat = |path: &str| StatArgs { path: path.into() };
        assert_eq!(run(&stat("/Docs"), &session, &formatter).await, ExitCode::Success);
        assert_eq!(run(&stat("/"), &session, &formatter).await, ExitCode::Success);
        assert_eq!(run(&stat("/none"), &session, &formatter).await, ExitCode::NotFound);
    }
}
