//! ls command - List the children of a folder
//!
//! Lists the immediate children of a folder (default: the working directory).
//! `--long` renders a table with type, size, modification time and id.

use clap::Args;
use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, Table};
use gdc_core::{DriveStore, Node, Session};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List the children of a folder
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote folder (absolute or relative to the working directory)
    pub path: Option<String>,

    /// Maximum number of entries (default from config)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Show type, size, modification time and id
    #[arg(short, long)]
    pub long: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    path: String,
    items: Vec<Node>,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    let limit = args.limit.unwrap_or(ctx.config.defaults.list_limit);
    run(&args, limit, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &LsArgs,
    limit: usize,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    if limit == 0 {
        formatter.error("--limit must be at least 1");
        return ExitCode::UsageError;
    }

    let path = session.absolute(args.path.as_deref().unwrap_or_default());
    let items = match session.ls(Some(path.as_str()), Some(limit)).await {
        Ok(items) => items,
        Err(e) => return fail(formatter, &format!("Failed to list '{path}'"), &e),
    };

    if formatter.is_json() {
        formatter.json(&LsOutput {
            path: path.to_string(),
            items,
        });
    } else if args.long {
        if !items.is_empty() {
            formatter.println(&render_table(&items));
        }
    } else {
        for item in &items {
            formatter.println(&render_entry(item, formatter));
        }
    }

    ExitCode::Success
}

/// Short form: folders carry a trailing slash
pub(crate) fn render_entry(node: &Node, formatter: &Formatter) -> String {
    if node.is_folder {
        formatter.highlight(&format!("{}/", node.name))
    } else {
        node.name.clone()
    }
}

/// Long form table
pub(crate) fn render_table(nodes: &[Node]) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["NAME", "TYPE", "SIZE", "MODIFIED", "ID"]);

    for node in nodes {
        let kind = if node.is_folder {
            "folder".to_string()
        } else {
            node.mime_type.clone()
        };
        let size = node.size_human.clone().unwrap_or_else(|| "-".to_string());
        let modified = node
            .modified_time
            .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let name = if node.is_folder {
            format!("{}/", node.name)
        } else {
            node.name.clone()
        };

        table.add_row(vec![
            Cell::new(name),
            Cell::new(kind),
            Cell::new(size).set_alignment(CellAlignment::Right),
            Cell::new(modified),
            Cell::new(&node.id),
        ]);
    }

    table.to_string()
}
