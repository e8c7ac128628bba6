//! search command - Find items by name
//!
//! By default searches the children of one folder (the working directory
//! unless a path is given) for names containing the query. `--everywhere`
//! searches the whole drive instead, and accepts type and modification-time
//! filters that are all required to match.

use clap::Args;
use gdc_core::{DriveStore, Node, SearchQuery, Session};
use serde::Serialize;

use super::ls::{render_entry, render_table};
use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Search by name in a folder, or across the drive
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Substring to look for in names
    pub query: String,

    /// Folder to search in (default: working directory)
    #[arg(conflicts_with = "everywhere")]
    pub path: Option<String>,

    /// Search the whole drive instead of one folder
    #[arg(short, long)]
    pub everywhere: bool,

    /// Only items with exactly this content type
    #[arg(long, requires = "everywhere")]
    pub mime_type: Option<String>,

    /// Only items modified after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, requires = "everywhere", value_parser = parse_time)]
    pub modified_after: Option<jiff::Timestamp>,

    /// Only items modified before this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, requires = "everywhere", value_parser = parse_time)]
    pub modified_before: Option<jiff::Timestamp>,

    /// Maximum number of results
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Show type, size, modification time and id
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct SearchOutput {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    items: Vec<Node>,
}

/// Accept a full timestamp or a bare date (midnight UTC)
fn parse_time(raw: &str) -> Result<jiff::Timestamp, String> {
    if let Ok(ts) = raw.parse::<jiff::Timestamp>() {
        return Ok(ts);
    }
    raw.parse::<jiff::civil::Date>()
        .ok()
        .and_then(|date| date.to_zoned(jiff::tz::TimeZone::UTC).ok())
        .map(|zoned| zoned.timestamp())
        .ok_or_else(|| format!("'{raw}' is not an RFC 3339 timestamp or YYYY-MM-DD date"))
}

/// Execute the search command
pub async fn execute(args: SearchArgs, ctx: &Context) -> ExitCode {
    let session = match ctx.open().await {
        Ok(session) => session,
        Err(code) => return code,
    };
    run(&args, &session, &ctx.formatter).await
}

pub(crate) async fn run<S: DriveStore>(
    args: &SearchArgs,
    session: &Session<S>,
    formatter: &Formatter,
) -> ExitCode {
    let (scope, result) = if args.everywhere {
        let query = SearchQuery {
            name_contains: Some(args.query.clone()).filter(|q| !q.is_empty()),
            mime_type: args.mime_type.clone(),
            modified_after: args.modified_after,
            modified_before: args.modified_before,
            max_results: args.limit,
        };
        (None, session.search_all(&query).await)
    } else {
        let scope = session.absolute(args.path.as_deref().unwrap_or_default());
        let result = session
            .search(&args.query, Some(scope.as_str()), args.limit)
            .await;
        (Some(scope.to_string()), result)
    };

    let items = match result {
        Ok(items) => items,
        Err(e) => return fail(formatter, &format!("Search for '{}' failed", args.query), &e),
    };

    if formatter.is_json() {
        formatter.json(&SearchOutput {
            query: args.query.clone(),
            scope,
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
