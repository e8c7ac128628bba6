//! Drive `q` filter expressions
//!
//! String literals in a query are single-quoted; backslashes and single
//! quotes inside them must be escaped with a backslash.

use gdc_core::{ListOptions, NameFilter, SearchQuery};

/// Fields requested for every file resource
pub const FILE_FIELDS: &str = "id,name,mimeType,parents,size,modifiedTime";

/// Fields requested for a listing page
pub const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,parents,size,modifiedTime)";

/// Quote a value as a query string literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Non-trashed children of `parent_id`, optionally filtered by name
pub fn children(parent_id: &str, options: &ListOptions) -> String {
    let mut clauses = vec![format!("{} in parents", quote(parent_id)), "trashed=false".to_string()];
    match &options.name {
        Some(NameFilter::Exact(name)) => clauses.push(format!("name={}", quote(name))),
        Some(NameFilter::Contains(fragment)) => {
            clauses.push(format!("name contains {}", quote(fragment)))
        }
        None => {}
    }
    clauses.join(" and ")
}

/// Drive-wide search; every set predicate is ANDed
pub fn search(query: &SearchQuery) -> String {
    let mut clauses = vec!["trashed=false".to_string()];
    if let Some(name) = &query.name_contains {
        clauses.push(format!("name contains {}", quote(name)));
    }
    if let Some(mime) = &query.mime_type {
        clauses.push(format!("mimeType={}", quote(mime)));
    }
    if let Some(after) = query.modified_after {
        clauses.push(format!("modifiedTime > {}", quote(&after.to_string())));
    }
    if let Some(before) = query.modified_before {
        clauses.push(format!("modifiedTime < {}", quote(&before.to_string())));
    }
    clauses.join(" and ")
}
