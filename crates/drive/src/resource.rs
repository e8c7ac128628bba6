//! Drive API response bodies

use gdc_core::{Error, FOLDER_MIME_TYPE, Node};
use serde::Deserialize;

/// A `files` resource; every field is optional on the wire
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    /// Decimal string; absent for folders and native documents
    pub size: Option<String>,
    pub modified_time: Option<jiff::Timestamp>,
}

/// One page of a `files.list` response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileResource>,
    pub next_page_token: Option<String>,
}

/// Error body returned by the API on failure
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorReason {
    #[serde(default)]
    pub reason: String,
}

/// 403 reasons that report a rate or quota limit, not a permission problem
const LIMIT_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
    "sharingRateLimitExceeded",
    "storageQuotaExceeded",
];

impl ErrorDetail {
    /// Whether any reason is a rate or quota limit
    pub fn is_limit(&self) -> bool {
        self.errors
            .iter()
            .any(|e| LIMIT_REASONS.contains(&e.reason.as_str()))
    }
}

impl TryFrom<FileResource> for Node {
    type Error = Error;

    fn try_from(resource: FileResource) -> Result<Self, Self::Error> {
        let missing = |field: &str| Error::Protocol(format!("file resource is missing '{field}'"));
        let id = resource.id.ok_or_else(|| missing("id"))?;
        let name = resource.name.ok_or_else(|| missing("name"))?;
        let mime_type = resource.mime_type.ok_or_else(|| missing("mimeType"))?;

        let mut node = if mime_type == FOLDER_MIME_TYPE {
            Node::folder(id, name, resource.parents)
        } else {
            match resource.size {
                Some(size) => {
                    let size: u64 = size.parse().map_err(|_| {
                        Error::Protocol(format!("invalid size '{size}' for '{name}'"))
                    })?;
                    Node::file(id, name, resource.parents, mime_type, size)
                }
                None => Node {
                    size_bytes: None,
                    size_human: None,
                    ..Node::file(id, name, resource.parents, mime_type, 0)
                },
            }
        };
        node.modified_time = resource.modified_time;
        Ok(node)
    }
}
