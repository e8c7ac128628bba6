//! DriveStore trait definition
//!
//! This trait defines the interface the path layer needs from a remote drive.
//! The drive only knows identifiers and parent/child links; paths are built on
//! top of it by the resolver. The HTTP adapter lives in gdc-drive and the
//! in-memory implementation in [`crate::memory`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Reserved identifier of the drive root. Resolving it needs no lookup.
pub const ROOT_ID: &str = "root";

/// Type marker that distinguishes folders from every file type
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix shared by store-native document types that have no byte content
pub const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// Fallback content type for uploads with an unknown extension
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// One file or folder in the remote tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Store-assigned identifier, stable across renames and moves
    pub id: String,

    /// Name, unique among siblings only by convention
    pub name: String,

    /// Whether this node is a folder
    pub is_folder: bool,

    /// Parent identifiers; a single entry in normal operation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<String>,

    /// Content type as reported by the store
    pub mime_type: String,

    /// Size in bytes (None for folders and native documents)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modification time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<jiff::Timestamp>,
}

impl Node {
    /// Create a folder node
    pub fn folder(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_ids: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_folder: true,
            parent_ids,
            mime_type: FOLDER_MIME_TYPE.to_string(),
            size_bytes: None,
            size_human: None,
            modified_time: None,
        }
    }

    /// Create a file node
    pub fn file(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_ids: Vec<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_folder: false,
            parent_ids,
            mime_type: mime_type.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size, humansize::BINARY)),
            modified_time: None,
        }
    }

    /// Whether this is a store-native document that cannot be downloaded as-is
    pub fn is_native_document(&self) -> bool {
        !self.is_folder && self.mime_type.starts_with(NATIVE_MIME_PREFIX)
    }
}

/// How a child listing filters by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    /// Name equals the value
    Exact(String),
    /// Name contains the value as a substring
    Contains(String),
}

/// Options for child listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Optional name predicate
    pub name: Option<NameFilter>,

    /// Maximum number of children to return
    pub max_results: Option<usize>,
}

impl ListOptions {
    /// Children whose name is exactly `name`
    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            name: Some(NameFilter::Exact(name.into())),
            max_results: None,
        }
    }

    /// Children whose name contains `fragment`
    pub fn contains(fragment: impl Into<String>) -> Self {
        Self {
            name: Some(NameFilter::Contains(fragment.into())),
            max_results: None,
        }
    }
}

/// A parent relinking and/or rename applied in one store call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentChange {
    /// Parent to link the node under
    pub add_parent: Option<String>,

    /// Parents to unlink the node from
    pub remove_parents: Vec<String>,

    /// New name for the node
    pub new_name: Option<String>,
}

impl ParentChange {
    pub fn is_empty(&self) -> bool {
        self.add_parent.is_none() && self.remove_parents.is_empty() && self.new_name.is_none()
    }
}

/// Unscoped search; every set predicate must hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Name contains this substring
    pub name_contains: Option<String>,

    /// Exact content type
    pub mime_type: Option<String>,

    /// Modified strictly after this instant
    pub modified_after: Option<jiff::Timestamp>,

    /// Modified strictly before this instant
    pub modified_before: Option<jiff::Timestamp>,

    /// Maximum number of results
    pub max_results: Option<usize>,
}

impl SearchQuery {
    /// Whether `node` satisfies every set predicate
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(fragment) = &self.name_contains {
            if !node.name.contains(fragment.as_str()) {
                return false;
            }
        }
        if let Some(mime) = &self.mime_type {
            if &node.mime_type != mime {
                return false;
            }
        }
        if let Some(after) = self.modified_after {
            if !node.modified_time.is_some_and(|t| t > after) {
                return false;
            }
        }
        if let Some(before) = self.modified_before {
            if !node.modified_time.is_some_and(|t| t < before) {
                return false;
            }
        }
        true
    }
}

/// Remote drive operations keyed by identifier
///
/// Implementations must only return non-trashed items from listings and
/// searches. Listings return children in the store's own order; callers take
/// the first match when several siblings share a name.
#[async_trait]
pub trait DriveStore: Send + Sync {
    /// List the immediate children of a folder
    async fn list_children(&self, parent_id: &str, options: &ListOptions) -> Result<Vec<Node>>;

    /// Get metadata for a node
    async fn get_metadata(&self, id: &str) -> Result<Node>;

    /// Create a folder under `parent_id`
    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<Node>;

    /// Create a file under `parent_id` with the given content
    async fn create_file(
        &self,
        parent_id: &str,
        name: &str,
        content: Vec<u8>,
        mime_type: &str,
    ) -> Result<Node>;

    /// Relink and/or rename a node
    async fn update_parents(&self, id: &str, change: &ParentChange) -> Result<Node>;

    /// Copy a file under `parent_id` as `name`
    async fn copy_file(&self, id: &str, parent_id: &str, name: &str) -> Result<Node>;

    /// Delete a node (and, for folders, its subtree)
    async fn delete(&self, id: &str) -> Result<()>;

    /// Get file content as bytes
    async fn download(&self, id: &str) -> Result<Vec<u8>>;

    /// Search the whole drive
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Node>>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_file() {
        let node = Node::file("f1", "test.txt", vec![ROOT_ID.into()], "text/plain", 1024);
        assert_eq!(node.name, "test.txt");
        assert_eq!(node.size_bytes, Some(1024));
        assert!(node.size_human.is_some());
        assert!(!node.is_folder);
        assert!(!node.is_native_document());
    }

    #[test]
    fn test_node_folder() {
        let node = Node::folder("d1", "Projects", vec![ROOT_ID.into()]);
        assert!(node.is_folder);
        assert_eq!(node.mime_type, FOLDER_MIME_TYPE);
        assert!(node.size_bytes.is_none());
        assert!(!node.is_native_document());
    }

    #[test]
    fn test_native_document() {
        let mut node = Node::file("g1", "Budget", vec![], "application/vnd.google-apps.spreadsheet", 0);
        node.size_bytes = None;
        assert!(node.is_native_document());
    }

    #[test]
    fn test_search_query_is_conjunctive() {
        let mut node = Node::file("f1", "report-q1.pdf", vec![], "application/pdf", 10);
        node.modified_time = Some("2024-03-01T00:00:00Z".parse().unwrap());

        let query = SearchQuery {
            name_contains: Some("report".into()),
            mime_type: Some("application/pdf".into()),
            modified_after: Some("2024-01-01T00:00:00Z".parse().unwrap()),
            modified_before: Some("2024-06-01T00:00:00Z".parse().unwrap()),
            max_results: None,
        };
        assert!(query.matches(&node));

        let wrong_type = SearchQuery {
            mime_type: Some("text/plain".into()),
            ..query.clone()
        };
        assert!(!wrong_type.matches(&node));

        let too_late = SearchQuery {
            modified_after: Some("2024-04-01T00:00:00Z".parse().unwrap()),
            ..query
        };
        assert!(!too_late.matches(&node));
    }

    #[test]
    fn test_time_predicate_requires_timestamp() {
        let node = Node::file("f1", "a", vec![], "text/plain", 1);
        let query = SearchQuery {
            modified_before: Some("2030-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert!(!query.matches(&node));
    }

    #[test]
    fn test_parent_change_is_empty() {
        assert!(ParentChange::default().is_empty());
        let rename = ParentChange {
            new_name: Some("b.txt".into()),
            ..Default::default()
        };
        assert!(!rename.is_empty());
    }
}
