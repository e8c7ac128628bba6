//! Path resolution
//!
//! Walks a canonical path one segment at a time from the drive root, looking
//! up each segment among the children of the previous one. When several
//! siblings share a name, the first one in the store's listing wins.
//!
//! Resolution reports a missing path as [`Resolution::Missing`] instead of an
//! error, so existence checks are plain pattern matches. Callers that need the
//! node use [`Resolver::resolve`], which turns a missing path into
//! [`Error::NotFound`].

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::path::CanonicalPath;
use crate::traits::{DriveStore, ListOptions, Node, ROOT_ID};

/// Identifier and kind of a resolved node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub id: String,
    pub is_folder: bool,
}

impl Resolved {
    fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            is_folder: true,
        }
    }
}

impl From<&Node> for Resolved {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            is_folder: node.is_folder,
        }
    }
}

/// Outcome of walking a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every segment matched
    Found(Resolved),
    /// `missing` is the path up to and including the first segment with no match
    Missing { missing: CanonicalPath },
}

/// Translates canonical paths into store identifiers
pub struct Resolver<'a, S: DriveStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DriveStore + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Walk `path` without creating anything
    pub async fn status(&self, path: &CanonicalPath) -> Result<Resolution> {
        self.walk(path, false).await
    }

    /// Resolve `path` to an identifier.
    ///
    /// With `create_missing`, every missing segment is created as a folder.
    /// Otherwise a missing segment fails with `NotFound` naming that segment.
    pub async fn resolve(&self, path: &CanonicalPath, create_missing: bool) -> Result<String> {
        Ok(self.resolve_entry(path, create_missing).await?.id)
    }

    /// Like [`Resolver::resolve`] but keeps the node kind
    pub async fn resolve_entry(
        &self,
        path: &CanonicalPath,
        create_missing: bool,
    ) -> Result<Resolved> {
        match self.walk(path, create_missing).await? {
            Resolution::Found(resolved) => Ok(resolved),
            Resolution::Missing { missing } => Err(Error::NotFound(missing.to_string())),
        }
    }

    async fn walk(&self, path: &CanonicalPath, create_missing: bool) -> Result<Resolution> {
        let mut current = Resolved::root();
        let mut walked = CanonicalPath::root();

        for segment in path.segments() {
            let parent_path = walked.clone();
            walked = walked.join(segment);

            if !current.is_folder {
                if create_missing {
                    return Err(Error::NotAFolder(parent_path.to_string()));
                }
                return Ok(Resolution::Missing { missing: walked });
            }

            let children = self
                .store
                .list_children(&current.id, &ListOptions::exact(segment))
                .await?;

            match children.iter().find(|child| child.name == segment) {
                Some(child) => {
                    debug!(segment, id = %child.id, "resolved path segment");
                    current = Resolved::from(child);
                }
                None if create_missing => {
                    let folder = self.store.create_folder(&current.id, segment).await?;
                    info!(path = %walked, id = %folder.id, "created folder");
                    current = Resolved::from(&folder);
                }
                None => {
                    debug!(missing = %walked, "path segment not found");
                    return Ok(Resolution::Missing { missing: walked });
                }
            }
        }

        Ok(Resolution::Found(current))
    }

    /// Whether `path` resolves; transport failures still propagate
    pub async fn exists(&self, path: &CanonicalPath) -> Result<bool> {
        match self.status(path).await? {
            Resolution::Found(_) => Ok(true),
            Resolution::Missing { .. } => Ok(false),
        }
    }

    /// Whether `path` resolves to a folder
    pub async fn is_dir(&self, path: &CanonicalPath) -> Result<bool> {
        let resolved = match self.status(path).await? {
            Resolution::Found(resolved) => resolved,
            Resolution::Missing { .. } => return Ok(false),
        };
        if resolved.id == ROOT_ID {
            return Ok(true);
        }
        match self.store.get_metadata(&resolved.id).await {
            Ok(node) => Ok(node.is_folder),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Store metadata for the node at `path`
    pub async fn metadata(&self, path: &CanonicalPath) -> Result<Node> {
        let resolved = self.resolve_entry(path, false).await?;
        self.store.get_metadata(&resolved.id).await
    }
}
