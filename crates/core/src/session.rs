//! Path-aware drive operations
//!
//! A [`Session`] pairs a drive store with the working directory. Every
//! operation normalizes its path arguments against the working directory,
//! resolves them through the [`Resolver`] and issues the matching store call.
//! Lookups are repeated on every call; nothing is cached between operations.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::navigation::Navigation;
use crate::path::CanonicalPath;
use crate::resolver::{Resolution, Resolver};
use crate::traits::{DEFAULT_MIME_TYPE, DriveStore, ListOptions, Node, ParentChange, SearchQuery};

/// A node together with the path it now lives at
#[derive(Debug, Clone, Serialize)]
pub struct Placed {
    pub path: CanonicalPath,
    pub node: Node,
}

/// Result of a download
#[derive(Debug, Clone, Serialize)]
pub struct Downloaded {
    pub source: CanonicalPath,
    pub local_path: PathBuf,
    pub size_bytes: u64,
}

/// Where a new or moved node goes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Destination {
    parent_id: String,
    parent_path: CanonicalPath,
    name: String,
}

impl Destination {
    fn path(&self) -> CanonicalPath {
        self.parent_path.join(&self.name)
    }
}

/// Drive store plus working directory
pub struct Session<S: DriveStore> {
    store: S,
    nav: Navigation,
}

impl<S: DriveStore> Session<S> {
    pub fn new(store: S, nav: Navigation) -> Self {
        Self { store, nav }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn resolver(&self) -> Resolver<'_, S> {
        Resolver::new(&self.store)
    }

    /// Current working directory
    pub fn pwd(&self) -> &CanonicalPath {
        self.nav.cwd()
    }

    /// Normalize `input` against the working directory
    pub fn absolute(&self, input: &str) -> CanonicalPath {
        self.nav.absolute(input)
    }

    /// Change the working directory to a folder
    pub async fn cd(&mut self, input: &str) -> Result<CanonicalPath> {
        let target = self.absolute(input);
        let resolved = self.resolver().resolve_entry(&target, false).await?;
        if !resolved.is_folder {
            return Err(Error::NotAFolder(target.to_string()));
        }
        self.nav.set_cwd(target.clone())?;
        info!(cwd = %target, "changed working directory");
        Ok(target)
    }

    /// Immediate children of a folder (default: working directory)
    pub async fn ls(&self, input: Option<&str>, limit: Option<usize>) -> Result<Vec<Node>> {
        let folder = self.absolute(input.unwrap_or_default());
        let folder_id = self.folder_id(&folder).await?;
        let options = ListOptions {
            name: None,
            max_results: limit,
        };
        self.store.list_children(&folder_id, &options).await
    }

    /// Children of a folder whose name contains `query`
    pub async fn search(
        &self,
        query: &str,
        input: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Node>> {
        let folder = self.absolute(input.unwrap_or_default());
        let folder_id = self.folder_id(&folder).await?;
        let options = ListOptions {
            max_results: limit,
            ..ListOptions::contains(query)
        };
        self.store.list_children(&folder_id, &options).await
    }

    /// Unscoped search with conjunctive predicates
    pub async fn search_all(&self, query: &SearchQuery) -> Result<Vec<Node>> {
        self.store.search(query).await
    }

    /// Whether a path resolves
    pub async fn exists(&self, input: &str) -> Result<bool> {
        self.resolver().exists(&self.absolute(input)).await
    }

    /// Whether a path resolves to a folder
    pub async fn is_dir(&self, input: &str) -> Result<bool> {
        self.resolver().is_dir(&self.absolute(input)).await
    }

    /// Store metadata for a path
    pub async fn stat(&self, input: &str) -> Result<Node> {
        self.resolver().metadata(&self.absolute(input)).await
    }

    /// Create a folder and any missing parents
    pub async fn mkdir(&self, input: &str) -> Result<Placed> {
        let path = self.absolute(input);
        let resolved = self.resolver().resolve_entry(&path, true).await?;
        if !resolved.is_folder {
            return Err(Error::NotAFolder(path.to_string()));
        }
        let node = self.store.get_metadata(&resolved.id).await?;
        Ok(Placed { path, node })
    }

    /// Upload a local file.
    ///
    /// Without a remote path the file lands in the working directory under its
    /// own name. An existing remote folder receives the file under its own name;
    /// any other remote path names the new file inside its (existing) parent.
    pub async fn upload(&self, local: &Path, remote: Option<&str>) -> Result<Placed> {
        let base_name = local
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::InvalidPath(format!("'{}' does not name a file", local.display()))
            })?;

        let destination = match remote {
            None => {
                let cwd = self.pwd().clone();
                let parent_id = self.folder_id(&cwd).await?;
                Destination {
                    parent_id,
                    parent_path: cwd,
                    name: base_name,
                }
            }
            Some(remote) => self.destination(&self.absolute(remote), &base_name).await?,
        };

        let content = tokio::fs::read(local).await?;
        let mime_type = mime_guess::from_path(local)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let node = self
            .store
            .create_file(&destination.parent_id, &destination.name, content, &mime_type)
            .await?;
        let path = destination.path();
        info!(local = %local.display(), remote = %path, id = %node.id, "uploaded file");
        Ok(Placed { path, node })
    }

    /// Download a remote file.
    ///
    /// An existing local directory (or a path ending in a separator) receives
    /// the file under its remote name; missing parent directories are created.
    pub async fn download(&self, input: &str, local: &Path) -> Result<Downloaded> {
        let source = self.absolute(input);
        let node = self.resolver().metadata(&source).await?;
        if node.is_folder {
            return Err(Error::NotAFile(source.to_string()));
        }
        if node.is_native_document() {
            return Err(Error::UnsupportedOperation(format!(
                "'{source}' is a {} document and needs an export format",
                node.mime_type
            )));
        }

        let local_path = if local.is_dir() || ends_with_separator(local) {
            local.join(&node.name)
        } else {
            local.to_path_buf()
        };

        let content = self.store.download(&node.id).await?;
        if let Some(parent) = local_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&local_path, &content).await?;

        info!(remote = %source, local = %local_path.display(), "downloaded file");
        Ok(Downloaded {
            source,
            local_path,
            size_bytes: content.len() as u64,
        })
    }

    /// Delete a file or folder (with its subtree)
    pub async fn rm(&self, input: &str) -> Result<CanonicalPath> {
        let path = self.absolute(input);
        if path.is_root() {
            return Err(Error::InvalidPath("refusing to remove the drive root".into()));
        }
        let id = self.resolver().resolve(&path, false).await?;
        self.store.delete(&id).await?;
        info!(path = %path, id = %id, "removed");
        Ok(path)
    }

    /// Move and/or rename.
    ///
    /// An existing destination folder receives the node under its current
    /// name; otherwise the destination names the node inside its parent.
    pub async fn mv(&self, src: &str, dst: &str) -> Result<Placed> {
        let src = self.absolute(src);
        let dst = self.absolute(dst);
        if src.is_root() {
            return Err(Error::InvalidPath("cannot move the drive root".into()));
        }

        let node = self.resolver().metadata(&src).await?;
        let destination = self.destination(&dst, &node.name).await?;
        let target = destination.path();

        if node.is_folder && (target == src || src.is_ancestor_of(&target)) {
            return Err(Error::InvalidPath(format!(
                "cannot move '{src}' into itself"
            )));
        }

        let mut change = ParentChange::default();
        if src.parent().as_ref() != Some(&destination.parent_path) {
            change.add_parent = Some(destination.parent_id.clone());
            change.remove_parents = node.parent_ids.clone();
        }
        if destination.name != node.name {
            change.new_name = Some(destination.name.clone());
        }

        if change.is_empty() {
            return Ok(Placed { path: target, node });
        }

        let moved = self.store.update_parents(&node.id, &change).await?;
        info!(from = %src, to = %target, id = %moved.id, "moved");
        Ok(Placed {
            path: target,
            node: moved,
        })
    }

    /// Copy a file; folders cannot be copied
    pub async fn cp(&self, src: &str, dst: &str) -> Result<Placed> {
        let src = self.absolute(src);
        let dst = self.absolute(dst);

        let node = self.resolver().metadata(&src).await?;
        if node.is_folder {
            return Err(Error::UnsupportedOperation(format!(
                "'{src}' is a folder; folders cannot be copied"
            )));
        }

        let destination = self.destination(&dst, &node.name).await?;
        let copy = self
            .store
            .copy_file(&node.id, &destination.parent_id, &destination.name)
            .await?;
        let target = destination.path();
        info!(from = %src, to = %target, id = %copy.id, "copied");
        Ok(Placed { path: target, node: copy })
    }

    /// Identifier of the folder at `path`
    async fn folder_id(&self, path: &CanonicalPath) -> Result<String> {
        let resolved = self.resolver().resolve_entry(path, false).await?;
        if !resolved.is_folder {
            return Err(Error::NotAFolder(path.to_string()));
        }
        Ok(resolved.id)
    }

    /// Decide between "into an existing folder" and "at this exact path"
    async fn destination(&self, dst: &CanonicalPath, default_name: &str) -> Result<Destination> {
        if let Resolution::Found(resolved) = self.resolver().status(dst).await? {
            if resolved.is_folder {
                return Ok(Destination {
                    parent_id: resolved.id,
                    parent_path: dst.clone(),
                    name: default_name.to_string(),
                });
            }
        }

        // Only the root has no parent, and the root is always a folder
        let (Some(parent_path), Some(name)) = (dst.parent(), dst.file_name()) else {
            return Err(Error::InvalidPath(format!("'{dst}' has no parent folder")));
        };
        let parent_id = self.folder_id(&parent_path).await?;
        Ok(Destination {
            parent_id,
            name: name.to_string(),
            parent_path,
        })
    }
}

fn ends_with_separator(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::traits::mock::MockStore;
    use crate::traits::{NameFilter, ROOT_ID};
    use tempfile::TempDir;

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new(), Navigation::default())
    }

    #[tokio::test]
    async fn test_cd_and_relative_resolution() {
        let mut session = session();
        let projects = session.store().seed_folder(ROOT_ID, "Projects").unwrap();
        session.store().seed_file(&projects.id, "plan.md", b"# plan").unwrap();

        assert_eq!(session.cd("Projects").await.unwrap().as_str(), "/Projects");
        assert!(session.exists("plan.md").await.unwrap());
        assert_eq!(session.cd("..").await.unwrap().as_str(), "/");
    }

    #[tokio::test]
    async fn test_cd_into_file_fails_and_keeps_cwd() {
        let mut session = session();
        session.store().seed_file(ROOT_ID, "notes.txt", b"n").unwrap();

        let err = session.cd("/notes.txt").await.unwrap_err();
        assert!(matches!(err, Error::NotAFolder(_)));
        assert!(session.pwd().is_root());

        let err = session.cd("/nowhere").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(session.pwd().is_root());
    }

    #[tokio::test]
    async fn test_ls_on_file_is_wrong_type() {
        let session = session();
        session.store().seed_file(ROOT_ID, "a.txt", b"a").unwrap();
        let err = session.ls(Some("/a.txt"), None).await.unwrap_err();
        assert!(matches!(err, Error::NotAFolder(_)));
    }

    #[tokio::test]
    async fn test_search_is_scoped_and_substring() {
        let session = session();
        let docs = session.store().seed_folder(ROOT_ID, "Docs").unwrap();
        session.store().seed_file(&docs.id, "report-2024.pdf", b"").unwrap();
        session.store().seed_file(&docs.id, "summary.txt", b"").unwrap();
        session.store().seed_file(ROOT_ID, "report-root.pdf", b"").unwrap();

        let hits = session.search("report", Some("/Docs"), None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "report-2024.pdf");
    }

    #[tokio::test]
    async fn test_upload_defaults_to_cwd_and_guesses_type() {
        let mut session = session();
        session.store().seed_folder(ROOT_ID, "In").unwrap();
        session.cd("/In").await.unwrap();

        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join("page.html");
        std::fs::write(&local, "<p>hi</p>").unwrap();

        let placed = session.upload(&local, None).await.unwrap();
        assert_eq!(placed.path.as_str(), "/In/page.html");
        assert_eq!(placed.node.mime_type, "text/html");
        assert_eq!(
            session.store().content(&placed.node.id).unwrap(),
            b"<p>hi</p>".to_vec()
        );
    }

    #[tokio::test]
    async fn test_upload_missing_local_file_is_io_error() {
        let session = session();
        let err = session
            .upload(Path::new("/definitely/not/here.txt"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(session.store().node_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_parent_must_exist() {
        let session = session();
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join("a.txt");
        std::fs::write(&local, "a").unwrap();

        let err = session.upload(&local, Some("/NoSuch/b.txt")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(p) if p == "/NoSuch"));

        session.store().seed_file(ROOT_ID, "file", b"").unwrap();
        let err = session.upload(&local, Some("/file/b.txt")).await.unwrap_err();
        assert!(matches!(err, Error::NotAFolder(_)));
    }

    #[tokio::test]
    async fn test_download_into_directory() {
        let session = session();
        session.store().seed_file(ROOT_ID, "data.bin", &[1, 2, 3]).unwrap();
        let temp_dir = TempDir::new().unwrap();

        let done = session.download("/data.bin", temp_dir.path()).await.unwrap();
        assert_eq!(done.local_path, temp_dir.path().join("data.bin"));
        assert_eq!(done.size_bytes, 3);
        assert_eq!(std::fs::read(&done.local_path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_creates_parent_directories() {
        let session = session();
        session.store().seed_file(ROOT_ID, "x.txt", b"x").unwrap();
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a/b/renamed.txt");

        let done = session.download("x.txt", &target).await.unwrap();
        assert_eq!(done.local_path, target);
        assert_eq!(std::fs::read_to_string(target).unwrap(), "x");
    }

    #[tokio::test]
    async fn test_download_rejects_folders_and_native_documents() {
        let session = session();
        session.store().seed_folder(ROOT_ID, "Dir").unwrap();
        let temp_dir = TempDir::new().unwrap();

        let err = session.download("/Dir", temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::NotAFile(_)));

        let doc = session
            .store()
            .create_file(ROOT_ID, "Budget", Vec::new(), "application/vnd.google-apps.spreadsheet")
            .await
            .unwrap();
        assert!(doc.is_native_document());
        let err = session.download("/Budget", temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation(_)));
    }

    #[tokio::test]
    async fn test_rm_refuses_root() {
        let session = session();
        assert!(matches!(
            session.rm("/").await.unwrap_err(),
            Error::InvalidPath(_)
        ));
    }

    #[tokio::test]
    async fn test_mv_folder_into_itself_refused() {
        let session = session();
        let a = session.store().seed_folder(ROOT_ID, "A").unwrap();
        session.store().seed_folder(&a.id, "B").unwrap();

        assert!(matches!(
            session.mv("/A", "/A").await.unwrap_err(),
            Error::InvalidPath(_)
        ));
        assert!(matches!(
            session.mv("/A", "/A/B").await.unwrap_err(),
            Error::InvalidPath(_)
        ));
        assert!(session.exists("/A/B").await.unwrap());
    }

    #[tokio::test]
    async fn test_mv_to_same_place_is_noop() {
        let session = session();
        let file = session.store().seed_file(ROOT_ID, "a.txt", b"a").unwrap();
        let placed = session.mv("/a.txt", "/").await.unwrap();
        assert_eq!(placed.path.as_str(), "/a.txt");
        assert_eq!(placed.node.id, file.id);
    }

    #[tokio::test]
    async fn test_mv_and_rename_into_other_folder() {
        let session = session();
        session.store().seed_file(ROOT_ID, "a.txt", b"a").unwrap();
        session.store().seed_folder(ROOT_ID, "Archive").unwrap();

        let placed = session.mv("/a.txt", "/Archive/old-a.txt").await.unwrap();
        assert_eq!(placed.path.as_str(), "/Archive/old-a.txt");
        assert!(!session.exists("/a.txt").await.unwrap());
        assert!(session.exists("/Archive/old-a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_mkdir_creates_parents_and_is_idempotent() {
        let session = session();
        let first = session.mkdir("/x/y/z").await.unwrap();
        assert_eq!(session.store().node_count(), 3);
        let again = session.mkdir("/x/y/z").await.unwrap();
        assert_eq!(first.node.id, again.node.id);
        assert_eq!(session.store().node_count(), 3);
    }

    #[tokio::test]
    async fn test_mkdir_over_file_fails() {
        let session = session();
        session.store().seed_file(ROOT_ID, "f", b"").unwrap();
        assert!(matches!(
            session.mkdir("/f").await.unwrap_err(),
            Error::NotAFolder(_)
        ));
    }

    #[tokio::test]
    async fn test_stale_cwd_fails_lazily() {
        let mut session = session();
        let gone = session.store().seed_folder(ROOT_ID, "Gone").unwrap();
        session.cd("/Gone").await.unwrap();
        session.store().delete(&gone.id).await.unwrap();

        let err = session.ls(None, None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(p) if p == "/Gone"));
        assert!(session.ls(Some("/"), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_cp_folder_issues_no_copy() {
        let mut store = MockStore::new();
        store
            .expect_list_children()
            .returning(|_, _| Ok(vec![Node::folder("f1", "F", vec![ROOT_ID.into()])]));
        store
            .expect_get_metadata()
            .returning(|_| Ok(Node::folder("f1", "F", vec![ROOT_ID.into()])));
        store.expect_copy_file().never();
        store.expect_create_folder().never();

        let session = Session::new(store, Navigation::default());
        assert!(matches!(
            session.cp("/F", "/G").await.unwrap_err(),
            Error::UnsupportedOperation(_)
        ));
    }

    #[tokio::test]
    async fn test_scoped_search_passes_limit_to_store() {
        let mut store = MockStore::new();
        store
            .expect_list_children()
            .withf(|parent, options| {
                parent == ROOT_ID
                    && options.name == Some(NameFilter::Contains("report".into()))
                    && options.max_results == Some(2)
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let session = Session::new(store, Navigation::default());
        assert!(session.search("report", Some("/"), Some(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mv_root_issues_no_update() {
        let mut store = MockStore::new();
        store.expect_update_parents().never();
        store.expect_list_children().never();

        let session = Session::new(store, Navigation::default());
        assert!(matches!(
            session.mv("/", "/elsewhere").await.unwrap_err(),
            Error::InvalidPath(_)
        ));
    }
}
