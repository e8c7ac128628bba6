//! In-memory DriveStore
//!
//! A tree of nodes held in a mutex, with the same parent/child link model as
//! the remote drive: names are not unique among siblings, listings come back
//! in creation order and deleting a folder takes its subtree with it.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{
    DEFAULT_MIME_TYPE, DriveStore, ListOptions, NameFilter, Node, ParentChange, ROOT_ID,
    SearchQuery,
};

#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Inner {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{}", self.next_id)
    }

    fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.node.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.node.id == id)
    }

    fn require_folder(&self, id: &str) -> Result<()> {
        if id == ROOT_ID {
            return Ok(());
        }
        match self.get(id) {
            Some(entry) if entry.node.is_folder => Ok(()),
            Some(_) => Err(Error::NotAFolder(id.to_string())),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    fn insert(&mut self, mut node: Node, content: Vec<u8>) -> Node {
        node.modified_time = Some(jiff::Timestamp::now());
        self.entries.push(Entry {
            node: node.clone(),
            content,
        });
        node
    }
}

/// DriveStore backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty drive
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::General("memory store lock poisoned".into()))
    }

    /// Number of nodes in the drive, root excluded
    pub fn node_count(&self) -> usize {
        self.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// Stored content of a file
    pub fn content(&self, id: &str) -> Option<Vec<u8>> {
        let inner = self.lock().ok()?;
        inner.get(id).map(|e| e.content.clone())
    }

    /// Add a node with a chosen parent, bypassing name checks
    pub fn seed_folder(&self, parent_id: &str, name: &str) -> Result<Node> {
        let mut inner = self.lock()?;
        inner.require_folder(parent_id)?;
        let id = inner.allocate_id();
        Ok(inner.insert(Node::folder(id, name, vec![parent_id.to_string()]), Vec::new()))
    }

    /// Add a file with content, bypassing name checks
    pub fn seed_file(&self, parent_id: &str, name: &str, content: &[u8]) -> Result<Node> {
        let mut inner = self.lock()?;
        inner.require_folder(parent_id)?;
        let id = inner.allocate_id();
        let mime = mime_guess::from_path(name)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        let node = Node::file(
            id,
            name,
            vec![parent_id.to_string()],
            mime,
            content.len() as u64,
        );
        Ok(inner.insert(node, content.to_vec()))
    }
}

#[async_trait]
impl DriveStore for MemoryStore {
    async fn list_children(&self, parent_id: &str, options: &ListOptions) -> Result<Vec<Node>> {
        let inner = self.lock()?;
        inner.require_folder(parent_id)?;

        let children = inner
            .entries
            .iter()
            .filter(|e| e.node.parent_ids.iter().any(|p| p == parent_id))
            .filter(|e| match &options.name {
                Some(NameFilter::Exact(name)) => &e.node.name == name,
                Some(NameFilter::Contains(fragment)) => e.node.name.contains(fragment.as_str()),
                None => true,
            })
            .map(|e| e.node.clone());

        Ok(match options.max_results {
            Some(max) => children.take(max).collect(),
            None => children.collect(),
        })
    }

    async fn get_metadata(&self, id: &str) -> Result<Node> {
        if id == ROOT_ID {
            return Ok(Node::folder(ROOT_ID, "My Drive", Vec::new()));
        }
        let inner = self.lock()?;
        inner
            .get(id)
            .map(|e| e.node.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<Node> {
        self.seed_folder(parent_id, name)
    }

    async fn create_file(
        &self,
        parent_id: &str,
        name: &str,
        content: Vec<u8>,
        mime_type: &str,
    ) -> Result<Node> {
        let mut inner = self.lock()?;
        inner.require_folder(parent_id)?;
        let id = inner.allocate_id();
        let node = Node::file(
            id,
            name,
            vec![parent_id.to_string()],
            mime_type,
            content.len() as u64,
        );
        Ok(inner.insert(node, content))
    }

    async fn update_parents(&self, id: &str, change: &ParentChange) -> Result<Node> {
        let mut inner = self.lock()?;
        if let Some(parent) = &change.add_parent {
            inner.require_folder(parent)?;
        }
        let entry = inner
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        entry
            .node
            .parent_ids
            .retain(|p| !change.remove_parents.contains(p));
        if let Some(parent) = &change.add_parent {
            entry.node.parent_ids.push(parent.clone());
        }
        if let Some(name) = &change.new_name {
            entry.node.name = name.clone();
        }
        entry.node.modified_time = Some(jiff::Timestamp::now());
        Ok(entry.node.clone())
    }

    async fn copy_file(&self, id: &str, parent_id: &str, name: &str) -> Result<Node> {
        let mut inner = self.lock()?;
        inner.require_folder(parent_id)?;
        let source = inner
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        if source.node.is_folder {
            return Err(Error::UnsupportedOperation(format!(
                "folder '{}' cannot be copied",
                source.node.name
            )));
        }

        let new_id = inner.allocate_id();
        let node = Node {
            id: new_id,
            name: name.to_string(),
            parent_ids: vec![parent_id.to_string()],
            ..source.node
        };
        Ok(inner.insert(node, source.content))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.get(id).is_none() {
            return Err(Error::NotFound(id.to_string()));
        }

        let mut doomed: HashSet<String> = HashSet::from([id.to_string()]);
        loop {
            let before = doomed.len();
            for entry in &inner.entries {
                if entry.node.parent_ids.iter().any(|p| doomed.contains(p)) {
                    doomed.insert(entry.node.id.clone());
                }
            }
            if doomed.len() == before {
                break;
            }
        }

        inner.entries.retain(|e| !doomed.contains(&e.node.id));
        Ok(())
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        let inner = self.lock()?;
        match inner.get(id) {
            Some(entry) if entry.node.is_folder => Err(Error::NotAFile(id.to_string())),
            Some(entry) => Ok(entry.content.clone()),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Node>> {
        let inner = self.lock()?;
        let matches = inner
            .entries
            .iter()
            .filter(|e| query.matches(&e.node))
            .map(|e| e.node.clone());

        Ok(match query.max_results {
            Some(max) => matches.take(max).collect(),
            None => matches.collect(),
        })
    }
}
