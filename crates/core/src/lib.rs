//! gdc-core: Core library for the gdc cloud drive CLI
//!
//! This crate provides the core functionality for gdc, including:
//! - Configuration management and the persisted working directory
//! - Canonical path normalization
//! - Path resolution against a drive of id-addressed nodes
//! - The DriveStore trait and an in-memory implementation for tests
//! - Path-aware operations (cd, ls, upload, download, mv, cp, rm, ...)
//!
//! This crate is independent of any HTTP client; the remote adapter lives in
//! gdc-drive.

pub mod config;
pub mod error;
pub mod memory;
pub mod navigation;
pub mod path;
pub mod resolver;
pub mod session;
pub mod state;
pub mod traits;

pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use navigation::Navigation;
pub use path::{CanonicalPath, normalize};
pub use resolver::{Resolution, Resolved, Resolver};
pub use session::{Downloaded, Placed, Session};
pub use state::StateManager;
pub use traits::{
    DriveStore, FOLDER_MIME_TYPE, ListOptions, NameFilter, Node, ParentChange, ROOT_ID,
    SearchQuery,
};
