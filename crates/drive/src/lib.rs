//! gdc-drive: Google Drive adapter for gdc
//!
//! This crate provides the implementation of the DriveStore trait over the
//! Drive v3 REST API, plus OAuth token loading and refresh. It is the only
//! crate that talks HTTP.

pub mod auth;
pub mod client;
pub mod multipart;
pub mod query;
pub mod resource;

pub use auth::TokenManager;
pub use client::DriveClient;
