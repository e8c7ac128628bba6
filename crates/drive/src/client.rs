//! Drive v3 client implementation
//!
//! Implements the DriveStore trait from gdc-core over the Drive REST API
//! with bearer-token authentication.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use gdc_core::config::DriveSettings;
use gdc_core::{
    DriveStore, Error, FOLDER_MIME_TYPE, ListOptions, Node, ParentChange, Result, SearchQuery,
};
use reqwest::header::{CONTENT_TYPE, HeaderMap, LOCATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::auth::TokenManager;
use crate::multipart::{self, NewFile, UploadMode};
use crate::query::{self, FILE_FIELDS, LIST_FIELDS};
use crate::resource::{ErrorBody, FileList, FileResource};

/// Largest page the API accepts for `files.list`
const MAX_PAGE_SIZE: usize = 1000;

const UPLOAD_CONTENT_TYPE: &str = "X-Upload-Content-Type";
const UPLOAD_CONTENT_LENGTH: &str = "X-Upload-Content-Length";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderBody<'a> {
    name: &'a str,
    mime_type: &'a str,
    parents: [&'a str; 1],
}

#[derive(Debug, Serialize)]
struct CopyBody<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Debug, Default, Serialize)]
struct RenameBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Drive REST client
pub struct DriveClient {
    http: Client,
    api_base: Url,
    upload_base: Url,
    bearer: String,
}

impl DriveClient {
    /// Build an HTTP client with the configured timeout
    pub fn http_client(timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("gdc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))
    }

    /// Authenticate and create a client from settings
    pub async fn connect(settings: &DriveSettings, config_dir: &Path) -> Result<Self> {
        let http = Self::http_client(settings.timeout_secs)?;
        let tokens = TokenManager::new(settings.effective_token_path(config_dir), http.clone())
            .with_client_secrets(settings.effective_credentials_path(config_dir))
            .with_env_token();
        let bearer = tokens.access_token().await?;
        Self::new(http, &settings.api_base_url, &settings.upload_base_url, bearer)
    }

    /// Create a client with an already obtained access token
    pub fn new(http: Client, api_base: &str, upload_base: &str, bearer: String) -> Result<Self> {
        Ok(Self {
            http,
            api_base: Url::parse(api_base)?,
            upload_base: Url::parse(upload_base)?,
            bearer,
        })
    }

    /// `base` with `segments` appended as percent-encoded path segments
    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("'{base}' cannot be used as an API base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn files_url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec!["files"];
        all.extend_from_slice(segments);
        Self::endpoint(&self.api_base, &all)
    }

    /// Send an authenticated request and map non-success statuses
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(&self.bearer)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_error(status, &error_body));
        }
        Ok(response)
    }

    async fn send_for_node(&self, request: RequestBuilder) -> Result<Node> {
        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?;
        let resource: FileResource = serde_json::from_str(&text)
            .map_err(|e| Error::Protocol(format!("invalid file resource: {e}")))?;
        Node::try_from(resource)
    }

    /// Follow `nextPageToken` until `limit` nodes are collected or pages run out
    async fn list(&self, q: &str, limit: Option<usize>) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let wanted = limit.map_or(MAX_PAGE_SIZE, |l| (l - nodes.len()).min(MAX_PAGE_SIZE));
            let mut url = self.files_url(&[])?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", q)
                    .append_pair("fields", LIST_FIELDS)
                    .append_pair("pageSize", &wanted.to_string());
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            debug!(q, page_token = ?page_token, "listing files");
            let response = self.send(self.http.get(url)).await?;
            let text = response
                .text()
                .await
                .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?;
            let page: FileList = serde_json::from_str(&text)
                .map_err(|e| Error::Protocol(format!("invalid file list: {e}")))?;

            for resource in page.files {
                nodes.push(Node::try_from(resource)?);
            }

            if let Some(limit) = limit {
                if nodes.len() >= limit {
                    nodes.truncate(limit);
                    break;
                }
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(nodes)
    }
}

/// Session URL returned when a resumable upload is opened
fn session_location(headers: &HeaderMap) -> Result<Url> {
    let location = headers
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::Protocol("resumable upload response has no Location header".into()))?;
    Ok(Url::parse(location)?)
}

/// Translate an HTTP failure into the error taxonomy
fn map_error(status: StatusCode, body: &str) -> Error {
    let (message, limited) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let limited = parsed.error.is_limit();
            (parsed.error.message, limited)
        }
        Err(_) => (body.to_string(), false),
    };
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::UNAUTHORIZED => Error::Auth(message),
        StatusCode::FORBIDDEN if !limited => Error::Auth(message),
        _ => Error::Network(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

#[async_trait]
impl DriveStore for DriveClient {
    async fn list_children(&self, parent_id: &str, options: &ListOptions) -> Result<Vec<Node>> {
        if options.max_results == Some(0) {
            return Ok(Vec::new());
        }
        self.list(&query::children(parent_id, options), options.max_results)
            .await
    }

    async fn get_metadata(&self, id: &str) -> Result<Node> {
        let mut url = self.files_url(&[id])?;
        url.query_pairs_mut().append_pair("fields", FILE_FIELDS);
        self.send_for_node(self.http.get(url)).await
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<Node> {
        let mut url = self.files_url(&[])?;
        url.query_pairs_mut().append_pair("fields", FILE_FIELDS);
        let body = FolderBody {
            name,
            mime_type: FOLDER_MIME_TYPE,
            parents: [parent_id],
        };
        self.send_for_node(self.http.post(url).json(&body)).await
    }

    async fn create_file(
        &self,
        parent_id: &str,
        name: &str,
        content: Vec<u8>,
        mime_type: &str,
    ) -> Result<Node> {
        let mode = UploadMode::for_size(content.len());
        let mut url = Self::endpoint(&self.upload_base, &["files"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", mode.as_str())
            .append_pair("fields", FILE_FIELDS);

        let metadata = NewFile {
            name,
            mime_type,
            parents: [parent_id],
        };
        debug!(name, mime_type, bytes = content.len(), mode = mode.as_str(), "uploading file");

        match mode {
            UploadMode::Multipart => {
                let related = multipart::related(&metadata, &content)?;
                let request = self
                    .http
                    .post(url)
                    .header(CONTENT_TYPE, related.content_type)
                    .body(related.body);
                self.send_for_node(request).await
            }
            UploadMode::Resumable => {
                let request = self
                    .http
                    .post(url)
                    .header(UPLOAD_CONTENT_TYPE, mime_type)
                    .header(UPLOAD_CONTENT_LENGTH, content.len().to_string())
                    .json(&metadata);
                let response = self.send(request).await?;
                let session = session_location(response.headers())?;
                debug!(session = %session, "opened resumable upload session");

                let request = self
                    .http
                    .put(session)
                    .header(CONTENT_TYPE, mime_type)
                    .body(content);
                self.send_for_node(request).await
            }
        }
    }

    async fn update_parents(&self, id: &str, change: &ParentChange) -> Result<Node> {
        let mut url = self.files_url(&[id])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(parent) = &change.add_parent {
                pairs.append_pair("addParents", parent);
            }
            if !change.remove_parents.is_empty() {
                pairs.append_pair("removeParents", &change.remove_parents.join(","));
            }
            pairs.append_pair("fields", FILE_FIELDS);
        }
        let body = RenameBody {
            name: change.new_name.as_deref(),
        };
        self.send_for_node(self.http.patch(url).json(&body)).await
    }

    async fn copy_file(&self, id: &str, parent_id: &str, name: &str) -> Result<Node> {
        let mut url = self.files_url(&[id, "copy"])?;
        url.query_pairs_mut().append_pair("fields", FILE_FIELDS);
        let body = CopyBody {
            name,
            parents: [parent_id],
        };
        self.send_for_node(self.http.post(url).json(&body)).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.files_url(&[id])?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        let mut url = self.files_url(&[id])?;
        url.query_pairs_mut().append_pair("alt", "media");
        let response = self.send(self.http.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read content: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn search(&self, search: &SearchQuery) -> Result<Vec<Node>> {
        if search.max_results == Some(0) {
            return Ok(Vec::new());
        }
        self.list(&query::search(search), search.max_results).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api: &str) -> DriveClient {
        DriveClient::new(
            Client::new(),
            api,
            "https://www.googleapis.com/upload/drive/v3",
            "token".into(),
        )
        .unwrap()
    }

    #[test]
    fn test_files_url_construction() {
        let client = client("https://www.googleapis.com/drive/v3");
        assert_eq!(
            client.files_url(&["abc", "copy"]).unwrap().as_str(),
            "https://www.googleapis.com/drive/v3/files/abc/copy"
        );
    }

    #[test]
    fn test_files_url_with_trailing_slash() {
        let client = client("http://localhost:8080/drive/v3/");
        assert_eq!(
            client.files_url(&[]).unwrap().as_str(),
            "http://localhost:8080/drive/v3/files"
        );
    }

    #[test]
    fn test_ids_are_percent_encoded() {
        let client = client("https://www.googleapis.com/drive/v3");
        assert_eq!(
            client.files_url(&["a/b"]).unwrap().as_str(),
            "https://www.googleapis.com/drive/v3/files/a%2Fb"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            DriveClient::new(Client::new(), "not a url", "also not", "t".into()),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_map_error_uses_api_message() {
        let body = r#"{"error":{"code":404,"message":"File not found: xyz."}}"#;
        match map_error(StatusCode::NOT_FOUND, body) {
            Error::NotFound(msg) => assert_eq!(msg, "File not found: xyz."),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            map_error(StatusCode::UNAUTHORIZED, "nope"),
            Error::Auth(_)
        ));
        match map_error(StatusCode::INTERNAL_SERVER_ERROR, "boom") {
            Error::Network(msg) => assert_eq!(msg, "HTTP 500: boom"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_forbidden_limits_are_transport_errors() {
        let rate = r#"{"error":{"code":403,"message":"User rate limit exceeded.",
                       "errors":[{"domain":"usageLimits","reason":"userRateLimitExceeded"}]}}"#;
        match map_error(StatusCode::FORBIDDEN, rate) {
            Error::Network(msg) => assert_eq!(msg, "HTTP 403: User rate limit exceeded."),
            other => panic!("unexpected: {other:?}"),
        }

        let quota = r#"{"error":{"message":"The user's Drive storage quota has been exceeded.",
                        "errors":[{"reason":"storageQuotaExceeded"}]}}"#;
        assert!(matches!(map_error(StatusCode::FORBIDDEN, quota), Error::Network(_)));

        let denied = r#"{"error":{"message":"Insufficient permissions.",
                         "errors":[{"reason":"insufficientFilePermissions"}]}}"#;
        assert!(matches!(map_error(StatusCode::FORBIDDEN, denied), Error::Auth(_)));
        assert!(matches!(map_error(StatusCode::FORBIDDEN, "forbidden"), Error::Auth(_)));
    }

    #[test]
    fn test_session_location() {
        let mut headers = HeaderMap::new();
        assert!(matches!(session_location(&headers), Err(Error::Protocol(_))));

        headers.insert(
            LOCATION,
            "https://www.googleapis.com/upload/drive/v3/files?uploadType=resumable&upload_id=abc"
                .parse()
                .unwrap(),
        );
        let url = session_location(&headers).unwrap();
        assert!(url.query().unwrap().contains("upload_id=abc"));
    }

    #[test]
    fn test_rename_body_omits_missing_name() {
        assert_eq!(serde_json::to_string(&RenameBody::default()).unwrap(), "{}");
        assert_eq!(
            serde_json::to_string(&RenameBody { name: Some("b.txt") }).unwrap(),
            r#"{"name":"b.txt"}"#
        );
    }
}
