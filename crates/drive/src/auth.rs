//! OAuth access tokens
//!
//! Tokens come from `$GDC_ACCESS_TOKEN` when set, otherwise from an
//! authorized-user token file as written by the installed-app OAuth flow.
//! An expired token is refreshed with its refresh token and the file is
//! rewritten in place. Client id and secret missing from the token file are
//! taken from the OAuth client secrets file.

use std::path::{Path, PathBuf};

use gdc_core::{Error, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Supplies a bearer token directly, bypassing the token file
pub const ACCESS_TOKEN_ENV: &str = "GDC_ACCESS_TOKEN";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed early
const EXPIRY_SKEW_SECS: i64 = 60;

/// Authorized-user token file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
    /// Fields written by other tools, preserved on rewrite
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl AuthorizedUser {
    /// Whether the stored token is usable at `now`
    pub fn is_fresh(&self, now: jiff::Timestamp) -> bool {
        if self.token.is_none() {
            return false;
        }
        let Some(expiry) = &self.expiry else {
            return true;
        };
        match parse_expiry(expiry) {
            Some(expiry) => expiry.as_second() - EXPIRY_SKEW_SECS > now.as_second(),
            None => false,
        }
    }
}

/// Expiry as written with or without a trailing `Z`
fn parse_expiry(raw: &str) -> Option<jiff::Timestamp> {
    if let Ok(ts) = raw.parse::<jiff::Timestamp>() {
        return Some(ts);
    }
    raw.parse::<jiff::civil::DateTime>()
        .ok()
        .and_then(|dt| dt.to_zoned(jiff::tz::TimeZone::UTC).ok())
        .map(|zoned| zoned.timestamp())
}

/// OAuth client secrets file (`installed` or `web` application)
#[derive(Debug, Deserialize)]
struct ClientSecrets {
    #[serde(alias = "web")]
    installed: ClientInfo,
}

#[derive(Debug, Deserialize)]
struct ClientInfo {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Produces access tokens for API calls
#[derive(Debug, Clone)]
pub struct TokenManager {
    token_path: PathBuf,
    secrets_path: Option<PathBuf>,
    static_token: Option<String>,
    http: Client,
}

impl TokenManager {
    pub fn new(token_path: PathBuf, http: Client) -> Self {
        Self {
            token_path,
            secrets_path: None,
            static_token: None,
            http,
        }
    }

    /// Client secrets used when the token file carries no client credentials
    pub fn with_client_secrets(mut self, path: PathBuf) -> Self {
        self.secrets_path = Some(path);
        self
    }

    /// Use `token` as-is when present
    pub fn with_static_token(mut self, token: Option<String>) -> Self {
        self.static_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Pick up `$GDC_ACCESS_TOKEN`
    pub fn with_env_token(self) -> Self {
        self.with_static_token(std::env::var(ACCESS_TOKEN_ENV).ok())
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// A valid access token, refreshing the token file if needed
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = &self.static_token {
            debug!("using access token from {ACCESS_TOKEN_ENV}");
            return Ok(token.clone());
        }

        let mut user = self.load()?;
        if user.is_fresh(jiff::Timestamp::now()) {
            if let Some(token) = user.token {
                return Ok(token);
            }
        }

        let token = self.refresh(&mut user).await?;
        self.save(&user)?;
        info!(path = %self.token_path.display(), "refreshed access token");
        Ok(token)
    }

    fn load(&self) -> Result<AuthorizedUser> {
        if !self.token_path.exists() {
            return Err(Error::Auth(format!(
                "no token at '{}'. Authorize once with the installed-app OAuth flow and save \
                 token.json there, point GD_CONNECT_TOKEN at it, or set {ACCESS_TOKEN_ENV}",
                self.token_path.display()
            )));
        }
        let content = std::fs::read_to_string(&self.token_path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Auth(format!(
                "token file '{}' is not valid: {e}",
                self.token_path.display()
            ))
        })
    }

    fn save(&self, user: &AuthorizedUser) -> Result<()> {
        std::fs::write(&self.token_path, serde_json::to_string(user)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.token_path, permissions)?;
        }

        Ok(())
    }

    /// Fill in client id and secret from the client secrets file
    fn complete_client(&self, user: &mut AuthorizedUser) -> Result<()> {
        if user.client_id.is_some() && user.client_secret.is_some() {
            return Ok(());
        }
        let Some(path) = self.secrets_path.as_deref().filter(|p| p.exists()) else {
            return Ok(());
        };

        let content = std::fs::read_to_string(path)?;
        let secrets: ClientSecrets = serde_json::from_str(&content).map_err(|e| {
            Error::Auth(format!("client secrets '{}' are not valid: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "using client secrets file");

        let info = secrets.installed;
        user.client_id.get_or_insert(info.client_id);
        user.client_secret.get_or_insert(info.client_secret);
        if let Some(uri) = info.token_uri {
            user.token_uri = uri;
        }
        Ok(())
    }

    async fn refresh(&self, user: &mut AuthorizedUser) -> Result<String> {
        self.complete_client(user)?;
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            user.refresh_token.as_deref(),
            user.client_id.as_deref(),
            user.client_secret.as_deref(),
        ) else {
            return Err(Error::Auth(
                "access token expired and the token file has no refresh credentials".into(),
            ));
        };

        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", refresh_token)
            .append_pair("client_id", client_id)
            .append_pair("client_secret", client_secret)
            .finish();

        let response = self
            .http
            .post(&user.token_uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Token refresh failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read token response: {e}")))?;
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "token refresh rejected (HTTP {}): {text}",
                status.as_u16()
            )));
        }

        let refreshed: RefreshResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Protocol(format!("unexpected token response: {e}")))?;

        let now = jiff::Timestamp::now().as_second();
        user.expiry = refreshed
            .expires_in
            .and_then(|secs| jiff::Timestamp::from_second(now + secs).ok())
            .map(|ts| ts.to_string());
        user.token = Some(refreshed.access_token.clone());
        Ok(refreshed.access_token)
    }
}
