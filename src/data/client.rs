//! HTTP client for a cherosite board
//!
//! Every call resolves a link against the configured base URL, sends the
//! request with a shared cookie jar (so a login sticks), and treats anything
//! but a success status as an error carrying the response body.

use std::path::{Path, PathBuf};

use reqwest::{multipart, Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use super::Feed;

/// Path that accepts login credentials
pub const LOGIN_PATH: &str = "/login";

/// Path that registers a new account
pub const SIGNIN_PATH: &str = "/signin";

/// Path that ends the current session
pub const LOGOUT_PATH: &str = "/logout";

/// Form field carrying a thread's featured file
const FEATURED_FILE_FIELD: &str = "ft_file";

/// Errors that can occur when talking to the board
#[derive(Debug, Error)]
pub enum SiteError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },

    /// Failed to parse the response body
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The file to upload could not be read
    #[error("could not read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiteError {
    /// Whether the server rejected the request for lack of a session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SiteError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }
}

/// A file uploaded along with a new thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Client bound to one board
#[derive(Debug, Clone)]
pub struct SiteClient {
    /// HTTP client with a cookie store for the session
    http_client: Client,
    /// Base URL without a trailing slash
    base_url: String,
}

impl SiteClient {
    /// Creates a client for the board at `base_url`
    pub fn new(base_url: &str) -> Result<Self, SiteError> {
        let http_client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a link taken from a page or the config
    ///
    /// Absolute links are kept; anything else is joined to the base URL.
    pub fn url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            return link.to_string();
        }
        format!("{}/{}", self.base_url, link.trim_start_matches('/'))
    }

    /// Fetches the next page of a region from its recycle link
    pub async fn recycle(&self, link: &str) -> Result<Feed, SiteError> {
        let url = self.url(link);
        debug!(%url, "recycling content");

        let response = self
            .http_client
            .get(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        parse_feed(status, &body)
    }

    /// Sends an empty POST, as the toggle endpoints expect
    pub async fn post(&self, link: &str) -> Result<String, SiteError> {
        let response = self.http_client.post(self.url(link)).send().await?;
        read_ok(response).await
    }

    pub async fn get(&self, link: &str) -> Result<String, SiteError> {
        let response = self.http_client.get(self.url(link)).send().await?;
        read_ok(response).await
    }

    /// Submits a multipart form and returns the response body
    pub async fn submit_form(
        &self,
        link: &str,
        fields: &[(String, String)],
        attachment: Option<&Attachment>,
    ) -> Result<String, SiteError> {
        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        if let Some(attachment) = attachment {
            form = form.part(FEATURED_FILE_FIELD, file_part(&attachment.path).await?);
        }

        let response = self
            .http_client
            .post(self.url(link))
            .multipart(form)
            .send()
            .await?;
        read_ok(response).await
    }
}

async fn file_part(path: &Path) -> Result<multipart::Part, SiteError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| SiteError::Attachment {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FEATURED_FILE_FIELD.to_string());
    Ok(multipart::Part::bytes(bytes).file_name(file_name))
}

async fn read_ok(response: reqwest::Response) -> Result<String, SiteError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    check_status(status, body)
}

/// Accepts only a 200 response, logging the body of anything else
pub fn check_status(status: u16, body: String) -> Result<String, SiteError> {
    if status == StatusCode::OK.as_u16() {
        return Ok(body);
    }
    warn!(status, body = %body.trim(), "request rejected");
    Err(SiteError::Status { status, body })
}

/// Interprets the answer of a recycle endpoint
///
/// 204 means the region is temporarily unavailable and yields an empty feed.
/// 206 means the server hit an error midway; whatever it sent is still used.
pub fn parse_feed(status: u16, body: &str) -> Result<Feed, SiteError> {
    match status {
        204 => Ok(Feed::default()),
        200 | 206 => {
            if status == 206 {
                warn!("server returned a partial feed");
            }
            if body.trim().is_empty() {
                return Ok(Feed::default());
            }
            serde_json::from_str(body).map_err(|e| SiteError::ParseError(e.to_string()))
        }
        _ => check_status(status, body.to_string()).map(|_| Feed::default()),
    }
}
