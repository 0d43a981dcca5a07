//! OctoPrint client: G-code upload and a connection check.
//!
//! Print servers on a local network usually run with self-signed
//! certificates, so certificate validation is turned off for this client.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::error::{MakeError, Result};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a successful `POST /api/files/local`.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    files: UploadedFiles,
}

#[derive(Debug, Deserialize)]
struct UploadedFiles {
    local: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    name: String,
}

/// Body of `GET /api/version`.
#[derive(Debug, Default, Deserialize)]
struct VersionResponse {
    server: Option<String>,
    api: Option<String>,
}

/// What a connection check found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Connected { server: String, api: String },
    /// 401: the API key is wrong.
    Unauthorized,
    /// 403: the API key lacks permissions.
    Forbidden,
    Unexpected { status: u16, body: String },
    Unreachable { detail: String },
    TimedOut,
}

/// Talks to one OctoPrint server.
pub struct OctoPrintClient {
    host: String,
    api_key: String,
    client: Client,
    check_timeout: Duration,
}

impl OctoPrintClient {
    /// Create a client for `host` (e.g. `http://octopi.local`).
    pub fn new(host: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            check_timeout: CHECK_TIMEOUT,
        })
    }

    /// Change how long [`check_connection`](Self::check_connection) waits.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn upload_url(&self) -> String {
        format!("{}/api/files/local", self.host)
    }

    /// Read-only `GET /api/version` to see whether the host and key work.
    pub fn check_connection(&self) -> Connection {
        let url = format!("{}/api/version", self.host);
        debug!("Checking connection with {}", url);

        let response = match self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .timeout(self.check_timeout)
            .send()
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Connection::TimedOut,
            Err(e) => {
                return Connection::Unreachable {
                    detail: e.to_string(),
                }
            }
        };

        match response.status() {
            StatusCode::OK => {
                let version: VersionResponse = response.json().unwrap_or_default();
                Connection::Connected {
                    server: version.server.unwrap_or_else(|| "unknown".to_string()),
                    api: version.api.unwrap_or_else(|| "unknown".to_string()),
                }
            }
            StatusCode::UNAUTHORIZED => Connection::Unauthorized,
            StatusCode::FORBIDDEN => Connection::Forbidden,
            status => Connection::Unexpected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default().trim().to_string(),
            },
        }
    }

    /// Upload `gcode`, select it, and start printing if `start_print` is set.
    ///
    /// Returns the file name the server stored it under.
    pub fn upload(&self, gcode: &Path, start_print: bool) -> Result<String> {
        let local_name = gcode
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let form = multipart::Form::new()
            .text("select", "true")
            .text("print", start_print.to_string())
            .file("file", gcode)?;

        debug!("Uploading {} to {}", gcode.display(), self.upload_url());
        let response = self
            .client
            .post(self.upload_url())
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .with_context(|| format!("Failed to connect to {}", self.host))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        if status != StatusCode::CREATED {
            return Err(MakeError::UploadFailed {
                host: self.host.clone(),
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(parsed) => Ok(parsed.files.local.name),
            Err(e) => {
                debug!("Unexpected upload response ({}): {}", e, body);
                Ok(local_name)
            }
        }
    }
}
