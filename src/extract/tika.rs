//! Blocking client for an Apache Tika server (`tika-server`).
//!
//! One `PUT /rmeta/text` per file returns the text and the metadata (including `Content-Type`)
//! of the file and of everything embedded in it, so a matching file costs a single request.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Body, Client};
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION};
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use crate::errors::ExtractionError;
use crate::utils::config::TikaDefaults;

use super::{Extraction, Extractor};

#[derive(Debug, Clone)]
pub struct TikaClient {
    endpoint: String,
    client: Client,
}

impl TikaClient {
    /// Client for the server at `endpoint` (e.g. `http://localhost:9998`).
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("build Tika HTTP client")?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport(&self, e: reqwest::Error, timeout: Duration) -> ExtractionError {
        if e.is_timeout() {
            ExtractionError::Timeout(timeout)
        } else if e.is_connect() {
            ExtractionError::ServiceUnavailable {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        } else {
            ExtractionError::Transport(e.to_string())
        }
    }
}

impl Extractor for TikaClient {
    fn extract(&self, path: &Path, timeout: Duration) -> Result<Extraction, ExtractionError> {
        let file = File::open(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let url = format!("{}{}", self.endpoint, TikaDefaults::RMETA_TEXT_PATH);
        let mut request = self
            .client
            .put(&url)
            .timeout(timeout)
            .header(ACCEPT, "application/json")
            .body(Body::from(file));
        // File name helps Tika's type detection for formats without magic bytes.
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.is_ascii()
        {
            request = request.header(CONTENT_DISPOSITION, format!("attachment; filename={name}"));
        }

        let response = request
            .send()
            .map_err(|e| self.map_transport(e, timeout))?;
        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::UNSUPPORTED_MEDIA_TYPE
        {
            return Err(ExtractionError::Unsupported);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Extraction::default());
        }
        if !status.is_success() {
            return Err(ExtractionError::Service {
                status: status.as_u16(),
            });
        }
        let body: Value = response
            .json()
            .map_err(|e| self.map_transport(e, timeout))?;
        parse_rmeta(&body)
    }
}

/// First value of a metadata field that may be a string or an array of strings.
fn metadata_str(doc: &Value, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(values) => values.iter().find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

/// Turn a `/rmeta/text` response (array of metadata objects, container document first) into
/// an [`Extraction`]. Text of every document (attachments, archive members) is joined in array
/// order; the content type is the container's.
pub fn parse_rmeta(body: &Value) -> Result<Extraction, ExtractionError> {
    let docs = body
        .as_array()
        .ok_or_else(|| ExtractionError::Decode("expected a JSON array".to_string()))?;
    if docs.iter().any(|doc| !doc.is_object()) {
        return Err(ExtractionError::Decode(
            "expected metadata objects in the array".to_string(),
        ));
    }
    let Some(container) = docs.first() else {
        return Ok(Extraction::default());
    };

    let mut text = String::new();
    for content in docs
        .iter()
        .filter_map(|doc| metadata_str(doc, TikaDefaults::CONTENT_KEY))
    {
        // Keep the last line of one document off the first line of the next.
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&content);
    }
    Ok(Extraction {
        text,
        content_type: metadata_str(container, TikaDefaults::CONTENT_TYPE_KEY),
    })
}
