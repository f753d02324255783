//! Text extraction: the [`Extractor`] capability and the adapter that turns its failures into
//! "no content".

pub mod tika;

use std::path::Path;
use std::time::Duration;

use crate::engine::tools::sanitize_content_type;
use crate::errors::ExtractionError;
use crate::utils::{LogCategory, RunLog};

pub use tika::TikaClient;

/// Raw response of an extraction service for one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    /// Media type as reported, unsanitized. `None` when the service reported none.
    pub content_type: Option<String>,
}

/// A service that turns a document into plain text plus a content type.
pub trait Extractor {
    fn extract(&self, path: &Path, timeout: Duration) -> Result<Extraction, ExtractionError>;
}

/// Text ready for matching. `content_type` is sanitized and never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub content_type: String,
}

/// Adapter between the orchestrator and an [`Extractor`]: applies the timeout, writes the
/// extraction log, and reports failures and blank text alike as `None`.
pub struct TextExtractor<'a> {
    backend: &'a dyn Extractor,
    timeout: Duration,
    log: &'a RunLog,
}

impl<'a> TextExtractor<'a> {
    pub fn new(backend: &'a dyn Extractor, timeout: Duration, log: &'a RunLog) -> Self {
        Self {
            backend,
            timeout,
            log,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn extract_text(&self, path: &Path) -> Option<ExtractedText> {
        self.log.info(
            LogCategory::Extraction,
            &format!("Processing file: {}", path.display()),
        );
        match self.backend.extract(path, self.timeout) {
            Ok(extraction) if extraction.text.trim().is_empty() => None,
            Ok(extraction) => Some(ExtractedText {
                content_type: sanitize_content_type(extraction.content_type.as_deref()),
                text: extraction.text,
            }),
            Err(e) => {
                self.log.error(
                    LogCategory::Extraction,
                    &format!("Error processing file {}: {}", path.display(), e),
                );
                None
            }
        }
    }
}
