//! Cosmo Parser - Input loading and text normalization
//!
//! Supports:
//! - Plain text uploads (`.txt`)
//! - HTML uploads (`.html`, `.htm`)
//! - Fetching a web page over HTTP
//!
//! Every input ends up as a `RawDocument` whose content is passed
//! through [`normalize::clean_text`] before knowledge extraction.

pub mod fetch;
pub mod normalize;

pub use fetch::{FetchError, PageFetcher};
pub use normalize::clean_text;

use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading an input document
#[derive(Error, Debug)]
pub enum ParserError {
    /// File format is not supported
    #[error("Unsupported file format: {0} (expected .txt or .html)")]
    UnsupportedFormat(String),

    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid UTF-8
    #[error("Text encoding error in {0}: content is not valid UTF-8")]
    EncodingError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for cosmo_core::CosmoError {
    fn from(err: ParserError) -> Self {
        cosmo_core::CosmoError::InputError(err.to_string())
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    PlainText,
    Html,
}

impl InputFormat {
    /// Detect the format from a file name's extension
    pub fn from_filename(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(Self::PlainText),
            "html" | "htm" => Ok(Self::Html),
            _ => Err(ParserError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Raw input read fully into memory
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// File name or URL the content came from
    pub source: String,

    /// Detected format
    pub format: InputFormat,

    /// Undecorated content, markup included
    pub content: String,
}

impl RawDocument {
    /// Build from uploaded bytes
    pub fn from_upload(filename: &str, bytes: &[u8]) -> Result<Self> {
        let format = InputFormat::from_filename(filename)?;
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ParserError::EncodingError(filename.to_string()))?
            .to_string();

        Ok(Self {
            source: filename.to_string(),
            format,
            content,
        })
    }

    /// Read a file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy().to_string();
        // Check the extension before touching the disk
        InputFormat::from_filename(&name)?;

        let bytes = std::fs::read(path).map_err(|e| ParserError::IoError {
            path: name.clone(),
            source: e,
        })?;

        Self::from_upload(&name, &bytes)
    }

    /// Wrap a fetched web page
    pub fn from_page(url: &str, body: String) -> Self {
        Self {
            source: url.to_string(),
            format: InputFormat::Html,
            content: body,
        }
    }

    /// Plain text ready for extraction
    pub fn cleaned(&self) -> String {
        clean_text(&self.content)
    }

    /// Get total word count of the cleaned text (approximate)
    pub fn word_count(&self) -> usize {
        self.cleaned().split_whitespace().count()
    }
}

// ============================================================================
// Tests
// ============================================================================
