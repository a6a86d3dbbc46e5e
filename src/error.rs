//! Error types for the blankpage library.
//!
//! Every failure is fatal to the request that hit it and to nothing else:
//! a call either returns exactly one artifact or exactly one
//! [`BlankPageError`]. There are no partial results and nothing is retried.
//!
//! Each external step (download, slide-deck conversion, rasterisation,
//! page copy, blank-page synthesis) maps its failure onto its own variant at
//! the call site, so callers can tell *which* step failed without parsing
//! message strings. [`BlankPageError::kind`] flattens that into a stable tag
//! for machine-readable reports.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the blankpage library.
#[derive(Debug, Error)]
pub enum BlankPageError {
    // ── Request validation ────────────────────────────────────────────────
    /// Upload extension, output kind, or conversion target is not accepted.
    ///
    /// Raised before any conversion or rendering is attempted.
    #[error("Unsupported {what}: '{value}'\nAccepted: {accepted}")]
    UnsupportedFormat {
        what: &'static str,
        value: String,
        accepted: &'static str,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a usable file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// The external office converter failed or produced no output file.
    #[error("Conversion of '{path}' failed: {detail}")]
    ConversionFailure { path: PathBuf, detail: String },

    /// Rasterising the source (or the result page) failed or produced no image.
    #[error("Rendering '{path}' failed: {detail}")]
    RenderFailure { path: PathBuf, detail: String },

    /// Extraction was asked for a page the document does not have.
    #[error("Page index {index} is out of range (document has {page_count} pages)")]
    PageIndexOutOfRange { index: usize, page_count: usize },

    /// Copying an in-range page into a new document failed.
    #[error("Failed to extract page {page}: {detail}")]
    ExtractionFailure { page: usize, detail: String },

    /// Reading the source geometry or building the blank page failed.
    #[error("Failed to create blank page: {detail}")]
    SynthesisFailure { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/dir containing libpdfium.\n\
  • Place libpdfium next to the binary or in the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable, serialisable category of a [`BlankPageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    ConversionFailure,
    RenderFailure,
    PageIndexOutOfRange,
    ExtractionFailure,
    SynthesisFailure,
    Input,
    Output,
    Config,
    Internal,
}

impl BlankPageError {
    /// Category tag for reports and exit-code mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::ConversionFailure { .. } => ErrorKind::ConversionFailure,
            Self::RenderFailure { .. } => ErrorKind::RenderFailure,
            Self::PageIndexOutOfRange { .. } => ErrorKind::PageIndexOutOfRange,
            Self::ExtractionFailure { .. } => ErrorKind::ExtractionFailure,
            Self::SynthesisFailure { .. } => ErrorKind::SynthesisFailure,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::InvalidInput { .. }
            | Self::DownloadFailed { .. }
            | Self::DownloadTimeout { .. } => ErrorKind::Input,
            Self::OutputWriteFailed { .. } => ErrorKind::Output,
            Self::InvalidConfig(_) => ErrorKind::Config,
            Self::PdfiumBindingFailed(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
