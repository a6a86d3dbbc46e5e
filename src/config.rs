//! Configuration types for blank-page extraction.
//!
//! All per-request behaviour is controlled through [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. Only the knobs the service
//! has always exposed are configurable: the rasterisation DPI and the
//! output kind. The whiteness policy (channel level, blankness threshold,
//! classification width cap) stays fixed in [`crate::pipeline::classify`]
//! and [`crate::pipeline::select`] so two runs on the same file always
//! agree on which page is blank.

use crate::error::BlankPageError;
use crate::progress::ExtractionProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default rasterisation DPI.
pub const DEFAULT_DPI: u32 = 300;

/// Lowest accepted DPI.
pub const MIN_DPI: u32 = 36;

/// Highest accepted DPI. An A4 page at 600 DPI is already ~35 Mpx.
pub const MAX_DPI: u32 = 600;

/// Configuration for one blank-page extraction request.
///
/// # Example
/// ```rust
/// use blankpage::{ExtractionConfig, OutputKind};
///
/// let config = ExtractionConfig::builder()
///     .dpi(150)
///     .output_kind(OutputKind::Image)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rendering DPI for both the source scan and the optional image output.
    /// Range: 36–600. Default: 300.
    pub dpi: u32,

    /// Whether the result is returned as a one-page PDF or a PNG.
    pub output_kind: OutputKind,

    /// Name or path of the LibreOffice `soffice` executable. Default: `soffice`.
    pub soffice_path: String,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional observer for stage transitions and per-page scores.
    pub progress_callback: Option<Arc<dyn ExtractionProgressCallback>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            output_kind: OutputKind::default(),
            soffice_path: "soffice".to_string(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("output_kind", &self.output_kind)
            .field("soffice_path", &self.soffice_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.config.output_kind = kind;
        self
    }

    pub fn soffice_path(mut self, path: impl Into<String>) -> Self {
        self.config.soffice_path = path.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ExtractionProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, BlankPageError> {
        let c = &self.config;
        if !(MIN_DPI..=MAX_DPI).contains(&c.dpi) {
            return Err(BlankPageError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.soffice_path.trim().is_empty() {
            return Err(BlankPageError::InvalidConfig(
                "soffice path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What the caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// A single-page PDF. (default)
    #[default]
    Document,
    /// The single page rasterised once more and PNG-encoded.
    Image,
}

impl FromStr for OutputKind {
    type Err = BlankPageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" | "document" => Ok(OutputKind::Document),
            "image" | "png" => Ok(OutputKind::Image),
            _ => Err(BlankPageError::UnsupportedFormat {
                what: "output type",
                value: s.to_string(),
                accepted: "pdf, image",
            }),
        }
    }
}
