//! Result types: page geometry, the single-page result, and the artifact
//! handed back to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page size in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    /// ISO A4 portrait, used when the source has no page to measure.
    pub const A4: PageGeometry = PageGeometry {
        width: 595.276,
        height: 841.89,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both sides strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Pixel dimensions of this page rasterised at `dpi`.
    pub fn pixel_size(&self, dpi: u32) -> (u32, u32) {
        let scale = dpi as f32 / 72.0;
        (
            (self.width * scale).round() as u32,
            (self.height * scale).round() as u32,
        )
    }
}

impl fmt::Display for PageGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} × {:.2} pt", self.width, self.height)
    }
}

/// Where the result page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum PageOrigin {
    /// Copied verbatim from the source; `page_index` is 0-based.
    Extracted { page_index: usize },
    /// Built from scratch because no source page was blank.
    Synthesized,
}

impl PageOrigin {
    /// 1-based source page number, if the page was extracted.
    pub fn page_number(&self) -> Option<usize> {
        match self {
            PageOrigin::Extracted { page_index } => Some(page_index + 1),
            PageOrigin::Synthesized => None,
        }
    }

    /// Human label: `"page N"` or `"generated"`.
    pub fn label(&self) -> String {
        match self.page_number() {
            Some(n) => format!("page {n}"),
            None => "generated".to_string(),
        }
    }

    /// File stem used for download names: `blank-page-N` or `blank-generated`.
    pub fn file_stem(&self) -> String {
        match self.page_number() {
            Some(n) => format!("blank-page-{n}"),
            None => "blank-generated".to_string(),
        }
    }
}

/// A one-page PDF produced by extraction or synthesis.
#[derive(Clone)]
pub struct SinglePageDocument {
    pub origin: PageOrigin,
    pub geometry: PageGeometry,
    /// Serialised PDF bytes.
    pub pdf: Vec<u8>,
}

impl fmt::Debug for SinglePageDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinglePageDocument")
            .field("origin", &self.origin)
            .field("geometry", &self.geometry)
            .field("pdf", &format_args!("<{} bytes>", self.pdf.len()))
            .finish()
    }
}

/// The payload returned to the caller.
#[derive(Clone)]
pub enum Artifact {
    /// The single-page PDF.
    Document(Vec<u8>),
    /// The single page rasterised and PNG-encoded.
    Image { png: Vec<u8>, width: u32, height: u32 },
}

impl Artifact {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Artifact::Document(b) => b,
            Artifact::Image { png, .. } => png,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Artifact::Document(_) => "pdf",
            Artifact::Image { .. } => "png",
        }
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Document(b) => write!(f, "Document(<{} bytes>)", b.len()),
            Artifact::Image { png, width, height } => {
                write!(f, "Image({width}x{height}, <{} bytes>)", png.len())
            }
        }
    }
}

/// Timing and size figures for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the (possibly converted) source document.
    pub total_pages: usize,
    pub dpi: u32,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The complete result of a successful blank-page request.
#[derive(Debug, Clone)]
pub struct BlankPageOutput {
    pub origin: PageOrigin,
    pub geometry: PageGeometry,
    pub artifact: Artifact,
    /// Blankness score per source page, in page order.
    pub scores: Vec<f64>,
    pub stats: ExtractionStats,
}

impl BlankPageOutput {
    /// Download name: `blank-page-N.pdf`, `blank-generated.png`, ...
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.origin.file_stem(), self.artifact.extension())
    }

    /// JSON-friendly summary without the artifact bytes.
    pub fn report(&self) -> OutputReport {
        OutputReport {
            origin: self.origin,
            label: self.origin.label(),
            file_name: self.file_name(),
            geometry: self.geometry,
            scores: self.scores.clone(),
            stats: self.stats.clone(),
        }
    }
}

/// Serialisable summary of a [`BlankPageOutput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputReport {
    #[serde(flatten)]
    pub origin: PageOrigin,
    pub label: String,
    pub file_name: String,
    pub geometry: PageGeometry,
    pub scores: Vec<f64>,
    pub stats: ExtractionStats,
}

/// A whole file converted between PDF and PPTX.
#[derive(Clone)]
pub struct ConvertedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ConvertedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedDocument")
            .field("file_name", &self.file_name)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}
