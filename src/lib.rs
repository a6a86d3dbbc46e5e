//! # blankpage
//!
//! Find the first blank page of a PDF or PowerPoint deck and return it as a
//! standalone one-page PDF or PNG, or, when no page is blank, synthesise an
//! empty page with the same size as the source's first page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / PPT / PPTX
//!  │
//!  ├─ 1. Input     check extension, resolve path/URL into a request workspace
//!  ├─ 2. Convert   slide decks → PDF via headless LibreOffice
//!  ├─ 3. Render    rasterise every page via pdfium (spawn_blocking)
//!  ├─ 4. Classify  fraction of non-near-white pixels per page
//!  ├─ 5. Select    first page under 2 % ink, or none
//!  ├─ 6. Edit      copy that page, or build a blank page of matching size
//!  └─ 7. Output    one-page PDF, or the page re-rendered as PNG
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blankpage::{extract_blank, ExtractionConfig, OutputKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .output_kind(OutputKind::Image)
//!         .dpi(150)
//!         .build()?;
//!     let output = extract_blank("slides.pptx", &config).await?;
//!     std::fs::write(output.file_name(), output.artifact.bytes())?;
//!     eprintln!("{} ({})", output.origin.label(), output.geometry);
//!     Ok(())
//! }
//! ```
//!
//! ## Blankness
//!
//! A pixel is near-white when R, G and B are all above 245. A page is blank
//! when fewer than 2 % of its sampled pixels fail that test. Rasters are
//! downscaled to at most 800 px wide before sampling.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `blankpage` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, OutputKind};
pub use convert::{convert_document, convert_document_to_file, convert_document_with};
pub use error::{BlankPageError, ErrorKind};
pub use extract::{
    extract_blank, extract_blank_from_bytes, extract_blank_sync, extract_blank_to_file,
    BlankPageExtractor,
};
pub use output::{
    Artifact, BlankPageOutput, ConvertedDocument, ExtractionStats, OutputReport, PageGeometry,
    PageOrigin, SinglePageDocument,
};
pub use pipeline::office::TargetFormat;
pub use pipeline::Backends;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
