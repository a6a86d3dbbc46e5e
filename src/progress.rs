//! Progress-callback trait for extraction pipeline events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to observe
//! the request as it moves through its stages and to see each page's
//! blankness score as it is computed.
//!
//! # Example
//!
//! ```rust
//! use blankpage::{ExtractionConfig, ExtractionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ExtractionProgressCallback for Printer {
//!     fn on_stage(&self, stage: Stage) {
//!         eprintln!("-> {stage}");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::PageOrigin;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The states a single extraction request moves through.
///
/// `Converting` only occurs for slide-deck input; `RenderingOutput` only
/// when an image was requested. Exactly one of `Extracting` and
/// `Synthesizing` occurs per successful request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Converting,
    Rasterizing,
    Classifying,
    Selecting,
    Extracting,
    Synthesizing,
    RenderingOutput,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Received => "received",
            Stage::Converting => "converting slides to PDF",
            Stage::Rasterizing => "rasterising pages",
            Stage::Classifying => "classifying pages",
            Stage::Selecting => "selecting blank page",
            Stage::Extracting => "extracting page",
            Stage::Synthesizing => "synthesising blank page",
            Stage::RenderingOutput => "rendering image",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Called by the extraction pipeline as a request progresses.
///
/// Implementations must be `Send + Sync`; the pipeline may invoke them from
/// blocking worker threads. All methods have default no-op implementations
/// so callers only override what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called on entry to each stage, in order.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once per page after its blankness score is computed.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages in the source document
    /// * `score`       — fraction of sampled pixels that are not near-white
    fn on_page_classified(&self, page_num: usize, total_pages: usize, score: f64) {
        let _ = (page_num, total_pages, score);
    }

    /// Called when the request fails; `stage` is where it failed.
    fn on_failed(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once on success, after the artifact is ready.
    fn on_complete(&self, origin: &PageOrigin) {
        let _ = origin;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
