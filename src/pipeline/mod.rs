//! Pipeline stages for blank-page extraction.
//!
//! Each submodule implements exactly one step, so each failure mode can be
//! exercised on its own and backends can be swapped without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ office ──▶ render ──▶ classify ──▶ select ──▶ edit ──▶ render? ──▶ encode?
//! (path/URL) (pptx→pdf) (pdfium)  (score)     (index)   (copy|blank) (image out)
//! ```
//!
//! 1. [`input`]    — check the extension and stage the source in the request workspace
//! 2. [`office`]   — convert slide decks to PDF with headless LibreOffice
//! 3. [`render`]   — rasterise every page at the requested DPI
//! 4. [`classify`] — reduce each raster to a blankness score
//! 5. [`select`]   — first page under the threshold, or synthesise
//! 6. [`edit`]     — copy the selected page, or build a blank page of matching size
//! 7. [`encode`]   — PNG-encode the re-rendered result when an image was asked for
//!
//! The external collaborators (rasterizer, page editor, office converter)
//! sit behind traits and are bundled in [`Backends`].

pub mod classify;
pub mod edit;
pub mod encode;
pub mod input;
pub mod office;
pub mod pdfium;
pub mod render;
pub mod select;

use edit::{PageEditor, PdfiumEditor};
use office::{DocumentConverter, SofficeConverter};
use render::{PdfiumRasterizer, Rasterizer};
use std::fmt;
use std::sync::Arc;

/// The external tools a request runs against.
#[derive(Clone)]
pub struct Backends {
    pub rasterizer: Arc<dyn Rasterizer>,
    pub editor: Arc<dyn PageEditor>,
    pub converter: Arc<dyn DocumentConverter>,
}

impl Backends {
    /// pdfium for rendering and editing, `soffice_path` for conversion.
    pub fn system(soffice_path: &str) -> Self {
        Self {
            rasterizer: Arc::new(PdfiumRasterizer),
            editor: Arc::new(PdfiumEditor),
            converter: Arc::new(SofficeConverter::new(soffice_path)),
        }
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends")
            .field("rasterizer", &"<dyn Rasterizer>")
            .field("editor", &"<dyn PageEditor>")
            .field("converter", &"<dyn DocumentConverter>")
            .finish()
    }
}
