//! PDF rasterisation: render every page of a document to a `DynamicImage`.
//!
//! Pages are scaled by `dpi / 72`, so a page of `w × h` points comes out as
//! roughly `w·dpi/72 × h·dpi/72` pixels. There is no pixel cap here; the
//! classifier bounds its own work by downscaling.
//!
//! pdfium is CPU-bound and not async-safe. Callers on a Tokio runtime run
//! [`Rasterizer::render`] inside `spawn_blocking`.

use crate::error::BlankPageError;
use crate::pipeline::pdfium::bind_pdfium;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Renders document pages to raster images.
pub trait Rasterizer: Send + Sync {
    /// Rasterise every page of the PDF at `path`, in page order.
    ///
    /// An empty vector means the document has no pages.
    fn render(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, BlankPageError>;
}

/// [`Rasterizer`] backed by pdfium.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRasterizer;

impl Rasterizer for PdfiumRasterizer {
    fn render(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, BlankPageError> {
        let pdfium = bind_pdfium()?;
        render_document(&pdfium, path, dpi)
    }
}

fn render_document(
    pdfium: &Pdfium,
    path: &Path,
    dpi: u32,
) -> Result<Vec<DynamicImage>, BlankPageError> {
    let render_failure = |detail: String| BlankPageError::RenderFailure {
        path: path.to_path_buf(),
        detail,
    };

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| render_failure(format!("cannot open document: {:?}", e)))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages, rendering at {} DPI", total_pages, dpi);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

    let mut images = Vec::with_capacity(total_pages);
    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| render_failure(format!("page {}: {:?}", idx + 1, e)))?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| render_failure(format!("page {}: {:?}", idx + 1, e)))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}
