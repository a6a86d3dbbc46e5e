//! Page-level document editing: measure pages, copy one page out, or build
//! a blank page.
//!
//! [`PageEditor`] is the narrow contract the pipeline needs from a PDF
//! library. [`extract`] and [`synthesize`] wrap it with the preconditions
//! and error mapping of the two result branches, so the orchestrator never
//! talks to the editor directly.

use crate::error::BlankPageError;
use crate::output::{PageGeometry, PageOrigin, SinglePageDocument};
use crate::pipeline::pdfium::bind_pdfium;
use pdfium_render::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure reported by a [`PageEditor`]; the caller decides which
/// [`BlankPageError`] it becomes.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EditError(pub String);

impl From<PdfiumError> for EditError {
    fn from(e: PdfiumError) -> Self {
        EditError(format!("{:?}", e))
    }
}

impl From<BlankPageError> for EditError {
    fn from(e: BlankPageError) -> Self {
        EditError(e.to_string())
    }
}

/// Minimal page-manipulation contract over a PDF library.
pub trait PageEditor: Send + Sync {
    /// Number of pages in the PDF at `path`.
    fn page_count(&self, path: &Path) -> Result<usize, EditError>;

    /// Media-box size of page `index` (0-based), in points.
    fn page_geometry(&self, path: &Path, index: usize) -> Result<PageGeometry, EditError>;

    /// A new PDF holding only page `index` of `path`, serialised.
    fn copy_page(&self, path: &Path, index: usize) -> Result<Vec<u8>, EditError>;

    /// A new PDF holding one empty page of the given size, serialised.
    fn new_blank_page(&self, geometry: PageGeometry) -> Result<Vec<u8>, EditError>;
}

/// Copy source page `index` into a standalone one-page document.
///
/// # Errors
/// [`BlankPageError::PageIndexOutOfRange`] when `index` is past the last
/// page; [`BlankPageError::ExtractionFailure`] when the editor fails.
pub fn extract(
    editor: &dyn PageEditor,
    source: &Path,
    index: usize,
) -> Result<SinglePageDocument, BlankPageError> {
    let failure = |e: EditError| BlankPageError::ExtractionFailure {
        page: index + 1,
        detail: e.0,
    };

    let page_count = editor.page_count(source).map_err(failure)?;
    if index >= page_count {
        return Err(BlankPageError::PageIndexOutOfRange { index, page_count });
    }

    let geometry = editor.page_geometry(source, index).map_err(failure)?;
    let pdf = editor.copy_page(source, index).map_err(failure)?;
    info!("Extracted page {} ({})", index + 1, geometry);

    Ok(SinglePageDocument {
        origin: PageOrigin::Extracted { page_index: index },
        geometry,
        pdf,
    })
}

/// Size for a synthesised page: the first source page, or A4 when the
/// source has no pages.
pub fn synthesis_geometry(
    editor: &dyn PageEditor,
    source: &Path,
) -> Result<PageGeometry, BlankPageError> {
    let failure = |e: EditError| BlankPageError::SynthesisFailure {
        detail: format!("cannot read source geometry: {}", e),
    };

    let page_count = editor.page_count(source).map_err(failure)?;
    if page_count == 0 {
        warn!("Source has no pages; falling back to A4");
        return Ok(PageGeometry::A4);
    }

    editor.page_geometry(source, 0).map_err(failure)
}

/// Build a standalone one-page document with an empty page of `geometry`.
///
/// # Errors
/// [`BlankPageError::SynthesisFailure`] for a non-positive size or when
/// the editor fails.
pub fn synthesize(
    editor: &dyn PageEditor,
    geometry: PageGeometry,
) -> Result<SinglePageDocument, BlankPageError> {
    if !geometry.is_valid() {
        return Err(BlankPageError::SynthesisFailure {
            detail: format!("invalid page size {}", geometry),
        });
    }

    let pdf = editor
        .new_blank_page(geometry)
        .map_err(|e| BlankPageError::SynthesisFailure { detail: e.0 })?;
    info!("Synthesised blank page ({})", geometry);

    Ok(SinglePageDocument {
        origin: PageOrigin::Synthesized,
        geometry,
        pdf,
    })
}

// ── pdfium backend ───────────────────────────────────────────────────────

/// [`PageEditor`] backed by pdfium.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumEditor;

impl PageEditor for PdfiumEditor {
    fn page_count(&self, path: &Path) -> Result<usize, EditError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium.load_pdf_from_file(path, None)?;
        Ok(document.pages().len() as usize)
    }

    fn page_geometry(&self, path: &Path, index: usize) -> Result<PageGeometry, EditError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium.load_pdf_from_file(path, None)?;
        let page = document.pages().get(index as u16)?;

        // pdfium only reads a MediaBox set on the page itself, not one
        // inherited from the page tree.
        let media = match page.boundaries().media() {
            Ok(media) => Some(PageGeometry::new(
                media.bounds.width().value,
                media.bounds.height().value,
            )),
            Err(e) => {
                debug!("No media box on page {} ({:?})", index + 1, e);
                None
            }
        };
        let page_size = PageGeometry::new(page.width().value, page.height().value);
        Ok(media_or_page_size(media, page_size, index))
    }

    fn copy_page(&self, path: &Path, index: usize) -> Result<Vec<u8>, EditError> {
        let pdfium = bind_pdfium()?;
        let source = pdfium.load_pdf_from_file(path, None)?;
        let mut target = pdfium.create_new_pdf()?;
        target
            .pages_mut()
            .copy_page_from_document(&source, index as u16, 0)?;
        Ok(target.save_to_bytes()?)
    }

    fn new_blank_page(&self, geometry: PageGeometry) -> Result<Vec<u8>, EditError> {
        let pdfium = bind_pdfium()?;
        let mut document = pdfium.create_new_pdf()?;
        document.pages_mut().create_page_at_end(PdfPagePaperSize::Custom(
            PdfPoints::new(geometry.width),
            PdfPoints::new(geometry.height),
        ))?;
        Ok(document.save_to_bytes()?)
    }
}

/// Prefer the media box. `page_size` is pdfium's reported size, which is the
/// crop box with `/Rotate` applied, so it can differ from the media box.
fn media_or_page_size(
    media: Option<PageGeometry>,
    page_size: PageGeometry,
    index: usize,
) -> PageGeometry {
    match media {
        Some(media) if media.is_valid() => media,
        _ => {
            warn!(
                "Page {} has no readable media box; using its crop-box size {}",
                index + 1,
                page_size
            );
            page_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Editor over a fixed list of page sizes; records what it was asked to build.
    struct FixedEditor {
        pages: Vec<PageGeometry>,
        fail: bool,
        built: Mutex<Vec<PageGeometry>>,
    }

    impl FixedEditor {
        fn new(pages: Vec<PageGeometry>) -> Self {
            Self {
                pages,
                fail: false,
                built: Mutex::new(Vec::new()),
            }
        }
    }

    impl PageEditor for FixedEditor {
        fn page_count(&self, _path: &Path) -> Result<usize, EditError> {
            if self.fail {
                return Err(EditError("unreadable".into()));
            }
            Ok(self.pages.len())
        }

        fn page_geometry(&self, _path: &Path, index: usize) -> Result<PageGeometry, EditError> {
            self.pages
                .get(index)
                .copied()
                .ok_or_else(|| EditError(format!("no page {index}")))
        }

        fn copy_page(&self, _path: &Path, index: usize) -> Result<Vec<u8>, EditError> {
            Ok(format!("copy:{index}").into_bytes())
        }

        fn new_blank_page(&self, geometry: PageGeometry) -> Result<Vec<u8>, EditError> {
            self.built.lock().unwrap().push(geometry);
            Ok(b"blank".to_vec())
        }
    }

    const LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
    };

    #[test]
    fn extract_copies_requested_page() {
        let editor = FixedEditor::new(vec![PageGeometry::A4, LETTER]);
        let doc = extract(&editor, Path::new("in.pdf"), 1).unwrap();
        assert_eq!(doc.origin, PageOrigin::Extracted { page_index: 1 });
        assert_eq!(doc.geometry, LETTER);
        assert_eq!(doc.pdf, b"copy:1");
    }

    #[test]
    fn extract_out_of_range() {
        let editor = FixedEditor::new(vec![LETTER]);
        let err = extract(&editor, Path::new("in.pdf"), 1).unwrap_err();
        assert!(matches!(
            err,
            BlankPageError::PageIndexOutOfRange {
                index: 1,
                page_count: 1
            }
        ));
    }

    #[test]
    fn extract_maps_editor_failure() {
        let mut editor = FixedEditor::new(vec![LETTER]);
        editor.fail = true;
        let err = extract(&editor, Path::new("in.pdf"), 0).unwrap_err();
        assert!(matches!(err, BlankPageError::ExtractionFailure { page: 1, .. }));
    }

    #[test]
    fn synthesis_uses_first_page_geometry() {
        let editor = FixedEditor::new(vec![LETTER, PageGeometry::A4]);
        let g = synthesis_geometry(&editor, Path::new("in.pdf")).unwrap();
        assert_eq!(g, LETTER);
    }

    #[test]
    fn synthesis_falls_back_to_a4() {
        let editor = FixedEditor::new(vec![]);
        let g = synthesis_geometry(&editor, Path::new("in.pdf")).unwrap();
        assert_eq!(g, PageGeometry::A4);
    }

    #[test]
    fn synthesize_builds_exact_size() {
        let editor = FixedEditor::new(vec![]);
        let g = PageGeometry::new(300.5, 410.25);
        let doc = synthesize(&editor, g).unwrap();
        assert_eq!(doc.origin, PageOrigin::Synthesized);
        assert_eq!(doc.geometry, g);
        assert_eq!(*editor.built.lock().unwrap(), vec![g]);
    }

    #[test]
    fn synthesize_rejects_degenerate_size() {
        let editor = FixedEditor::new(vec![]);
        let err = synthesize(&editor, PageGeometry::new(0.0, 100.0)).unwrap_err();
        assert!(matches!(err, BlankPageError::SynthesisFailure { .. }));
        assert!(editor.built.lock().unwrap().is_empty());
    }

    #[test]
    fn synthesis_geometry_maps_failure() {
        let mut editor = FixedEditor::new(vec![LETTER]);
        editor.fail = true;
        let err = synthesis_geometry(&editor, Path::new("in.pdf")).unwrap_err();
        assert!(err.to_string().contains("unreadable"));
    }

    #[test]
    fn media_box_preferred_over_crop_size() {
        let media = PageGeometry::new(612.0, 792.0);
        let rotated_crop = PageGeometry::new(792.0, 612.0);
        assert_eq!(media_or_page_size(Some(media), rotated_crop, 0), media);
    }

    #[test]
    fn missing_media_box_falls_back_to_page_size() {
        let crop = PageGeometry::new(500.0, 700.0);
        assert_eq!(media_or_page_size(None, crop, 2), crop);
        let empty = PageGeometry::new(0.0, 0.0);
        assert_eq!(media_or_page_size(Some(empty), crop, 2), crop);
    }
}
