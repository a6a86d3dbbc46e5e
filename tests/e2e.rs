//! End-to-end tests against a real pdfium.
//!
//! Fixture PDFs are built with pdfium itself, so no files need to be
//! checked in. The tests are gated behind the `E2E_ENABLED` environment
//! variable and also skip when libpdfium cannot be bound.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/lib cargo test --test e2e -- --nocapture
//!
//! The slide-deck test additionally needs LibreOffice (`soffice`) on PATH.

use blankpage::pipeline::edit::{PageEditor, PdfiumEditor};
use blankpage::pipeline::pdfium::bind_pdfium;
use blankpage::{
    extract_blank, extract_blank_from_bytes, extract_blank_to_file, Artifact, ExtractionConfig,
    OutputKind, PageGeometry, PageOrigin,
};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set and pdfium binds.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if let Err(e) = bind_pdfium() {
            println!("SKIP — pdfium not available: {e}");
            return;
        }
    }};
}

const LETTER: (f32, f32) = (612.0, 792.0);
const LANDSCAPE: (f32, f32) = (960.0, 540.0);
const A5: (f32, f32) = (419.53, 595.28);

/// Page size plus whether to draw a large filled rectangle on it.
type Spec = ((f32, f32), bool);

/// Build a PDF at `path` with one page per spec.
fn build_pdf(path: &Path, pages: &[Spec]) {
    let pdfium = bind_pdfium().unwrap();
    let mut doc = pdfium.create_new_pdf().unwrap();

    for &((w, h), inked) in pages {
        let mut page = doc
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(w),
                PdfPoints::new(h),
            ))
            .unwrap();
        if inked {
            // Covers the middle 80% × 80% of the page.
            let rect = PdfRect::new_from_values(h * 0.1, w * 0.1, h * 0.9, w * 0.9);
            page.objects_mut()
                .create_path_object_rect(rect, None, None, Some(PdfColor::BLACK))
                .unwrap();
        }
    }

    doc.save_to_file(path).unwrap();
}

fn fixture(dir: &TempDir, name: &str, pages: &[Spec]) -> PathBuf {
    let path = dir.path().join(name);
    build_pdf(&path, pages);
    path
}

/// Page count and first-page geometry of a serialised PDF.
fn inspect_bytes(dir: &TempDir, bytes: &[u8]) -> (usize, PageGeometry) {
    let path = dir.path().join("inspect.pdf");
    std::fs::write(&path, bytes).unwrap();
    let editor = PdfiumEditor;
    let count = editor.page_count(&path).unwrap();
    let geometry = editor.page_geometry(&path, 0).unwrap();
    (count, geometry)
}

fn assert_geometry_close(actual: PageGeometry, expected: (f32, f32), context: &str) {
    assert!(
        (actual.width - expected.0).abs() < 0.01 && (actual.height - expected.1).abs() < 0.01,
        "[{context}] geometry {actual} != {expected:?}"
    );
}

fn config(dpi: u32, kind: OutputKind) -> ExtractionConfig {
    ExtractionConfig::builder()
        .dpi(dpi)
        .output_kind(kind)
        .build()
        .unwrap()
}

// ── Editor round-trips ───────────────────────────────────────────────────────

#[test]
fn e2e_copy_page_round_trip() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let source = fixture(
        &dir,
        "mixed.pdf",
        &[(LETTER, true), (LANDSCAPE, false), (A5, true)],
    );
    let editor = PdfiumEditor;

    assert_eq!(editor.page_count(&source).unwrap(), 3);
    for index in 0..3 {
        let expected = editor.page_geometry(&source, index).unwrap();
        let bytes = editor.copy_page(&source, index).unwrap();
        let (count, geometry) = inspect_bytes(&dir, &bytes);
        assert_eq!(count, 1, "page {index}");
        assert_geometry_close(geometry, (expected.width, expected.height), "copy");
    }
}

#[test]
fn e2e_blank_page_has_exact_size() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let editor = PdfiumEditor;

    for size in [LETTER, LANDSCAPE, A5, (PageGeometry::A4.width, PageGeometry::A4.height)] {
        let bytes = editor
            .new_blank_page(PageGeometry::new(size.0, size.1))
            .unwrap();
        let (count, geometry) = inspect_bytes(&dir, &bytes);
        assert_eq!(count, 1);
        assert_geometry_close(geometry, size, "blank");
    }
}

// ── Full pipeline ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_extracts_middle_blank_page() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let source = fixture(
        &dir,
        "report.pdf",
        &[(LETTER, true), (LANDSCAPE, false), (LETTER, true)],
    );

    let output = extract_blank(source.to_string_lossy(), &config(72, OutputKind::Document))
        .await
        .unwrap();

    assert_eq!(output.origin, PageOrigin::Extracted { page_index: 1 });
    assert_eq!(output.file_name(), "blank-page-2.pdf");
    assert!(output.scores[0] > 0.5, "inked page scored {}", output.scores[0]);
    assert!(output.scores[1] < 0.02, "blank page scored {}", output.scores[1]);

    let (count, geometry) = inspect_bytes(&dir, output.artifact.bytes());
    assert_eq!(count, 1);
    assert_geometry_close(geometry, LANDSCAPE, "extracted");
}

#[tokio::test]
async fn e2e_synthesises_when_every_page_is_inked() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let source = fixture(&dir, "dense.pdf", &[(A5, true), (LETTER, true)]);

    let output = extract_blank(source.to_string_lossy(), &config(72, OutputKind::Document))
        .await
        .unwrap();

    assert_eq!(output.origin, PageOrigin::Synthesized);
    assert_eq!(output.file_name(), "blank-generated.pdf");
    let (count, geometry) = inspect_bytes(&dir, output.artifact.bytes());
    assert_eq!(count, 1);
    assert_geometry_close(geometry, A5, "synthesised");
}

#[tokio::test]
async fn e2e_image_output_matches_dpi() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let source = fixture(&dir, "one.pdf", &[(LETTER, true), (LETTER, false)]);

    let output = extract_blank(source.to_string_lossy(), &config(144, OutputKind::Image))
        .await
        .unwrap();

    assert_eq!(output.file_name(), "blank-page-2.png");
    match output.artifact {
        Artifact::Image {
            ref png,
            width,
            height,
        } => {
            let (ew, eh) = PageGeometry::new(LETTER.0, LETTER.1).pixel_size(144);
            assert!(width.abs_diff(ew) <= 1 && height.abs_diff(eh) <= 1);
            let decoded = image::load_from_memory(png).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (width, height));
        }
        ref other => panic!("expected an image, got {other:?}"),
    }
}

#[tokio::test]
async fn e2e_classification_is_stable_across_dpi() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let source = fixture(&dir, "mixed.pdf", &[(LETTER, true), (LETTER, false)]);
    let input = source.to_string_lossy().into_owned();

    let low = extract_blank(&input, &config(72, OutputKind::Document))
        .await
        .unwrap();
    let high = extract_blank(&input, &config(300, OutputKind::Document))
        .await
        .unwrap();

    assert_eq!(low.origin, high.origin);
    for (a, b) in low.scores.iter().zip(&high.scores) {
        assert!((a - b).abs() < 0.01, "{a} vs {b}");
    }
}

#[tokio::test]
async fn e2e_upload_and_write_to_file() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let source = fixture(&dir, "upload.pdf", &[(LETTER, false)]);
    let bytes = std::fs::read(&source).unwrap();

    let output = extract_blank_from_bytes(&bytes, "My Upload.pdf", &config(72, OutputKind::Document))
        .await
        .unwrap();
    assert_eq!(output.origin.label(), "page 1");

    let target = dir.path().join("out/blank.pdf");
    extract_blank_to_file(source.to_string_lossy(), &target, &config(72, OutputKind::Document))
        .await
        .unwrap();
    let (count, _) = inspect_bytes(&dir, &std::fs::read(&target).unwrap());
    assert_eq!(count, 1);
}

#[tokio::test]
async fn e2e_slide_deck_round_trip() {
    e2e_skip_unless_ready!();
    if std::process::Command::new("soffice")
        .arg("--version")
        .output()
        .is_err()
    {
        println!("SKIP — soffice not on PATH");
        return;
    }
    let dir = TempDir::new().unwrap();
    let source = fixture(&dir, "slides.pdf", &[(LANDSCAPE, true), (LANDSCAPE, false)]);
    let config = config(72, OutputKind::Document);

    let deck = blankpage::convert_document(
        source.to_string_lossy(),
        blankpage::TargetFormat::Pptx,
        &config,
    )
    .await
    .unwrap();
    assert_eq!(deck.file_name, "slides.pptx");

    let output = extract_blank_from_bytes(&deck.bytes, &deck.file_name, &config)
        .await
        .unwrap();
    assert!(!output.artifact.bytes().is_empty());
}
