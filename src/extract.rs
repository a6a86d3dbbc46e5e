//! Blank-page extraction entry points.
//!
//! A request moves through a fixed sequence of stages:
//!
//! ```text
//! Received → [Converting] → Rasterizing → Classifying → Selecting
//!          → Extracting | Synthesizing → [RenderingOutput] → Done
//! ```
//!
//! Any stage can fail; the first failure ends the request and is returned
//! as a [`BlankPageError`]. Nothing is retried. All intermediate files live
//! in a [`RequestWorkspace`] that is removed when the call returns.

use crate::config::{ExtractionConfig, OutputKind};
use crate::error::BlankPageError;
use crate::output::{Artifact, BlankPageOutput, ExtractionStats, SinglePageDocument};
use crate::pipeline::classify::classify;
use crate::pipeline::input::{self, RequestWorkspace, ResolvedInput, SourceKind};
use crate::pipeline::office::TargetFormat;
use crate::pipeline::select::{Selection, BLANK_THRESHOLD};
use crate::pipeline::{edit, encode, Backends};
use crate::progress::{ProgressCallback, Stage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs blank-page requests against a set of [`Backends`].
///
/// Holds no per-request state; one extractor can serve many concurrent
/// requests, each in its own workspace.
#[derive(Debug, Clone)]
pub struct BlankPageExtractor {
    config: ExtractionConfig,
    backends: Backends,
}

impl BlankPageExtractor {
    /// Extractor using pdfium and the configured `soffice`.
    pub fn new(config: ExtractionConfig) -> Self {
        let backends = Backends::system(&config.soffice_path);
        Self { config, backends }
    }

    /// Extractor over caller-supplied backends.
    pub fn with_backends(config: ExtractionConfig, backends: Backends) -> Self {
        Self { config, backends }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Find or synthesise the blank page for a local path or URL.
    pub async fn extract(&self, input_str: &str) -> Result<BlankPageOutput, BlankPageError> {
        info!("Starting blank-page extraction: {}", input_str);
        let mut tracker = StageTracker::new(self.config.progress_callback.clone());

        let result = async {
            // Reject bad types before creating anything on disk.
            input::source_kind_of(input_str)?;
            let workspace = RequestWorkspace::new()?;
            let resolved =
                input::resolve_input(input_str, &workspace, self.config.download_timeout_secs)
                    .await?;
            self.run(resolved, &workspace, &mut tracker).await
        }
        .await;

        tracker.finish(result)
    }

    /// Same as [`extract`](Self::extract) for an in-memory upload.
    ///
    /// `file_name` is the uploaded name; only its extension and a
    /// sanitised base name are used.
    pub async fn extract_bytes(
        &self,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<BlankPageOutput, BlankPageError> {
        info!("Starting blank-page extraction of upload '{}'", file_name);
        let mut tracker = StageTracker::new(self.config.progress_callback.clone());

        let result = async {
            // Reject bad types before creating anything on disk.
            SourceKind::from_file_name(&input::sanitize_file_name(file_name))?;
            let workspace = RequestWorkspace::new()?;
            let resolved = input::stage_bytes(bytes, file_name, &workspace).await?;
            self.run(resolved, &workspace, &mut tracker).await
        }
        .await;

        tracker.finish(result)
    }

    async fn run(
        &self,
        resolved: ResolvedInput,
        workspace: &RequestWorkspace,
        tracker: &mut StageTracker,
    ) -> Result<BlankPageOutput, BlankPageError> {
        let total_start = Instant::now();
        let dpi = self.config.dpi;

        // ── Step 1: Slide decks → PDF ────────────────────────────────────
        let pdf_path = match resolved.kind {
            SourceKind::Pdf => resolved.path,
            SourceKind::SlideDeck => {
                tracker.enter(Stage::Converting);
                let converter = Arc::clone(&self.backends.converter);
                let out_dir = workspace.path().to_path_buf();
                let source = resolved.path;
                blocking(move || converter.convert(&source, &out_dir, TargetFormat::Pdf)).await?
            }
        };

        // ── Step 2: Rasterise ────────────────────────────────────────────
        tracker.enter(Stage::Rasterizing);
        let render_start = Instant::now();
        let rasters = {
            let rasterizer = Arc::clone(&self.backends.rasterizer);
            let path = pdf_path.clone();
            blocking(move || rasterizer.render(&path, dpi)).await?
        };
        let render_duration_ms = render_start.elapsed().as_millis() as u64;
        let total_pages = rasters.len();
        info!("Rendered {} pages in {}ms", total_pages, render_duration_ms);

        // ── Step 3: Classify ─────────────────────────────────────────────
        // Rasters are moved into the task and dropped once scored.
        tracker.enter(Stage::Classifying);
        let scores: Vec<f64> = blocking(move || Ok(rasters.iter().map(classify).collect())).await?;
        for (idx, score) in scores.iter().enumerate() {
            debug!("Page {}: {:.4} non-white", idx + 1, score);
            tracker.page_classified(idx + 1, total_pages, *score);
        }

        // ── Step 4: Select ───────────────────────────────────────────────
        tracker.enter(Stage::Selecting);
        let selection = Selection::from_scores(&scores, BLANK_THRESHOLD);

        // ── Step 5: Extract or synthesise ────────────────────────────────
        let page = match selection {
            Selection::Extract(index) => {
                info!("Page {} is blank", index + 1);
                tracker.enter(Stage::Extracting);
                let editor = Arc::clone(&self.backends.editor);
                let source = pdf_path.clone();
                blocking(move || edit::extract(editor.as_ref(), &source, index)).await?
            }
            Selection::Synthesize => {
                info!("No blank page among {} pages; synthesising", total_pages);
                tracker.enter(Stage::Synthesizing);
                let editor = Arc::clone(&self.backends.editor);
                let source = pdf_path.clone();
                blocking(move || {
                    let geometry = edit::synthesis_geometry(editor.as_ref(), &source)?;
                    edit::synthesize(editor.as_ref(), geometry)
                })
                .await?
            }
        };

        // ── Step 6: Produce the artifact ─────────────────────────────────
        let SinglePageDocument {
            origin,
            geometry,
            pdf,
        } = page;
        let artifact = match self.config.output_kind {
            OutputKind::Document => Artifact::Document(pdf),
            OutputKind::Image => {
                tracker.enter(Stage::RenderingOutput);
                // Uploaded names never start with '.', so this can't clobber the source.
                let result_path = workspace.join(".result.pdf");
                write_workspace_file(&result_path, &pdf).await?;
                self.render_result(result_path, dpi).await?
            }
        };

        tracker.enter(Stage::Done);
        let stats = ExtractionStats {
            total_pages,
            dpi,
            render_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        info!(
            "Extraction complete: {} ({}), {}ms total",
            origin.label(),
            geometry,
            stats.total_duration_ms
        );

        Ok(BlankPageOutput {
            origin,
            geometry,
            artifact,
            scores,
            stats,
        })
    }

    /// Rasterise the one-page result and keep its only image.
    async fn render_result(&self, path: PathBuf, dpi: u32) -> Result<Artifact, BlankPageError> {
        let rasterizer = Arc::clone(&self.backends.rasterizer);
        let render_path = path.clone();
        let mut images = blocking(move || rasterizer.render(&render_path, dpi)).await?;
        if images.is_empty() {
            return Err(BlankPageError::RenderFailure {
                path,
                detail: "no image produced".into(),
            });
        }
        let image = images.swap_remove(0);

        let (width, height) = (image.width(), image.height());
        let png = blocking(move || {
            encode::encode_png(&image).map_err(|e| BlankPageError::RenderFailure {
                path,
                detail: format!("PNG encoding failed: {}", e),
            })
        })
        .await?;

        Ok(Artifact::Image { png, width, height })
    }
}

/// Find the first blank page of a PDF or slide deck (local path or URL), or
/// synthesise one matching the first page's size.
///
/// # Example
/// ```rust,no_run
/// use blankpage::{extract_blank, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = extract_blank("deck.pptx", &ExtractionConfig::default()).await?;
/// println!("{} → {}", output.origin.label(), output.file_name());
/// # Ok(())
/// # }
/// ```
pub async fn extract_blank(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<BlankPageOutput, BlankPageError> {
    BlankPageExtractor::new(config.clone())
        .extract(input_str.as_ref())
        .await
}

/// [`extract_blank`] for an in-memory upload named `file_name`.
pub async fn extract_blank_from_bytes(
    bytes: &[u8],
    file_name: &str,
    config: &ExtractionConfig,
) -> Result<BlankPageOutput, BlankPageError> {
    BlankPageExtractor::new(config.clone())
        .extract_bytes(bytes, file_name)
        .await
}

/// Run [`extract_blank`] and write the artifact to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed request never leaves
/// a partial file behind.
pub async fn extract_blank_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<BlankPageOutput, BlankPageError> {
    let output = extract_blank(input_str, config).await?;
    write_atomic(output_path.as_ref(), output.artifact.bytes()).await?;
    Ok(output)
}

/// Synchronous wrapper around [`extract_blank`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_blank_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<BlankPageOutput, BlankPageError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BlankPageError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_blank(input_str, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Tracks the current stage and forwards events to the progress callback.
struct StageTracker {
    callback: Option<ProgressCallback>,
    stage: Stage,
}

impl StageTracker {
    fn new(callback: Option<ProgressCallback>) -> Self {
        if let Some(ref cb) = callback {
            cb.on_stage(Stage::Received);
        }
        Self {
            callback,
            stage: Stage::Received,
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Stage: {}", stage);
        self.stage = stage;
        if let Some(ref cb) = self.callback {
            cb.on_stage(stage);
        }
    }

    fn page_classified(&self, page_num: usize, total_pages: usize, score: f64) {
        if let Some(ref cb) = self.callback {
            cb.on_page_classified(page_num, total_pages, score);
        }
    }

    fn finish(
        self,
        result: Result<BlankPageOutput, BlankPageError>,
    ) -> Result<BlankPageOutput, BlankPageError> {
        match &result {
            Ok(output) => {
                if let Some(ref cb) = self.callback {
                    cb.on_complete(&output.origin);
                }
            }
            Err(e) => {
                warn!("Request failed while {}: {}", self.stage, e);
                if let Some(ref cb) = self.callback {
                    cb.on_failed(self.stage, &e.to_string());
                }
            }
        }
        result
    }
}

/// Run blocking work (pdfium, child processes, pixel loops) off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, BlankPageError>
where
    F: FnOnce() -> Result<T, BlankPageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BlankPageError::Internal(format!("Blocking task panicked: {}", e)))?
}

async fn write_workspace_file(path: &Path, bytes: &[u8]) -> Result<(), BlankPageError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| BlankPageError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write `bytes` to `path` via a sibling temp file and rename.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BlankPageError> {
    let write_failed = |e: std::io::Error| BlankPageError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_failed)?;
    Ok(())
}
