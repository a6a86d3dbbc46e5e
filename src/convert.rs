//! Whole-file conversion between PDF and PowerPoint.
//!
//! This is the plain conversion path: no scanning, no page selection. The
//! input is validated, handed to the office converter inside a request
//! workspace, and the produced file is read back into memory before the
//! workspace is removed.

use crate::config::ExtractionConfig;
use crate::error::BlankPageError;
use crate::extract::{blocking, write_atomic};
use crate::output::ConvertedDocument;
use crate::pipeline::input::{self, RequestWorkspace};
use crate::pipeline::office::TargetFormat;
use crate::pipeline::Backends;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Convert a PDF, PPT or PPTX file (local path or URL) to `target`.
///
/// # Errors
/// `UnsupportedFormat` for a bad input extension (checked first),
/// `ConversionFailure` when the converter fails or produces nothing.
pub async fn convert_document(
    input_str: impl AsRef<str>,
    target: TargetFormat,
    config: &ExtractionConfig,
) -> Result<ConvertedDocument, BlankPageError> {
    let backends = Backends::system(&config.soffice_path);
    convert_document_with(input_str.as_ref(), target, config, &backends).await
}

/// [`convert_document`] over caller-supplied backends.
pub async fn convert_document_with(
    input_str: &str,
    target: TargetFormat,
    config: &ExtractionConfig,
    backends: &Backends,
) -> Result<ConvertedDocument, BlankPageError> {
    info!("Converting {} to {}", input_str, target);

    input::source_kind_of(input_str)?;
    let workspace = RequestWorkspace::new()?;
    let resolved =
        input::resolve_input(input_str, &workspace, config.download_timeout_secs).await?;

    let converter = Arc::clone(&backends.converter);
    let out_dir = workspace.join("converted");
    let source = resolved.path.clone();
    let produced = blocking(move || converter.convert(&source, &out_dir, target)).await?;

    let bytes = tokio::fs::read(&produced)
        .await
        .map_err(|e| BlankPageError::ConversionFailure {
            path: resolved.path.clone(),
            detail: format!("cannot read converted file: {}", e),
        })?;

    let stem = resolved
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string());
    let file_name = format!("{}.{}", input::sanitize_file_name(&stem), target.extension());

    info!("Converted to {} ({} bytes)", file_name, bytes.len());
    Ok(ConvertedDocument { file_name, bytes })
}

/// Run [`convert_document`] and write the result to `output_path`.
pub async fn convert_document_to_file(
    input_str: impl AsRef<str>,
    target: TargetFormat,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ConvertedDocument, BlankPageError> {
    let converted = convert_document(input_str, target, config).await?;
    write_atomic(output_path.as_ref(), &converted.bytes).await?;
    Ok(converted)
}
