//! Input resolution: check the file type, then bring the source into the
//! request workspace.
//!
//! Every request gets its own [`RequestWorkspace`], a `TempDir` that holds
//! downloads, staged uploads, converted PDFs and the result page. Dropping
//! the workspace deletes all of it, on success, on error, and on panic.
//!
//! The extension check runs before anything touches the network or the
//! file system, so an unsupported upload never costs a download or a
//! conversion.

use crate::error::BlankPageError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Accepted source extensions, for error messages.
pub const ACCEPTED_EXTENSIONS: &str = ".pdf, .ppt, .pptx";

/// What kind of document the input is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A PDF; rasterised directly.
    Pdf,
    /// A PowerPoint deck; converted to PDF first.
    SlideDeck,
}

impl SourceKind {
    /// Classify a file name by its extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Result<Self, BlankPageError> {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(SourceKind::Pdf),
            "ppt" | "pptx" => Ok(SourceKind::SlideDeck),
            _ => Err(BlankPageError::UnsupportedFormat {
                what: "file type",
                value: if ext.is_empty() {
                    name.to_string()
                } else {
                    format!(".{ext}")
                },
                accepted: ACCEPTED_EXTENSIONS,
            }),
        }
    }
}

/// Request-scoped scratch directory.
pub struct RequestWorkspace {
    dir: TempDir,
}

impl RequestWorkspace {
    pub fn new() -> Result<Self, BlankPageError> {
        let dir = tempfile::Builder::new()
            .prefix("blankpage-")
            .tempdir()
            .map_err(|e| BlankPageError::Internal(format!("Failed to create workspace: {}", e)))?;
        debug!("Workspace: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace.
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// A source document ready for the pipeline.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Reduce an uploaded file name to a safe single path component.
///
/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes
/// `_`. Directory parts and leading dots are removed. Never empty.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Classify a local path or URL by its extension, without touching the
/// network or the file system.
pub fn source_kind_of(input: &str) -> Result<SourceKind, BlankPageError> {
    if is_url(input) {
        SourceKind::from_file_name(&url_file_name(input)?)
    } else {
        SourceKind::from_file_name(input)
    }
}

/// Resolve a local path or URL to a document the pipeline can open.
///
/// The file type is checked first. Local files are used in place; URLs are
/// downloaded into `workspace`.
pub async fn resolve_input(
    input: &str,
    workspace: &RequestWorkspace,
    timeout_secs: u64,
) -> Result<ResolvedInput, BlankPageError> {
    let kind = source_kind_of(input)?;
    if is_url(input) {
        let name = url_file_name(input)?;
        let path = download_url(input, &workspace.join(&name), timeout_secs).await?;
        Ok(ResolvedInput { path, kind })
    } else {
        let path = resolve_local(input)?;
        Ok(ResolvedInput { path, kind })
    }
}

/// Write uploaded bytes into `workspace` under a sanitised name.
pub async fn stage_bytes(
    bytes: &[u8],
    file_name: &str,
    workspace: &RequestWorkspace,
) -> Result<ResolvedInput, BlankPageError> {
    let name = sanitize_file_name(file_name);
    let kind = SourceKind::from_file_name(&name)?;
    let path = workspace.join(&name);

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| BlankPageError::Internal(format!("Failed to stage upload: {}", e)))?;
    debug!("Staged {} bytes as {}", bytes.len(), path.display());

    Ok(ResolvedInput { path, kind })
}

/// Validate that a local file exists and is readable.
fn resolve_local(path_str: &str) -> Result<PathBuf, BlankPageError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(BlankPageError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(BlankPageError::PermissionDenied { path });
        }
        Err(_) => return Err(BlankPageError::FileNotFound { path }),
    }

    debug!("Resolved local input: {}", path.display());
    Ok(path)
}

/// Last path segment of a URL, sanitised.
fn url_file_name(url: &str) -> Result<String, BlankPageError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| BlankPageError::InvalidInput {
        input: url.to_string(),
    })?;
    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    Ok(sanitize_file_name(last))
}

/// Download a URL to `dest`.
async fn download_url(url: &str, dest: &Path, timeout_secs: u64) -> Result<PathBuf, BlankPageError> {
    info!("Downloading from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| BlankPageError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            BlankPageError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            BlankPageError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(BlankPageError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| BlankPageError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| BlankPageError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), dest.display());
    Ok(dest.to_path_buf())
}
