//! Binding to the pdfium shared library.
//!
//! A fresh [`Pdfium`] is bound for every blocking task rather than shared,
//! so each request's rendering and editing runs against its own instance.

use crate::error::BlankPageError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming a directory (or file) holding libpdfium.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind libpdfium from `PDFIUM_LIB_PATH`, the working directory, or the
/// system library search path, in that order.
pub fn bind_pdfium() -> Result<Pdfium, BlankPageError> {
    let mut attempts: Vec<String> = Vec::new();

    if let Ok(custom) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !custom.is_empty() {
            let path = PathBuf::from(&custom);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            match Pdfium::bind_to_library(&lib) {
                Ok(bindings) => {
                    debug!("Bound pdfium from {}", lib.display());
                    return Ok(Pdfium::new(bindings));
                }
                Err(e) => attempts.push(format!("{}: {e}", lib.display())),
            }
        }
    }

    match Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path("./")) {
        Ok(bindings) => return Ok(Pdfium::new(bindings)),
        Err(e) => attempts.push(format!("./: {e}")),
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| {
            attempts.push(format!("system: {e}"));
            BlankPageError::PdfiumBindingFailed(attempts.join("; "))
        })
}
