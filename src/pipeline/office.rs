//! Office format conversion through LibreOffice's `soffice`.
//!
//! `soffice` is run as a child process with its arguments passed as a
//! vector, never through a shell. It writes `<stem>.<fmt>` into the output
//! directory; some builds alter the stem's case or suffix, so when the exact
//! name is missing the directory is scanned for a close match.

use crate::error::BlankPageError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tracing::{debug, info};

/// Formats the converter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Pdf,
    Pptx,
}

impl TargetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Pdf => "pdf",
            TargetFormat::Pptx => "pptx",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = BlankPageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(TargetFormat::Pdf),
            "pptx" => Ok(TargetFormat::Pptx),
            _ => Err(BlankPageError::UnsupportedFormat {
                what: "conversion target",
                value: s.to_string(),
                accepted: "pdf, pptx",
            }),
        }
    }
}

/// Converts a document between office formats.
pub trait DocumentConverter: Send + Sync {
    /// Convert `input` into `out_dir` and return the produced file's path.
    fn convert(
        &self,
        input: &Path,
        out_dir: &Path,
        target: TargetFormat,
    ) -> Result<PathBuf, BlankPageError>;
}

/// [`DocumentConverter`] that shells out to headless LibreOffice.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    program: String,
}

impl SofficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self::new("soffice")
    }
}

impl DocumentConverter for SofficeConverter {
    fn convert(
        &self,
        input: &Path,
        out_dir: &Path,
        target: TargetFormat,
    ) -> Result<PathBuf, BlankPageError> {
        let failure = |detail: String| BlankPageError::ConversionFailure {
            path: input.to_path_buf(),
            detail,
        };

        std::fs::create_dir_all(out_dir)
            .map_err(|e| failure(format!("cannot create {}: {}", out_dir.display(), e)))?;

        info!(
            "Converting {} → {} with {}",
            input.display(),
            target,
            self.program
        );

        let profile = profile_url(out_dir).map_err(failure)?;
        debug!("LibreOffice profile: {}", profile);

        let output = Command::new(&self.program)
            .arg(format!("-env:UserInstallation={profile}"))
            .arg("--headless")
            .arg("--invisible")
            .arg("--convert-to")
            .arg(target.extension())
            .arg(input)
            .arg("--outdir")
            .arg(out_dir)
            .output()
            .map_err(|e| failure(format!("cannot run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            return Err(failure(format!(
                "{} exited with {}\nstdout: {}\nstderr: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stdout).trim(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let produced = find_output(input, out_dir, target)
            .ok_or_else(|| failure("converter finished but no output file was found".into()))?;
        debug!("Converter produced {}", produced.display());
        Ok(produced)
    }
}

/// Directory name of the per-call LibreOffice user profile inside `out_dir`.
pub const PROFILE_DIR: &str = ".lo-profile";

/// `file://` URL of a private LibreOffice profile under `out_dir`.
///
/// A running `soffice` holds a lock on its profile; a second instance on the
/// same profile hands its job to the first or exits without output. Each
/// call gets its own profile, removed with the request workspace.
pub fn profile_url(out_dir: &Path) -> Result<String, String> {
    let dir = std::path::absolute(out_dir.join(PROFILE_DIR))
        .map_err(|e| format!("cannot resolve profile directory: {}", e))?;
    reqwest::Url::from_directory_path(&dir)
        .map(|url| url.to_string())
        .map_err(|_| format!("cannot express {} as a file URL", dir.display()))
}

/// Locate the converter's output for `input` in `out_dir`.
///
/// Prefers `<stem>.<ext>`; otherwise the first entry (by name) starting with
/// `<stem>.` and ending in `.<ext>`, case-insensitively on the extension.
pub fn find_output(input: &Path, out_dir: &Path, target: TargetFormat) -> Option<PathBuf> {
    let stem = input.file_stem()?.to_string_lossy().into_owned();
    let ext = target.extension();

    let exact = out_dir.join(format!("{stem}.{ext}"));
    if exact.is_file() && exact != input {
        return Some(exact);
    }

    let prefix = format!("{stem}.");
    let suffix = format!(".{ext}");
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(out_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path != input)
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .is_some_and(|name| {
                    name.starts_with(&prefix) && name.to_ascii_lowercase().ends_with(&suffix)
                })
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn target_parsing() {
        assert_eq!("PDF".parse::<TargetFormat>().unwrap(), TargetFormat::Pdf);
        assert_eq!("pptx".parse::<TargetFormat>().unwrap(), TargetFormat::Pptx);
        assert!(matches!(
            "docx".parse::<TargetFormat>(),
            Err(BlankPageError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn finds_exact_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("deck.pptx");
        std::fs::write(&input, b"x").unwrap();
        std::fs::write(dir.path().join("deck.pdf"), b"%PDF").unwrap();

        let found = find_output(&input, dir.path(), TargetFormat::Pdf).unwrap();
        assert_eq!(found, dir.path().join("deck.pdf"));
    }

    #[test]
    fn finds_case_variant_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("deck.pptx");
        std::fs::write(dir.path().join("deck.export.PDF"), b"%PDF").unwrap();

        let found = find_output(&input, dir.path(), TargetFormat::Pdf).unwrap();
        assert_eq!(found, dir.path().join("deck.export.PDF"));
    }

    #[test]
    fn ignores_input_and_unrelated_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("report.pdf");
        std::fs::write(&input, b"%PDF").unwrap();
        std::fs::write(dir.path().join("other.pptx"), b"x").unwrap();

        // Converting report.pdf → pptx: only other.pptx exists, which doesn't match.
        assert!(find_output(&input, dir.path(), TargetFormat::Pptx).is_none());
    }

    #[test]
    fn missing_binary_is_conversion_failure() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("deck.pptx");
        std::fs::write(&input, b"x").unwrap();

        let converter = SofficeConverter::new("/nonexistent/soffice-for-tests");
        let err = converter
            .convert(&input, dir.path(), TargetFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, BlankPageError::ConversionFailure { .. }));
        assert!(err.to_string().contains("cannot run"));
    }

    #[test]
    fn profile_url_is_encoded_and_under_out_dir() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("my out");
        let url = profile_url(&out_dir).unwrap();

        assert!(url.starts_with("file://"), "{url}");
        assert!(url.contains("my%20out"), "{url}");
        let back = reqwest::Url::parse(&url).unwrap().to_file_path().unwrap();
        assert_eq!(back, out_dir.join(PROFILE_DIR));
    }

    /// Stub `soffice` that records its arguments and writes `<stem>.pdf`.
    #[cfg(unix)]
    fn stub_soffice(dir: &Path) -> (PathBuf, PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let argv_file = dir.join("argv.txt");
        let script = dir.join("soffice-stub");
        let body = format!(
            "#!/bin/sh\n\
             printf '%s\\n' \"$@\" > '{}'\n\
             for a; do last=\"$a\"; done\n\
             : > \"$last/deck.pdf\"\n",
            argv_file.display()
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        (script, argv_file)
    }

    #[cfg(unix)]
    #[test]
    fn each_call_gets_its_own_profile() {
        let tools = TempDir::new().unwrap();
        let (script, argv_file) = stub_soffice(tools.path());
        let converter = SofficeConverter::new(script.to_string_lossy());

        let mut profiles = Vec::new();
        for _ in 0..2 {
            let work = TempDir::new().unwrap();
            let input = work.path().join("deck.pptx");
            std::fs::write(&input, b"x").unwrap();
            let out_dir = work.path().join("out");

            let produced = converter
                .convert(&input, &out_dir, TargetFormat::Pdf)
                .unwrap();
            assert_eq!(produced, out_dir.join("deck.pdf"));

            let argv = std::fs::read_to_string(&argv_file).unwrap();
            let first = argv.lines().next().unwrap().to_string();
            assert_eq!(
                first,
                format!("-env:UserInstallation={}", profile_url(&out_dir).unwrap())
            );
            assert!(argv.lines().any(|l| l == "--headless"));
            profiles.push(first);
        }
        assert_ne!(profiles[0], profiles[1]);
    }
}
