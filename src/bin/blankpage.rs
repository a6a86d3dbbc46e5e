//! CLI binary for blankpage.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig`, writes the artifact and prints a summary.

use anyhow::{Context, Result};
use blankpage::{
    convert_document, convert_document_to_file, extract_blank, extract_blank_to_file,
    BlankPageError, ErrorKind, ExtractionConfig, ExtractionProgressCallback, OutputKind,
    PageOrigin, ProgressCallback, Stage, TargetFormat,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner naming the current stage, plus one
/// log line per classified page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("blankpage");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_stage(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_page_classified(&self, page_num: usize, total_pages: usize, score: f64) {
        let mark = if score < blankpage::pipeline::select::BLANK_THRESHOLD {
            green("○")
        } else {
            dim("●")
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            mark,
            page_num,
            total_pages,
            dim(&format!("{:>6.2}% ink", score * 100.0)),
        ));
    }

    fn on_failed(&self, stage: Stage, _error: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} failed while {}", red("✘"), stage);
    }

    fn on_complete(&self, origin: &PageOrigin) {
        self.bar.finish_and_clear();
        let what = match origin {
            PageOrigin::Extracted { .. } => format!("blank {}", origin.label()),
            PageOrigin::Synthesized => "no blank page, generated one".to_string(),
        };
        eprintln!("{} {}", green("✔"), bold(&what));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # First blank page of a PDF, written as blank-page-N.pdf (or blank-generated.pdf)
  blankpage extract report.pdf

  # Same for a slide deck, as a PNG at 150 DPI
  blankpage extract deck.pptx --output-type image --dpi 150 -o blank.png

  # From a URL, with a machine-readable report
  blankpage --json extract https://example.com/handout.pdf

  # Plain conversion
  blankpage convert deck.pptx --to pdf
  blankpage convert report.pdf --to pptx -o report.pptx

BLANK PAGES:
  A pixel is near-white when R, G and B are all above 245. A page is blank
  when under 2% of its pixels are not near-white. The first blank page wins;
  when there is none, an empty page the size of page 1 (A4 for an empty
  document) is generated instead.

ENVIRONMENT VARIABLES:
  BLANKPAGE_DPI           Default for --dpi
  BLANKPAGE_OUTPUT_TYPE   Default for --output-type
  BLANKPAGE_SOFFICE       Path to the LibreOffice `soffice` binary
  PDFIUM_LIB_PATH         Directory (or file) of an existing libpdfium
  RUST_LOG                Override log filtering (e.g. blankpage=debug)

SETUP:
  PowerPoint input and `convert` need LibreOffice on PATH (or --soffice).
  Rendering needs libpdfium: set PDFIUM_LIB_PATH, place it next to the
  binary, or install it system-wide.
"#;

/// Find or generate the first blank page of a PDF or PowerPoint deck.
#[derive(Parser, Debug)]
#[command(
    name = "blankpage",
    version,
    about = "Find or generate the first blank page of a PDF or PowerPoint deck",
    long_about = "Scan a PDF, PPT or PPTX (local file or URL) for its first visually blank page \
and return it as a one-page PDF or a PNG. When no page is blank, an empty page matching the \
first page's size is generated. Also converts whole files between PDF and PPTX.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print a JSON report (or JSON error) on stdout.
    #[arg(long, global = true, env = "BLANKPAGE_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "BLANKPAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "BLANKPAGE_QUIET")]
    quiet: bool,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "BLANKPAGE_NO_PROGRESS")]
    no_progress: bool,

    /// Path or name of the LibreOffice binary.
    #[arg(long, global = true, env = "BLANKPAGE_SOFFICE", default_value = "soffice")]
    soffice: String,

    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "BLANKPAGE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the first blank page, or generate one.
    Extract(ExtractArgs),
    /// Convert a whole file between PDF and PPTX.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Local PDF/PPT/PPTX path or HTTP/HTTPS URL.
    input: String,

    /// Output file. Defaults to blank-page-N.<ext> or blank-generated.<ext>.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Result type: pdf or image.
    #[arg(long, env = "BLANKPAGE_OUTPUT_TYPE", default_value = "pdf")]
    output_type: String,

    /// Rendering DPI for classification and image output (36–600).
    #[arg(
        long,
        env = "BLANKPAGE_DPI",
        default_value_t = blankpage::config::DEFAULT_DPI,
        long_help = "Rendering DPI for classification and image output. Default: 300.\n\
          Accepted range: 36–600. Other values are a config error; they are not \
          clamped or replaced by the default."
    )]
    dpi: u32,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Local PDF/PPT/PPTX path or HTTP/HTTPS URL.
    input: String,

    /// Target format: pdf or pptx.
    #[arg(long)]
    to: String,

    /// Output file. Defaults to the input's base name with the new extension.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep library INFO logs out of the way while the spinner is drawing.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&cli, show_progress).await {
        report_error(&cli, &e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    match &cli.command {
        Command::Extract(args) => run_extract(cli, args, show_progress).await,
        Command::Convert(args) => run_convert(cli, args).await,
    }
}

async fn run_extract(cli: &Cli, args: &ExtractArgs, show_progress: bool) -> Result<()> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, Some(args), progress_cb)?;

    let (output, written_to) = match args.output {
        Some(ref path) => {
            let output = extract_blank_to_file(&args.input, path, &config)
                .await
                .context("Extraction failed")?;
            (output, path.clone())
        }
        None => {
            let output = extract_blank(&args.input, &config)
                .await
                .context("Extraction failed")?;
            let path = PathBuf::from(output.file_name());
            write_output(&path, output.artifact.bytes()).await?;
            (output, path)
        }
    };

    if cli.json {
        let mut report =
            serde_json::to_value(output.report()).context("Failed to serialise report")?;
        report["output_path"] = serde_json::Value::String(written_to.display().to_string());
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}  {} pages  {}ms  →  {}",
            green("✔"),
            output.origin.label(),
            output.stats.total_pages,
            output.stats.total_duration_ms,
            bold(&written_to.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!("{} at {} DPI", output.geometry, output.stats.dpi))
        );
    }

    Ok(())
}

async fn run_convert(cli: &Cli, args: &ConvertArgs) -> Result<()> {
    let target: TargetFormat = args.to.parse()?;
    let config = build_config(cli, None, None)?;

    let (converted, written_to) = match args.output {
        Some(ref path) => {
            let converted = convert_document_to_file(&args.input, target, path, &config)
                .await
                .context("Conversion failed")?;
            (converted, path.clone())
        }
        None => {
            let converted = convert_document(&args.input, target, &config)
                .await
                .context("Conversion failed")?;
            let path = PathBuf::from(&converted.file_name);
            write_output(&path, &converted.bytes).await?;
            (converted, path)
        }
    };

    if cli.json {
        let report = serde_json::json!({
            "file_name": converted.file_name,
            "bytes": converted.bytes.len(),
            "output_path": written_to.display().to_string(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} bytes  →  {}",
            green("✔"),
            converted.bytes.len(),
            bold(&written_to.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(
    cli: &Cli,
    extract: Option<&ExtractArgs>,
    progress: Option<ProgressCallback>,
) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .soffice_path(cli.soffice.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(args) = extract {
        let kind: OutputKind = args.output_type.parse()?;
        builder = builder.dpi(args.dpi).output_kind(kind);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| BlankPageError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(())
}

/// Print a failure, as `{ "error", "details" }` JSON under `--json`.
fn report_error(cli: &Cli, err: &anyhow::Error) {
    let lib_err = err.downcast_ref::<BlankPageError>();

    if cli.json {
        let kind = lib_err.map(BlankPageError::kind).unwrap_or(ErrorKind::Internal);
        let details = lib_err
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("{err:#}"));
        let body = serde_json::json!({ "error": kind, "details": details });
        println!("{body}");
    } else {
        eprintln!("{} {:#}", red("error:"), err);
    }
}
