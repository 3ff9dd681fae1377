//! CLI binary for mermaid2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mermaid2pdf::{
    convert, ConversionConfig, ConversionOutput, ConversionProgressCallback, ProgressCallback,
    RenderSettings, Stage,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tool_locate::{ExternalTool, MMDC, PANDOC};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar for the batch; its message follows the current document's stage.
struct CliProgressCallback {
    bar: ProgressBar,
    diagrams: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos}/{len} docs  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            diagrams: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_documents} document(s)…"))
        ));
    }

    fn on_document_start(&self, index: usize, total: usize, document: &str) {
        self.bar.set_prefix(format!("{index}/{total}"));
        self.bar.set_message(document.to_string());
    }

    fn on_stage(&self, document: &str, stage: Stage) {
        self.bar.set_message(format!("{document}: {stage}"));
    }

    fn on_diagram_rendered(&self, document: &str, ordinal: usize, total: usize) {
        self.diagrams.fetch_add(1, Ordering::SeqCst);
        self.bar
            .set_message(format!("{document}: diagram {ordinal}/{total}"));
    }

    fn on_document_complete(&self, document: &str, diagrams: usize) {
        self.bar.println(format!(
            "  {} {:<32} {}",
            green("✓"),
            document,
            dim(&format!("{diagrams} diagram(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, document: &str, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {:<32} {}", red("✗"), document, red(first_line)));
        self.bar.abandon();
    }

    fn on_batch_complete(&self, total_documents: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} document(s) converted, {} diagram(s) rendered",
            green("✔"),
            bold(&total_documents.to_string()),
            self.diagrams.load(Ordering::SeqCst),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Single document → output/pdf/report.pdf
  mermaid2pdf report.md

  # Every .md file in a folder, with an author and a logo
  mermaid2pdf docs/ --author "Jane Doe" --logo assets/logo.png

  # Custom running header and output location
  mermaid2pdf design.md --header-text "Project Report" --output-dir build

  # Keep .mmd/.png/.tex intermediates for debugging
  mermaid2pdf design.md --keep-intermediates -v

  # Check that mmdc and pandoc are installed
  mermaid2pdf --check-tools

OUTPUT LAYOUT:
  <output-dir>/markdown/<name>.md   sanitised Markdown passed to pandoc
  <output-dir>/pdf/<name>.pdf       final PDF

ENVIRONMENT VARIABLES:
  MERMAID2PDF_MMDC        Path to the mmdc executable
  MERMAID2PDF_PANDOC      Path to the pandoc executable
  RUST_LOG                Log filter (overrides -v / -q)

SETUP:
  npm install -g @mermaid-js/mermaid-cli
  Install pandoc and a TeX distribution providing xelatex,
  plus the Barlow and Fira Code fonts (or pass --mainfont / --monofont).
"#;

/// Convert Markdown with Mermaid diagrams into styled PDF reports.
#[derive(Parser, Debug)]
#[command(
    name = "mermaid2pdf",
    version,
    about = "Convert Markdown with Mermaid diagrams into styled PDF reports",
    long_about = "Render every ```mermaid block of a Markdown document with the Mermaid CLI, \
substitute the images back into the document, and typeset the result with pandoc and \
xelatex, adding a title page, table of contents and running header.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// A .md file, or a folder whose .md files are all converted.
    #[arg(required_unless_present = "check_tools")]
    input: Option<PathBuf>,

    /// Author shown on the title page.
    #[arg(long, env = "MERMAID2PDF_AUTHOR", default_value = "")]
    author: String,

    /// Logo image for the title page and header (default: first image in --assets-dir).
    #[arg(long, env = "MERMAID2PDF_LOGO")]
    logo: Option<PathBuf>,

    /// Running-header text (default: file name with underscores as spaces).
    #[arg(long, env = "MERMAID2PDF_HEADER_TEXT")]
    header_text: Option<String>,

    /// Root of the output tree.
    #[arg(short, long, env = "MERMAID2PDF_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Directory searched for a logo and for images referenced by the document.
    #[arg(long, env = "MERMAID2PDF_ASSETS_DIR", default_value = "assets")]
    assets_dir: PathBuf,

    /// Custom LaTeX style preamble replacing the built-in one.
    #[arg(long, env = "MERMAID2PDF_PREAMBLE")]
    preamble: Option<PathBuf>,

    /// Path to the mmdc executable.
    #[arg(long, env = "MERMAID2PDF_MMDC")]
    mmdc: Option<PathBuf>,

    /// Path to the pandoc executable.
    #[arg(long, env = "MERMAID2PDF_PANDOC")]
    pandoc: Option<PathBuf>,

    /// LaTeX engine used by pandoc.
    #[arg(long, env = "MERMAID2PDF_PDF_ENGINE", default_value = "xelatex")]
    pdf_engine: String,

    /// Body font.
    #[arg(long, env = "MERMAID2PDF_MAINFONT", default_value = "Barlow")]
    mainfont: String,

    /// Code font.
    #[arg(long, env = "MERMAID2PDF_MONOFONT", default_value = "Fira Code")]
    monofont: String,

    /// Base font size.
    #[arg(long, env = "MERMAID2PDF_FONTSIZE", default_value = "12pt")]
    fontsize: String,

    /// Page margin on every side.
    #[arg(long, env = "MERMAID2PDF_MARGIN", default_value = "0.75in")]
    margin: String,

    /// Table-of-contents depth (1–6).
    #[arg(long, env = "MERMAID2PDF_TOC_DEPTH", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(1..=6))]
    toc_depth: u8,

    /// Diagram render scale (1–10).
    #[arg(long, env = "MERMAID2PDF_SCALE", default_value_t = 4,
          value_parser = clap::value_parser!(u32).range(1..=10))]
    scale: u32,

    /// Diagram render width in pixels.
    #[arg(long, env = "MERMAID2PDF_WIDTH", default_value_t = 2048)]
    width: u32,

    /// Diagram background colour.
    #[arg(long, env = "MERMAID2PDF_BACKGROUND", default_value = "transparent")]
    background: String,

    /// Per-diagram render timeout in seconds.
    #[arg(long, env = "MERMAID2PDF_RENDER_TIMEOUT")]
    render_timeout: Option<u64>,

    /// Per-document compile timeout in seconds.
    #[arg(long, env = "MERMAID2PDF_COMPILE_TIMEOUT")]
    compile_timeout: Option<u64>,

    /// Keep scratch directories (.mmd, .png, .tex) after conversion.
    #[arg(long, env = "MERMAID2PDF_KEEP_INTERMEDIATES")]
    keep_intermediates: bool,

    /// Report whether mmdc and pandoc can be found, then exit.
    #[arg(long)]
    check_tools: bool,

    /// Print the conversion results as JSON on stdout.
    #[arg(long, env = "MERMAID2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MERMAID2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MERMAID2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MERMAID2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v brings them back.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.check_tools;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Tool check mode ──────────────────────────────────────────────────
    if cli.check_tools {
        let ok = check_tool(MMDC, cli.mmdc.as_deref()) & check_tool(PANDOC, cli.pandoc.as_deref());
        if !ok {
            anyhow::bail!("One or more required tools are missing");
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An input file or folder is required")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let outputs = convert(&input, &config)
        .await
        .with_context(|| format!("Conversion of '{}' failed", input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&outputs).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        for output in &outputs {
            print_summary(output);
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let assets = Some(cli.assets_dir.clone()).filter(|d| d.is_dir());

    let mut builder = ConversionConfig::builder()
        .author(cli.author.clone())
        .output_dir(cli.output_dir.clone())
        .assets_dir(assets)
        .keep_intermediates(cli.keep_intermediates)
        .render_settings(RenderSettings {
            background: cli.background.clone(),
            scale: cli.scale,
            width: cli.width,
        })
        .pdf_engine(cli.pdf_engine.clone())
        .mainfont(cli.mainfont.clone())
        .monofont(cli.monofont.clone())
        .fontsize(cli.fontsize.clone())
        .margin(cli.margin.clone())
        .toc_depth(cli.toc_depth);

    if let Some(ref logo) = cli.logo {
        builder = builder.logo(logo.clone());
    }
    if let Some(ref text) = cli.header_text {
        builder = builder.header_text(text.clone());
    }
    if let Some(ref preamble) = cli.preamble {
        builder = builder.preamble(preamble.clone());
    }
    if let Some(ref mmdc) = cli.mmdc {
        builder = builder.mmdc_path(mmdc.clone());
    }
    if let Some(ref pandoc) = cli.pandoc {
        builder = builder.pandoc_path(pandoc.clone());
    }
    if let Some(secs) = cli.render_timeout {
        builder = builder.render_timeout_secs(secs);
    }
    if let Some(secs) = cli.compile_timeout {
        builder = builder.compile_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;
    match config.resolve_logo() {
        Some(logo) => tracing::info!("Using logo: {}", logo.display()),
        None => tracing::info!("No logo configured or found; title page without logo"),
    }
    Ok(config)
}

/// Print whether `tool` is available, with its version. Returns `true` when found.
fn check_tool(tool: ExternalTool, explicit: Option<&std::path::Path>) -> bool {
    match tool.locate_with(explicit) {
        Ok(path) => {
            let version = tool
                .version(&path)
                .unwrap_or_else(|e| format!("version unknown ({e})"));
            println!(
                "{} {:<8} {}  {}",
                green("✔"),
                tool.name,
                path.display(),
                dim(&version)
            );
            true
        }
        Err(e) => {
            println!("{} {:<8} {}", red("✘"), tool.name, e);
            false
        }
    }
}

fn print_summary(output: &ConversionOutput) {
    let s = &output.stats;
    eprintln!(
        "{}  {}  {} diagram(s)  {}ms  →  {}",
        green("✔"),
        bold(&output.title),
        s.diagrams_substituted,
        s.total_duration_ms,
        bold(&output.pdf_path.display().to_string()),
    );
    if s.diagrams_substituted < s.diagrams_found {
        eprintln!(
            "   {} {} diagram block(s) left as code",
            cyan("⚠"),
            s.diagrams_found - s.diagrams_substituted
        );
    }
    if let Some(ref dir) = output.scratch_dir {
        eprintln!("   intermediates: {}", dim(&dir.display().to_string()));
    }
}
