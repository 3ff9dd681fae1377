//! Configuration types for Markdown-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One struct carries every knob, so a
//! batch run shares a single config across all of its documents.
//!
//! The two groups of settings handed to external tools ([`RenderSettings`]
//! for `mmdc`, [`TypesettingOptions`] for `pandoc`) are plain serde structs so
//! they can be logged or loaded from a file by the host application.

use crate::error::Mermaid2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Image extensions considered when picking a logo from the assets directory,
/// in priority order.
pub const LOGO_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "svg"];

/// Configuration for a Markdown-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use mermaid2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .author("Platform Team")
///     .output_dir("build")
///     .toc_depth(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Author printed on the title page. Default: empty (no author line).
    pub author: String,

    /// Explicit logo image. Must exist. Takes precedence over the first image
    /// found in [`assets_dir`](Self::assets_dir).
    pub logo: Option<PathBuf>,

    /// Running-header text. Default: derived per document from its file stem
    /// (`system_design.md` → `system design`).
    pub header_text: Option<String>,

    /// Root of the output tree; Markdown lands in `<output_dir>/markdown`,
    /// PDFs in `<output_dir>/pdf`. Default: `output`.
    pub output_dir: PathBuf,

    /// Directory searched for a logo and added to the image search path.
    /// Default: `assets`. A missing directory is not an error.
    pub assets_dir: Option<PathBuf>,

    /// Custom LaTeX style preamble. Default: the embedded
    /// [`crate::templates::DEFAULT_PREAMBLE`].
    pub preamble: Option<PathBuf>,

    /// Keep per-document scratch directories (`.mmd` sources, PNGs, LaTeX
    /// fragments) instead of deleting them. Default: false.
    pub keep_intermediates: bool,

    /// Options passed to the diagram renderer.
    pub render: RenderSettings,

    /// Options passed to the document compiler.
    pub typesetting: TypesettingOptions,

    /// Explicit `mmdc` binary. Default: `MERMAID2PDF_MMDC`, then `PATH`.
    pub mmdc_path: Option<PathBuf>,

    /// Explicit `pandoc` binary. Default: `MERMAID2PDF_PANDOC`, then `PATH`.
    pub pandoc_path: Option<PathBuf>,

    /// Per-diagram render timeout in seconds. Default: none.
    pub render_timeout_secs: Option<u64>,

    /// Per-document compile timeout in seconds. Default: none.
    pub compile_timeout_secs: Option<u64>,

    /// Optional progress callback for per-document and per-stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            author: String::new(),
            logo: None,
            header_text: None,
            output_dir: PathBuf::from("output"),
            assets_dir: Some(PathBuf::from("assets")),
            preamble: None,
            keep_intermediates: false,
            render: RenderSettings::default(),
            typesetting: TypesettingOptions::default(),
            mmdc_path: None,
            pandoc_path: None,
            render_timeout_secs: None,
            compile_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("author", &self.author)
            .field("logo", &self.logo)
            .field("header_text", &self.header_text)
            .field("output_dir", &self.output_dir)
            .field("assets_dir", &self.assets_dir)
            .field("preamble", &self.preamble)
            .field("keep_intermediates", &self.keep_intermediates)
            .field("render", &self.render)
            .field("typesetting", &self.typesetting)
            .field("mmdc_path", &self.mmdc_path)
            .field("pandoc_path", &self.pandoc_path)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("compile_timeout_secs", &self.compile_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The logo to use: the explicit one, else the first image in the
    /// assets directory, else none.
    pub fn resolve_logo(&self) -> Option<PathBuf> {
        self.logo
            .clone()
            .or_else(|| self.assets_dir.as_deref().and_then(find_logo))
    }

    pub fn markdown_dir(&self) -> PathBuf {
        self.output_dir.join("markdown")
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.output_dir.join("pdf")
    }
}

/// First image in `dir`, trying each of [`LOGO_EXTENSIONS`] in turn and
/// taking the alphabetically first file of that type.
pub fn find_logo(dir: &Path) -> Option<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    LOGO_EXTENSIONS.iter().find_map(|ext| {
        files
            .iter()
            .find(|p| {
                p.extension()
                    .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
                    .unwrap_or(false)
            })
            .cloned()
    })
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.author = author.into();
        self
    }

    pub fn logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.logo = Some(path.into());
        self
    }

    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        self.config.header_text = Some(text.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// `None` disables the assets directory entirely.
    pub fn assets_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.assets_dir = dir;
        self
    }

    pub fn preamble(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.preamble = Some(path.into());
        self
    }

    pub fn keep_intermediates(mut self, v: bool) -> Self {
        self.config.keep_intermediates = v;
        self
    }

    pub fn render_settings(mut self, settings: RenderSettings) -> Self {
        self.config.render = settings;
        self
    }

    pub fn typesetting(mut self, options: TypesettingOptions) -> Self {
        self.config.typesetting = options;
        self
    }

    pub fn pdf_engine(mut self, engine: impl Into<String>) -> Self {
        self.config.typesetting.pdf_engine = engine.into();
        self
    }

    pub fn mainfont(mut self, font: impl Into<String>) -> Self {
        self.config.typesetting.mainfont = font.into();
        self
    }

    pub fn monofont(mut self, font: impl Into<String>) -> Self {
        self.config.typesetting.monofont = font.into();
        self
    }

    pub fn fontsize(mut self, size: impl Into<String>) -> Self {
        self.config.typesetting.fontsize = size.into();
        self
    }

    pub fn margin(mut self, margin: impl Into<String>) -> Self {
        self.config.typesetting.margin = margin.into();
        self
    }

    pub fn toc_depth(mut self, depth: u8) -> Self {
        self.config.typesetting.toc_depth = depth;
        self
    }

    pub fn mmdc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.mmdc_path = Some(path.into());
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = Some(path.into());
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = Some(secs);
        self
    }

    pub fn compile_timeout_secs(mut self, secs: u64) -> Self {
        self.config.compile_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Mermaid2PdfError> {
        let c = &self.config;
        if !(1..=10).contains(&c.render.scale) {
            return Err(Mermaid2PdfError::InvalidConfig(format!(
                "Render scale must be 1–10, got {}",
                c.render.scale
            )));
        }
        if c.render.width < 100 {
            return Err(Mermaid2PdfError::InvalidConfig(format!(
                "Render width must be ≥ 100 px, got {}",
                c.render.width
            )));
        }
        if !(1..=6).contains(&c.typesetting.toc_depth) {
            return Err(Mermaid2PdfError::InvalidConfig(format!(
                "TOC depth must be 1–6, got {}",
                c.typesetting.toc_depth
            )));
        }
        if c.typesetting.pdf_engine.trim().is_empty() {
            return Err(Mermaid2PdfError::InvalidConfig(
                "PDF engine must not be empty".into(),
            ));
        }
        if c.render_timeout_secs == Some(0) || c.compile_timeout_secs == Some(0) {
            return Err(Mermaid2PdfError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        if let Some(logo) = &c.logo {
            if !logo.is_file() {
                return Err(Mermaid2PdfError::LogoNotFound { path: logo.clone() });
            }
        }
        if let Some(preamble) = &c.preamble {
            if !preamble.is_file() {
                return Err(Mermaid2PdfError::FileNotFound {
                    path: preamble.clone(),
                });
            }
        }
        Ok(self.config)
    }
}

// ── External tool settings ───────────────────────────────────────────────

/// Options for the diagram renderer (`mmdc -b <background> -s <scale> -w <width>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Background colour, or `transparent`.
    pub background: String,
    /// Device scale factor. Higher values give sharper images in print.
    pub scale: u32,
    /// Page width in pixels.
    pub width: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: "transparent".into(),
            scale: 4,
            width: 2048,
        }
    }
}

/// Options for the document compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypesettingOptions {
    /// Pandoc input format, with extensions.
    pub input_format: String,
    pub pdf_engine: String,
    pub mainfont: String,
    pub monofont: String,
    pub fontsize: String,
    /// Page margin on every side, e.g. `0.75in`.
    pub margin: String,
    pub number_sections: bool,
    pub toc_depth: u8,
    /// Column width used for `--wrap=auto`.
    pub columns: u32,
}

impl Default for TypesettingOptions {
    fn default() -> Self {
        Self {
            input_format: "markdown+lists_without_preceding_blankline".into(),
            pdf_engine: "xelatex".into(),
            mainfont: "Barlow".into(),
            monofont: "Fira Code".into(),
            fontsize: "12pt".into(),
            margin: "0.75in".into(),
            number_sections: true,
            toc_depth: 3,
            columns: 85,
        }
    }
}
