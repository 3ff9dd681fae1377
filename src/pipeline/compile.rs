//! PDF compilation: sanitised Markdown plus LaTeX fragments → PDF.
//!
//! The compiler is an opaque collaborator behind the [`DocumentCompiler`]
//! trait. The default implementation, [`Pandoc`], runs:
//!
//! ```text
//! pandoc <md> -f markdown+lists_without_preceding_blankline -o <pdf> \
//!        --pdf-engine=xelatex -V mainfont=Barlow -V "monofont=Fira Code" \
//!        -V fontsize=12pt -V geometry:margin=0.75in --number-sections \
//!        --toc --toc-depth=3 --wrap=auto --columns=85 \
//!        -H paths.tex -H style-preamble.tex -B titlepage.tex \
//!        --resource-path <scratch>:<source dir>:<assets>
//! ```
//!
//! A non-zero exit is fatal and surfaces the compiler's stderr verbatim.

use crate::config::{ConversionConfig, TypesettingOptions};
use crate::error::Mermaid2PdfError;
use crate::pipeline::process::{run_tool, ProcessFailure};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Everything the compiler needs for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Sanitised Markdown to compile.
    pub markdown: PathBuf,
    /// Where the PDF must be written.
    pub output_pdf: PathBuf,
    /// Fragments included in the LaTeX header, in order (`-H`).
    pub header_fragments: Vec<PathBuf>,
    /// Fragments inserted before the body, in order (`-B`).
    pub before_body: Vec<PathBuf>,
    /// Directories searched for images referenced by bare file name.
    pub resource_dirs: Vec<PathBuf>,
}

impl CompileRequest {
    /// The resource directories joined with the platform path separator.
    pub fn resource_path(&self) -> Result<OsString, Mermaid2PdfError> {
        std::env::join_paths(&self.resource_dirs)
            .map_err(|e| Mermaid2PdfError::Internal(format!("invalid resource path: {e}")))
    }
}

/// Something that turns Markdown plus style fragments into a PDF.
///
/// Implementations must write `request.output_pdf` on success and must not
/// retry on failure.
pub trait DocumentCompiler {
    fn compile(
        &self,
        request: &CompileRequest,
    ) -> impl Future<Output = Result<(), Mermaid2PdfError>> + Send;
}

/// [`DocumentCompiler`] backed by `pandoc`.
#[derive(Debug, Clone)]
pub struct Pandoc {
    program: PathBuf,
    options: TypesettingOptions,
    timeout: Option<Duration>,
}

impl Pandoc {
    pub fn new(program: impl Into<PathBuf>, options: TypesettingOptions) -> Self {
        Self {
            program: program.into(),
            options,
            timeout: None,
        }
    }

    /// Locate `pandoc` (explicit path, `MERMAID2PDF_PANDOC`, then `PATH`).
    pub fn from_config(config: &ConversionConfig) -> Result<Self, Mermaid2PdfError> {
        let program = tool_locate::PANDOC.locate_with(config.pandoc_path.as_deref())?;
        info!("Using pandoc: {}", program.display());
        Ok(Self::new(program, config.typesetting.clone())
            .with_timeout(config.compile_timeout_secs.map(Duration::from_secs)))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn args(&self, request: &CompileRequest) -> Result<Vec<OsString>, Mermaid2PdfError> {
        let o = &self.options;
        let mut args: Vec<OsString> = vec![
            request.markdown.clone().into(),
            "-f".into(),
            o.input_format.clone().into(),
            "-o".into(),
            request.output_pdf.clone().into(),
            format!("--pdf-engine={}", o.pdf_engine).into(),
            "-V".into(),
            format!("mainfont={}", o.mainfont).into(),
            "-V".into(),
            format!("monofont={}", o.monofont).into(),
            "-V".into(),
            format!("fontsize={}", o.fontsize).into(),
            "-V".into(),
            format!("geometry:margin={}", o.margin).into(),
        ];
        if o.number_sections {
            args.push("--number-sections".into());
        }
        args.extend([
            "--toc".into(),
            format!("--toc-depth={}", o.toc_depth).into(),
            "--wrap=auto".into(),
            format!("--columns={}", o.columns).into(),
        ]);
        for fragment in &request.header_fragments {
            args.push("-H".into());
            args.push(fragment.clone().into());
        }
        for fragment in &request.before_body {
            args.push("-B".into());
            args.push(fragment.clone().into());
        }
        if !request.resource_dirs.is_empty() {
            args.push("--resource-path".into());
            args.push(request.resource_path()?);
        }
        Ok(args)
    }
}

impl DocumentCompiler for Pandoc {
    async fn compile(&self, request: &CompileRequest) -> Result<(), Mermaid2PdfError> {
        let args = self.args(request)?;
        run_tool(&self.program, &args, self.timeout)
            .await
            .map(|_| ())
            .map_err(|failure| match failure {
                ProcessFailure::Io(source) => Mermaid2PdfError::SpawnFailed {
                    program: self.program.display().to_string(),
                    source,
                },
                ProcessFailure::TimedOut => Mermaid2PdfError::CompileTimeout {
                    path: request.output_pdf.clone(),
                    secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                },
                ProcessFailure::Exit { status, stderr } => Mermaid2PdfError::CompileFailed {
                    path: request.output_pdf.clone(),
                    status,
                    stderr,
                },
            })
    }
}
