//! Conversion entry points.
//!
//! [`convert`] resolves an input path (file or folder), locates the external
//! tools and runs every document through the pipeline, one after another.
//! The `_with` variants take the renderer and compiler explicitly; they are
//! what the tests use to drive the pipeline without `mmdc` or `pandoc`.
//!
//! ## Per-document steps
//!
//! ```text
//! extract ─┬─ 0 blocks ─────────────────────────────┬─▶ sanitize ─▶ title page ─▶ compile
//!          └─ N blocks ─▶ render (N) ─▶ substitute ─┘
//! ```
//!
//! A document with no diagram blocks skips rendering and substitution
//! entirely; its text goes to the sanitiser verbatim.

use crate::config::ConversionConfig;
use crate::error::Mermaid2PdfError;
use crate::output::{ConversionOutput, ConversionStats, DiagramRecord};
use crate::pipeline::compile::{CompileRequest, DocumentCompiler, Pandoc};
use crate::pipeline::extract::{self, DiagramBlock};
use crate::pipeline::input::{self, Document};
use crate::pipeline::metadata::TitleMetadata;
use crate::pipeline::render::{self, DiagramRenderer, MermaidCli, RenderedImage};
use crate::pipeline::{sanitize, substitute};
use crate::progress::Stage;
use crate::templates::DEFAULT_PREAMBLE;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Scratch file names for the LaTeX fragments.
const PATHS_TEX: &str = "paths.tex";
const PREAMBLE_TEX: &str = "style-preamble.tex";
const TITLEPAGE_TEX: &str = "titlepage.tex";

/// Convert a Markdown file, or every `.md` file in a folder, to PDF.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// One [`ConversionOutput`] per document, in processing order.
///
/// # Errors
/// The first failure aborts the batch: documents after it are not attempted.
/// `mmdc` is only required when at least one document contains a diagram.
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<ConversionOutput>, Mermaid2PdfError> {
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    let files = input::resolve_input(input)?;
    let documents = files
        .iter()
        .map(|path| Document::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    let needs_renderer = documents
        .iter()
        .any(|doc| extract::count_blocks(&doc.text) > 0);
    let renderer = match MermaidCli::from_config(config) {
        Ok(renderer) => renderer,
        Err(e) if !needs_renderer => {
            debug!("No diagrams in input; ignoring missing renderer: {}", e);
            MermaidCli::new(tool_locate::MMDC.name, config.render.clone())
        }
        Err(e) => return Err(e),
    };
    let compiler = Pandoc::from_config(config)?;
    debug!(
        "Using renderer {} and compiler {}",
        renderer.program().display(),
        compiler.program().display()
    );

    convert_documents_with(&documents, config, &renderer, &compiler).await
}

/// Convert a single already-loaded document, locating the tools as
/// [`convert`] does.
pub async fn convert_document(
    document: &Document,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Mermaid2PdfError> {
    let compiler = Pandoc::from_config(config)?;
    if extract::count_blocks(&document.text) == 0 {
        let renderer = MermaidCli::new(tool_locate::MMDC.name, config.render.clone());
        return convert_document_with(document, config, &renderer, &compiler).await;
    }
    let renderer = MermaidCli::from_config(config)?;
    convert_document_with(document, config, &renderer, &compiler).await
}

/// Convert `documents` in order with the given collaborators. Fail-fast.
pub async fn convert_documents_with<R, C>(
    documents: &[Document],
    config: &ConversionConfig,
    renderer: &R,
    compiler: &C,
) -> Result<Vec<ConversionOutput>, Mermaid2PdfError>
where
    R: DiagramRenderer,
    C: DocumentCompiler,
{
    let total = documents.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut outputs = Vec::with_capacity(total);
    for (idx, doc) in documents.iter().enumerate() {
        info!("[{}/{}] {}", idx + 1, total, doc.file_name);
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(idx + 1, total, &doc.name);
        }

        match convert_document_with(doc, config, renderer, compiler).await {
            Ok(output) => outputs.push(output),
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_error(&doc.name, &e.to_string());
                }
                return Err(e);
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total);
    }
    info!("Converted {} document(s)", outputs.len());
    Ok(outputs)
}

/// Run one document through the whole pipeline.
pub async fn convert_document_with<R, C>(
    document: &Document,
    config: &ConversionConfig,
    renderer: &R,
    compiler: &C,
) -> Result<ConversionOutput, Mermaid2PdfError>
where
    R: DiagramRenderer,
    C: DocumentCompiler,
{
    let total_start = Instant::now();
    let name = document.name.as_str();
    let stage = |s: Stage| {
        debug!("{}: {}", name, s);
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage(name, s);
        }
    };

    let scratch = tempfile::Builder::new()
        .prefix(&format!("mermaid2pdf-{name}-"))
        .tempdir()
        .map_err(|e| Mermaid2PdfError::Internal(format!("scratch directory: {e}")))?;

    // ── Step 1: Extract ──────────────────────────────────────────────────
    stage(Stage::Extract);
    let blocks: Vec<DiagramBlock> = extract::extract_blocks(&document.text).collect();
    info!("{}: {} diagram block(s)", name, blocks.len());

    // ── Step 2: Render ───────────────────────────────────────────────────
    let render_start = Instant::now();
    let images: Vec<RenderedImage> = if blocks.is_empty() {
        Vec::new()
    } else {
        stage(Stage::Render);
        render::render_all(
            &blocks,
            name,
            scratch.path(),
            renderer,
            config.progress_callback.as_ref(),
        )
        .await?
    };
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Steps 3-5: Substitute, sanitise, title metadata ──────────────────
    if !blocks.is_empty() {
        stage(Stage::Substitute);
    }
    stage(Stage::Sanitize);
    let prepared = prepare(document, &images, config);
    if prepared.diagrams_substituted < blocks.len() {
        warn!(
            "{}: {} diagram block(s) left as code",
            name,
            blocks.len() - prepared.diagrams_substituted
        );
    }
    stage(Stage::TitlePage);

    // ── Step 6: Write outputs and fragments ──────────────────────────────
    let markdown_dir = config.markdown_dir();
    let pdf_dir = config.pdf_dir();
    create_dir(&markdown_dir).await?;
    create_dir(&pdf_dir).await?;

    let markdown_path = markdown_dir.join(&document.file_name);
    write_file(&markdown_path, &prepared.markdown).await?;

    let paths_tex = scratch.path().join(PATHS_TEX);
    write_file(&paths_tex, &prepared.metadata.preamble_definitions()).await?;

    let preamble_tex = match &config.preamble {
        Some(custom) => custom.clone(),
        None => {
            let path = scratch.path().join(PREAMBLE_TEX);
            write_file(&path, DEFAULT_PREAMBLE).await?;
            path
        }
    };

    let titlepage_tex = scratch.path().join(TITLEPAGE_TEX);
    write_file(&titlepage_tex, &prepared.metadata.title_page()).await?;

    // ── Step 7: Compile ──────────────────────────────────────────────────
    stage(Stage::Compile);
    let pdf_path = pdf_dir.join(format!("{name}.pdf"));
    let request = CompileRequest {
        markdown: markdown_path.clone(),
        output_pdf: pdf_path.clone(),
        header_fragments: vec![paths_tex, preamble_tex],
        before_body: vec![titlepage_tex],
        resource_dirs: resource_dirs(scratch.path(), document, config),
    };
    let compile_start = Instant::now();
    compiler.compile(&request).await?;
    let compile_duration_ms = compile_start.elapsed().as_millis() as u64;

    let scratch_dir = if config.keep_intermediates {
        let kept = scratch.keep();
        info!("{}: intermediates kept in {}", name, kept.display());
        Some(kept)
    } else {
        None
    };

    let stats = ConversionStats {
        diagrams_found: blocks.len(),
        diagrams_substituted: prepared.diagrams_substituted,
        render_duration_ms,
        compile_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "{}: wrote {} in {}ms",
        name,
        pdf_path.display(),
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_complete(name, images.len());
    }

    Ok(ConversionOutput {
        document: document.name.clone(),
        title: prepared.metadata.title,
        markdown_path,
        pdf_path,
        scratch_dir,
        diagrams: images.iter().map(DiagramRecord::from).collect(),
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<ConversionOutput>, Mermaid2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Mermaid2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

/// A document ready for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    /// Sanitised Markdown with image references.
    pub markdown: String,
    pub metadata: TitleMetadata,
    /// Diagram blocks replaced by an image reference.
    pub diagrams_substituted: usize,
}

/// The pure part of the pipeline: substitute (or copy), sanitise and resolve
/// the title metadata. No I/O beyond logo discovery in the assets directory.
pub fn prepare(
    document: &Document,
    images: &[RenderedImage],
    config: &ConversionConfig,
) -> PreparedDocument {
    let (substituted, diagrams_substituted) = if extract::count_blocks(&document.text) == 0 {
        (document.clone(), 0)
    } else {
        let (text, replaced) = substitute::substitute_counted(&document.text, images);
        (document.with_text(text), replaced)
    };

    let sanitized = substituted.with_text(sanitize::sanitize(&substituted.text));

    let header_text = config
        .header_text
        .clone()
        .unwrap_or_else(|| document.default_header_text());
    let metadata = TitleMetadata::resolve(
        &sanitized.text,
        &document.name,
        config.author.clone(),
        config.resolve_logo().map(|p| absolute(&p)),
        header_text,
    );

    PreparedDocument {
        markdown: sanitized.text,
        metadata,
        diagrams_substituted,
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Where the compiler looks for bare image file names: rendered diagrams
/// first, then images next to the source, then the assets directory.
fn resource_dirs(scratch: &Path, document: &Document, config: &ConversionConfig) -> Vec<PathBuf> {
    let mut dirs = vec![scratch.to_path_buf()];
    if let Some(dir) = document.source_dir.as_deref() {
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        dirs.push(absolute(dir));
    }
    if let Some(assets) = config.assets_dir.as_deref().filter(|d| d.is_dir()) {
        dirs.push(absolute(assets));
    }
    dirs.dedup();
    dirs
}

/// The compiler runs with a different view of relative paths than the user;
/// absolutise what we can and keep the original otherwise.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

async fn create_dir(path: &Path) -> Result<(), Mermaid2PdfError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Mermaid2PdfError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

async fn write_file(path: &Path, contents: &str) -> Result<(), Mermaid2PdfError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| Mermaid2PdfError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConversionConfig {
        ConversionConfig::builder()
            .author("Ada")
            .assets_dir(None)
            .build()
            .unwrap()
    }

    #[test]
    fn prepare_without_diagrams_copies_text() {
        let doc = Document::from_text("notes", "# Notes\n\nUse `ls`.\n```bash\necho `x`\n```\n");
        let prepared = prepare(&doc, &[], &config());
        assert_eq!(
            prepared.markdown,
            "# Notes\n\nUse ls.\n```bash\necho `x`\n```\n"
        );
        assert_eq!(prepared.diagrams_substituted, 0);
        assert_eq!(prepared.metadata.title, "Notes");
        assert_eq!(prepared.metadata.header_text, "notes");
    }

    #[test]
    fn prepare_report_scenario() {
        let doc = Document::from_text(
            "report",
            "# Report\n```mermaid\nflowchart TD\nA-->B\n```\nEnd",
        );
        let images = [RenderedImage::new(1, "/scratch/diagram_1.png")];
        let prepared = prepare(&doc, &images, &config());
        assert_eq!(prepared.markdown, "# Report\n![Diagram 1](diagram_1.png)\nEnd");
        assert_eq!(prepared.metadata.title, "Report");
        assert_eq!(prepared.diagrams_substituted, 1);
    }

    #[test]
    fn prepare_counts_unsubstituted_blocks() {
        let doc = Document::from_text("d", "```mermaid\na\n```\n```mermaid\nb\n```\n");
        let images = [RenderedImage::new(1, "d_diagram_1.png")];
        let prepared = prepare(&doc, &images, &config());
        assert_eq!(prepared.diagrams_substituted, 1);
        assert!(prepared.markdown.contains("```mermaid\nb\n```"));
    }

    #[test]
    fn prepare_counts_replacements_not_remaining_fences() {
        let doc = Document::from_text("d", "```mermaid\na\n```\n");
        let images = [RenderedImage::new(1, "odd```mermaid```.png")];
        let prepared = prepare(&doc, &images, &config());
        assert_eq!(prepared.diagrams_substituted, 1);
        assert!(prepared.markdown.starts_with("![Odd"));
    }

    #[test]
    fn prepare_title_falls_back_to_name() {
        let doc = Document::from_text("design_notes", "no heading here");
        let prepared = prepare(&doc, &[], &config());
        assert_eq!(prepared.metadata.title, "design_notes");
        assert_eq!(prepared.metadata.title_escaped, r"design\_notes");
    }

    #[test]
    fn header_text_override() {
        let config = ConversionConfig::builder()
            .header_text("Internal")
            .assets_dir(None)
            .build()
            .unwrap();
        let prepared = prepare(&Document::from_text("x", "# X"), &[], &config);
        assert_eq!(prepared.metadata.header_text, "Internal");
    }

    #[test]
    fn resource_dirs_order_and_skip_missing_assets() {
        let scratch = tempfile::tempdir().unwrap();
        let src = tempfile::tempdir().unwrap();
        let mut doc = Document::from_text("a", "");
        doc.source_dir = Some(src.path().to_path_buf());

        let config = ConversionConfig::builder()
            .assets_dir(Some(PathBuf::from("/no/such/assets")))
            .build()
            .unwrap();
        let dirs = resource_dirs(scratch.path(), &doc, &config);
        assert_eq!(dirs, vec![scratch.path().to_path_buf(), src.path().to_path_buf()]);
    }
}
