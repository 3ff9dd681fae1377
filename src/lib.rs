//! # mermaid2pdf
//!
//! Convert Markdown documents containing Mermaid diagrams into styled PDF
//! reports.
//!
//! ## Why this crate?
//!
//! Pandoc turns Markdown into good-looking PDFs but knows nothing about
//! diagram-as-code: a ` ```mermaid ` block comes out as a code listing. This
//! crate renders each diagram to a PNG with the Mermaid CLI first, swaps the
//! images into the document, cleans up what a LaTeX backend chokes on (emoji,
//! stray front matter, hand-written title pages), and then hands pandoc a
//! generated title page and running header.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Extract     find ```mermaid blocks, numbered 1..N
//!  ├─ 2. Render      mmdc → <doc>_diagram_<n>.png        (skipped when N = 0)
//!  ├─ 3. Substitute  block n → ![Caption](<doc>_diagram_<n>.png)
//!  ├─ 4. Sanitise    emoji, arrows, inline code, titlepage, front matter
//!  ├─ 5. Title page  title from first "# " heading, LaTeX-escaped
//!  └─ 6. Compile     pandoc + xelatex → <output>/pdf/<doc>.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mermaid2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().author("Jane Doe").build()?;
//!     for output in convert("docs/design.md", &config).await? {
//!         println!("{} → {}", output.title, output.pdf_path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! `mmdc` (`npm install -g @mermaid-js/mermaid-cli`) and `pandoc` with a
//! xelatex installation must be available on `PATH`, or pointed to with
//! `MERMAID2PDF_MMDC` / `MERMAID2PDF_PANDOC`. `mmdc` is only needed when a
//! document actually contains a diagram.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mermaid2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! mermaid2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, RenderSettings, TypesettingOptions};
pub use convert::{
    convert, convert_document, convert_document_with, convert_documents_with, convert_sync,
    prepare, PreparedDocument,
};
pub use error::Mermaid2PdfError;
pub use output::{ConversionOutput, ConversionStats, DiagramRecord};
pub use pipeline::compile::{CompileRequest, DocumentCompiler, Pandoc};
pub use pipeline::input::Document;
pub use pipeline::render::{DiagramRenderer, MermaidCli, RenderedImage};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
