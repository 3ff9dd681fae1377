//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step. The text
//! stages are pure `&str → String` functions; only [`render`] and
//! [`compile`] touch external processes, each behind a trait so the
//! orchestrator can be driven without `mmdc` or `pandoc` installed.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ render ──▶ substitute ──▶ sanitize ──▶ metadata ──▶ compile
//! (.md)     (blocks)    (mmdc)     (![..](..))    (LaTeX-safe)  (title page)  (pandoc)
//! ```
//!
//! 1. [`input`]: resolve a file or folder into documents
//! 2. [`extract`]: find ` ```mermaid ` blocks, numbered from 1
//! 3. [`render`]: write each block to `.mmd` and rasterise it
//! 4. [`substitute`]: swap block N for the image with ordinal N
//! 5. [`sanitize`]: strip what the LaTeX backend cannot handle
//! 6. [`metadata`]: title, escaping, title-page and definitions fragments
//! 7. [`compile`]: hand everything to the document compiler
//!
//! [`process`] holds the subprocess plumbing shared by 3 and 7, and `fence`
//! the fenced-block tracking shared by 2, 4, 5 and 6.

pub mod compile;
pub mod extract;
pub(crate) mod fence;
pub mod input;
pub mod metadata;
pub(crate) mod process;
pub mod render;
pub mod sanitize;
pub mod substitute;
