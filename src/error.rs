//! Error types for the mermaid2pdf library.
//!
//! Every error here is **fatal** for the run: the pipeline is fail-fast and
//! never emits a partial document. A failed diagram render or a failed PDF
//! compilation aborts the current document and, in batch mode, the whole
//! batch.
//!
//! Fewer rendered images than diagram blocks during substitution is not an
//! error at all: the surplus blocks are left untouched (see
//! [`crate::pipeline::substitute`]).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mermaid2pdf library.
#[derive(Debug, Error)]
pub enum Mermaid2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input path does not exist.
    #[error("Path not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Input file exists but does not have a `.md` extension.
    #[error("Expected a .md file, got: '{path}'")]
    NotMarkdown { path: PathBuf },

    /// Input folder contains no `.md` files.
    #[error("No .md files found in: '{path}'")]
    EmptyFolder { path: PathBuf },

    /// Input path is neither a regular file nor a directory.
    #[error("Invalid input path: '{path}'")]
    InvalidInput { path: PathBuf },

    /// The configured logo image does not exist.
    #[error("Logo not found: '{path}'")]
    LogoNotFound { path: PathBuf },

    // ── External tool errors ──────────────────────────────────────────────
    /// `mmdc` or `pandoc` could not be located.
    #[error("Required tool unavailable: {0}")]
    ToolUnavailable(#[from] tool_locate::ToolError),

    /// The process could not be started at all.
    #[error("Failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The diagram renderer exited non-zero. `stderr` is the renderer's
    /// diagnostic output, verbatim.
    #[error("Diagram {ordinal} failed to render ({status}):\n{stderr}")]
    RenderFailed {
        ordinal: usize,
        status: String,
        stderr: String,
    },

    /// The renderer exceeded the configured timeout.
    #[error("Diagram {ordinal} did not render within {secs}s")]
    RenderTimeout { ordinal: usize, secs: u64 },

    /// The document compiler exited non-zero. `stderr` is the compiler's
    /// diagnostic output, verbatim.
    #[error("PDF compilation of '{path}' failed ({status}):\n{stderr}")]
    CompileFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The compiler exceeded the configured timeout.
    #[error("PDF compilation of '{path}' did not finish within {secs}s")]
    CompileTimeout { path: PathBuf, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an input document or template.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output or scratch file.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
