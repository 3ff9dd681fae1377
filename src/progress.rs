//! Progress-callback trait for per-document conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through a batch: which document it is on,
//! which stage that document is in, and how many of its diagrams are
//! rendered.
//!
//! # Why callbacks instead of channels?
//!
//! The library does not need to know how the host application reports
//! progress. The CLI drives an `indicatif` bar from these events; a server
//! could forward them to a log record or a websocket instead.
//!
//! # Example
//!
//! ```rust
//! use mermaid2pdf::{ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct StageLogger;
//!
//! impl ConversionProgressCallback for StageLogger {
//!     fn on_stage(&self, document: &str, stage: Stage) {
//!         eprintln!("{document}: {}", stage.label());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(StageLogger) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A step of the per-document pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Render,
    Substitute,
    Sanitize,
    TitlePage,
    Compile,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Extract,
        Stage::Render,
        Stage::Substitute,
        Stage::Sanitize,
        Stage::TitlePage,
        Stage::Compile,
    ];

    /// Short human-readable label, e.g. for a progress bar message.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Extract => "extracting diagrams",
            Stage::Render => "rendering diagrams",
            Stage::Substitute => "substituting images",
            Stage::Sanitize => "sanitising markdown",
            Stage::TitlePage => "building title page",
            Stage::Compile => "compiling PDF",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the conversion pipeline as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Documents are processed one at a time, but the trait
/// is `Send + Sync` so a callback can be shared with other threads.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first document.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document is loaded and about to be converted.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the batch
    /// * `total`: documents in the batch
    /// * `document`: base name of the document
    fn on_document_start(&self, index: usize, total: usize, document: &str) {
        let _ = (index, total, document);
    }

    /// Called when a document enters a pipeline stage. Stages skipped for a
    /// document (rendering and substitution when it has no diagrams) are
    /// not reported.
    fn on_stage(&self, document: &str, stage: Stage) {
        let _ = (document, stage);
    }

    /// Called after each diagram image is written.
    fn on_diagram_rendered(&self, document: &str, ordinal: usize, total: usize) {
        let _ = (document, ordinal, total);
    }

    /// Called when a document's PDF is written.
    fn on_document_complete(&self, document: &str, diagrams: usize) {
        let _ = (document, diagrams);
    }

    /// Called when a document fails. The batch stops after this call.
    fn on_document_error(&self, document: &str, error: &str) {
        let _ = (document, error);
    }

    /// Called once after the last document succeeded.
    fn on_batch_complete(&self, total_documents: usize) {
        let _ = total_documents;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
