//! Result types returned by the conversion entry points.

use crate::pipeline::render::RenderedImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of converting one Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Base name of the source document.
    pub document: String,
    /// Resolved title (first top-level heading, or the base name).
    pub title: String,
    /// Sanitised Markdown handed to the compiler.
    pub markdown_path: PathBuf,
    /// The compiled PDF.
    pub pdf_path: PathBuf,
    /// Scratch directory, when intermediates were kept.
    pub scratch_dir: Option<PathBuf>,
    pub diagrams: Vec<DiagramRecord>,
    pub stats: ConversionStats,
}

/// One rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramRecord {
    pub ordinal: usize,
    pub file_name: String,
    /// Image location; only meaningful while the scratch directory exists.
    pub path: PathBuf,
}

impl From<&RenderedImage> for DiagramRecord {
    fn from(img: &RenderedImage) -> Self {
        Self {
            ordinal: img.ordinal,
            file_name: img.file_name.clone(),
            path: img.path.clone(),
        }
    }
}

/// Counts and timings for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Diagram blocks found in the source.
    pub diagrams_found: usize,
    /// Blocks replaced by an image reference.
    pub diagrams_substituted: usize,
    pub render_duration_ms: u64,
    pub compile_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_from_rendered_image() {
        let img = RenderedImage::new(2, "/tmp/s/doc_diagram_2.png");
        let rec = DiagramRecord::from(&img);
        assert_eq!(rec.ordinal, 2);
        assert_eq!(rec.file_name, "doc_diagram_2.png");
    }

    #[test]
    fn output_serialises_to_json() {
        let out = ConversionOutput {
            document: "report".into(),
            title: "Report".into(),
            markdown_path: PathBuf::from("output/markdown/report.md"),
            pdf_path: PathBuf::from("output/pdf/report.pdf"),
            scratch_dir: None,
            diagrams: vec![],
            stats: ConversionStats {
                diagrams_found: 1,
                diagrams_substituted: 1,
                ..Default::default()
            },
        };
        let json: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert_eq!(json["title"], "Report");
        assert_eq!(json["stats"]["diagrams_found"], 1);
        assert!(json["scratch_dir"].is_null());
    }
}
