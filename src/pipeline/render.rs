//! Diagram rendering: diagram source → PNG via an external renderer.
//!
//! The renderer is an opaque collaborator behind the [`DiagramRenderer`]
//! trait. The default implementation, [`MermaidCli`], shells out to `mmdc`:
//!
//! ```text
//! mmdc -i <scratch>/<doc>_diagram_<n>.mmd -o <scratch>/<doc>_diagram_<n>.png \
//!      -b transparent -s 4 -w 2048
//! ```
//!
//! Rendering is sequential and fail-fast: the first diagram that fails aborts
//! the document, carrying the renderer's stderr verbatim. No partial document
//! is ever produced from a partially rendered set.

use crate::config::{ConversionConfig, RenderSettings};
use crate::error::Mermaid2PdfError;
use crate::pipeline::extract::DiagramBlock;
use crate::pipeline::process::{run_tool, ProcessFailure};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// A successfully rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedImage {
    /// Ordinal of the [`DiagramBlock`] this image was rendered from.
    pub ordinal: usize,
    /// Where the image lives on disk.
    pub path: PathBuf,
    /// Bare file name used in the Markdown image reference.
    pub file_name: String,
    /// File name without extension; source of the fallback caption.
    pub stem: String,
}

impl RenderedImage {
    pub fn new(ordinal: usize, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            ordinal,
            path,
            file_name,
            stem,
        }
    }
}

/// Something that turns a diagram source file into an image file.
///
/// Implementations must write `output` on success. Any failure is fatal for
/// the run; implementations should not retry.
pub trait DiagramRenderer {
    fn render(
        &self,
        ordinal: usize,
        source: &Path,
        output: &Path,
    ) -> impl Future<Output = Result<(), Mermaid2PdfError>> + Send;
}

/// [`DiagramRenderer`] backed by the Mermaid CLI (`mmdc`).
#[derive(Debug, Clone)]
pub struct MermaidCli {
    program: PathBuf,
    settings: RenderSettings,
    timeout: Option<Duration>,
}

impl MermaidCli {
    pub fn new(program: impl Into<PathBuf>, settings: RenderSettings) -> Self {
        Self {
            program: program.into(),
            settings,
            timeout: None,
        }
    }

    /// Locate `mmdc` (explicit path, `MERMAID2PDF_MMDC`, then `PATH`) and
    /// apply the configured render settings and timeout.
    pub fn from_config(config: &ConversionConfig) -> Result<Self, Mermaid2PdfError> {
        let program = tool_locate::MMDC.locate_with(config.mmdc_path.as_deref())?;
        info!("Using mmdc: {}", program.display());
        Ok(Self::new(program, config.render.clone())
            .with_timeout(config.render_timeout_secs.map(Duration::from_secs)))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn args(&self, source: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            source.into(),
            "-o".into(),
            output.into(),
            "-b".into(),
            self.settings.background.clone().into(),
            "-s".into(),
            self.settings.scale.to_string().into(),
            "-w".into(),
            self.settings.width.to_string().into(),
        ]
    }
}

impl DiagramRenderer for MermaidCli {
    async fn render(
        &self,
        ordinal: usize,
        source: &Path,
        output: &Path,
    ) -> Result<(), Mermaid2PdfError> {
        let args = self.args(source, output);
        run_tool(&self.program, &args, self.timeout)
            .await
            .map(|_| ())
            .map_err(|failure| match failure {
                ProcessFailure::Io(source) => Mermaid2PdfError::SpawnFailed {
                    program: self.program.display().to_string(),
                    source,
                },
                ProcessFailure::TimedOut => Mermaid2PdfError::RenderTimeout {
                    ordinal,
                    secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                },
                ProcessFailure::Exit { status, stderr } => Mermaid2PdfError::RenderFailed {
                    ordinal,
                    status,
                    stderr,
                },
            })
    }
}

/// Scratch file name for diagram `ordinal` of document `base_name`.
pub fn diagram_file_stem(base_name: &str, ordinal: usize) -> String {
    format!("{base_name}_diagram_{ordinal}")
}

/// Render every block in order, writing sources and images into `scratch`.
///
/// Returns one [`RenderedImage`] per block, in block order.
pub async fn render_all<R: DiagramRenderer>(
    blocks: &[DiagramBlock],
    base_name: &str,
    scratch: &Path,
    renderer: &R,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<RenderedImage>, Mermaid2PdfError> {
    let total = blocks.len();
    let mut images = Vec::with_capacity(total);

    for block in blocks {
        let stem = diagram_file_stem(base_name, block.ordinal);
        let source_path = scratch.join(format!("{stem}.mmd"));
        let image_path = scratch.join(format!("{stem}.png"));

        tokio::fs::write(&source_path, format!("{}\n", block.source))
            .await
            .map_err(|e| Mermaid2PdfError::OutputWriteFailed {
                path: source_path.clone(),
                source: e,
            })?;

        renderer
            .render(block.ordinal, &source_path, &image_path)
            .await?;

        if !image_path.exists() {
            return Err(Mermaid2PdfError::RenderFailed {
                ordinal: block.ordinal,
                status: "exit status: 0".into(),
                stderr: format!(
                    "renderer reported success but wrote no image to {}",
                    image_path.display()
                ),
            });
        }

        debug!("Rendered diagram {}/{} → {}", block.ordinal, total, image_path.display());
        if let Some(cb) = progress {
            cb.on_diagram_rendered(base_name, block.ordinal, total);
        }
        images.push(RenderedImage::new(block.ordinal, image_path));
    }

    info!("Rendered {} diagram(s) for {}", images.len(), base_name);
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn rendered_image_names() {
        let img = RenderedImage::new(3, "/tmp/scratch/report_diagram_3.png");
        assert_eq!(img.ordinal, 3);
        assert_eq!(img.file_name, "report_diagram_3.png");
        assert_eq!(img.stem, "report_diagram_3");
    }

    #[test]
    fn mmdc_arguments() {
        let cli = MermaidCli::new("mmdc", RenderSettings::default());
        let args: Vec<String> = cli
            .args(Path::new("in.mmd"), Path::new("out.png"))
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-i", "in.mmd", "-o", "out.png", "-b", "transparent", "-s", "4", "-w", "2048"]
        );
    }

    /// Writes a placeholder image; fails on a chosen ordinal.
    struct FakeRenderer {
        fail_on: Option<usize>,
        calls: Mutex<Vec<usize>>,
    }

    impl DiagramRenderer for FakeRenderer {
        async fn render(
            &self,
            ordinal: usize,
            source: &Path,
            output: &Path,
        ) -> Result<(), Mermaid2PdfError> {
            self.calls.lock().unwrap().push(ordinal);
            if self.fail_on == Some(ordinal) {
                return Err(Mermaid2PdfError::RenderFailed {
                    ordinal,
                    status: "exit status: 1".into(),
                    stderr: "bad diagram".into(),
                });
            }
            assert!(source.exists());
            std::fs::write(output, b"png").unwrap();
            Ok(())
        }
    }

    fn blocks(n: usize) -> Vec<DiagramBlock> {
        (1..=n)
            .map(|i| DiagramBlock {
                ordinal: i,
                source: format!("graph TD\nA{i}-->B{i}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn render_all_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let r = FakeRenderer {
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        };
        let images = render_all(&blocks(3), "doc", dir.path(), &r, None)
            .await
            .unwrap();

        assert_eq!(*r.calls.lock().unwrap(), vec![1, 2, 3]);
        let names: Vec<_> = images.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["doc_diagram_1.png", "doc_diagram_2.png", "doc_diagram_3.png"]);

        let src = std::fs::read_to_string(dir.path().join("doc_diagram_2.mmd")).unwrap();
        assert_eq!(src, "graph TD\nA2-->B2\n");
    }

    #[tokio::test]
    async fn render_all_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let r = FakeRenderer {
            fail_on: Some(2),
            calls: Mutex::new(Vec::new()),
        };
        let err = render_all(&blocks(3), "doc", dir.path(), &r, None)
            .await
            .unwrap_err();

        assert!(matches!(err, Mermaid2PdfError::RenderFailed { ordinal: 2, .. }));
        assert_eq!(*r.calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn success_without_image_is_an_error() {
        struct SilentRenderer;
        impl DiagramRenderer for SilentRenderer {
            async fn render(&self, _: usize, _: &Path, _: &Path) -> Result<(), Mermaid2PdfError> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let err = render_all(&blocks(1), "doc", dir.path(), &SilentRenderer, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("wrote no image"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn mermaid_cli_maps_exit_failure() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.mmd");
        std::fs::write(&src, "graph TD").unwrap();
        // `false` ignores its arguments and exits 1.
        let cli = MermaidCli::new("false", RenderSettings::default());
        let err = cli
            .render(1, &src, &dir.path().join("a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, Mermaid2PdfError::RenderFailed { ordinal: 1, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn from_config_uses_explicit_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("mmdc");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = ConversionConfig::builder()
            .mmdc_path(&tool)
            .build()
            .unwrap();
        assert_eq!(MermaidCli::from_config(&config).unwrap().program(), tool.as_path());
    }
}
