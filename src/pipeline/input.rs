//! Input resolution: turn a user-supplied path into the documents to convert.
//!
//! A path may name a single `.md` file or a folder. For a folder, every `.md`
//! file directly inside it is converted, in file-name order, so batch output
//! is reproducible across platforms whose `read_dir` order differs.

use crate::error::Mermaid2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An immutable Markdown document.
///
/// Stages never mutate a `Document`; they produce a new one via
/// [`Document::with_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Base name (file stem). Used for the fallback title, scratch file names
    /// and the PDF file name.
    pub name: String,
    /// File name including extension, e.g. `report.md`.
    pub file_name: String,
    /// Directory the document was read from, if it came from disk.
    pub source_dir: Option<PathBuf>,
    /// The Markdown source.
    pub text: String,
}

impl Document {
    /// Build an in-memory document. `name` is the base name without extension.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            file_name: format!("{name}.md"),
            name,
            source_dir: None,
            text: text.into(),
        }
    }

    /// Read a document from disk.
    pub fn load(path: &Path) -> Result<Self, Mermaid2PdfError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Mermaid2PdfError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Mermaid2PdfError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Mermaid2PdfError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{name}.md"));

        debug!("Loaded {} ({} bytes)", path.display(), text.len());
        Ok(Self {
            name,
            file_name,
            source_dir: path.parent().map(Path::to_path_buf),
            text,
        })
    }

    /// A copy of this document carrying `text` instead.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Default page-header text: the base name with underscores as spaces.
    pub fn default_header_text(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// Check if a path has a `.md` extension.
pub fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Resolve the input path to the ordered list of Markdown files to convert.
///
/// # Errors
/// - [`Mermaid2PdfError::FileNotFound`] if the path does not exist
/// - [`Mermaid2PdfError::NotMarkdown`] for a file without `.md` extension
/// - [`Mermaid2PdfError::EmptyFolder`] for a folder without `.md` files
pub fn resolve_input(input: &Path) -> Result<Vec<PathBuf>, Mermaid2PdfError> {
    if !input.exists() {
        return Err(Mermaid2PdfError::FileNotFound {
            path: input.to_path_buf(),
        });
    }

    if input.is_file() {
        if !is_markdown(input) {
            return Err(Mermaid2PdfError::NotMarkdown {
                path: input.to_path_buf(),
            });
        }
        return Ok(vec![input.to_path_buf()]);
    }

    if input.is_dir() {
        let entries = std::fs::read_dir(input).map_err(|e| Mermaid2PdfError::ReadFailed {
            path: input.to_path_buf(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_markdown(p))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(Mermaid2PdfError::EmptyFolder {
                path: input.to_path_buf(),
            });
        }
        debug!("Found {} markdown file(s) in {}", files.len(), input.display());
        return Ok(files);
    }

    Err(Mermaid2PdfError::InvalidInput {
        path: input.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("report.md")));
        assert!(is_markdown(Path::new("/tmp/a.b.md")));
        assert!(!is_markdown(Path::new("report.markdown")));
        assert!(!is_markdown(Path::new("report.txt")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn test_resolve_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        fs::write(&file, "# Notes").unwrap();
        assert_eq!(resolve_input(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_resolve_rejects_non_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            resolve_input(&file),
            Err(Mermaid2PdfError::NotMarkdown { .. })
        ));
    }

    #[test]
    fn test_resolve_missing_path() {
        assert!(matches!(
            resolve_input(Path::new("/definitely/not/here.md")),
            Err(Mermaid2PdfError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_folder_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let files = resolve_input(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_resolve_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "").unwrap();
        assert!(matches!(
            resolve_input(dir.path()),
            Err(Mermaid2PdfError::EmptyFolder { .. })
        ));
    }

    #[test]
    fn test_document_load_and_with_text() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("system_design.md");
        fs::write(&file, "# Design").unwrap();

        let doc = Document::load(&file).unwrap();
        assert_eq!(doc.name, "system_design");
        assert_eq!(doc.file_name, "system_design.md");
        assert_eq!(doc.source_dir.as_deref(), Some(dir.path()));
        assert_eq!(doc.default_header_text(), "system design");

        let changed = doc.with_text("other");
        assert_eq!(changed.text, "other");
        assert_eq!(changed.name, doc.name);
        assert_eq!(doc.text, "# Design");
    }
}
