//! End-to-end integration tests for mermaid2pdf.
//!
//! These tests run the real `mmdc` and `pandoc` (with xelatex). They are
//! gated behind the `E2E_ENABLED` environment variable so they do not run in
//! CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use mermaid2pdf::{convert, ConversionConfig, Mermaid2PdfError};
use std::path::Path;

/// Skip this test unless E2E_ENABLED is set and the given tools are found.
macro_rules! e2e_skip_unless_ready {
    ($($tool:expr),*) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        $(
            if !$tool.is_available() {
                println!("SKIP: {} not found", $tool.name);
                return;
            }
        )*
    }};
}

/// Fonts that ship with every TeX Live install, so the tests do not depend
/// on Barlow / Fira Code being present.
fn config_in(out: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .author("E2E Runner")
        .output_dir(out)
        .assets_dir(None)
        .mainfont("Latin Modern Roman")
        .monofont("Latin Modern Mono")
        .render_timeout_secs(120)
        .compile_timeout_secs(300)
        .build()
        .unwrap()
}

fn assert_pdf(path: &Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"), "{} is not a PDF", path.display());
    assert!(bytes.len() > 1_000, "{} is suspiciously small", path.display());
}

#[tokio::test]
async fn test_plain_document() {
    e2e_skip_unless_ready!(tool_locate::PANDOC);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain_notes.md");
    std::fs::write(
        &input,
        "# Plain Notes 🚀\n\nSome `inline` text → arrows.\n\n## Section\n\n```rust\nfn main() {}\n```\n",
    )
    .unwrap();

    let out = dir.path().join("out");
    let outputs = convert(&input, &config_in(&out)).await.unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].title, "Plain Notes");
    assert_eq!(outputs[0].stats.diagrams_found, 0);
    assert_pdf(&outputs[0].pdf_path);
}

#[tokio::test]
async fn test_document_with_diagrams() {
    e2e_skip_unless_ready!(tool_locate::MMDC, tool_locate::PANDOC);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("architecture.md");
    std::fs::write(
        &input,
        "# Architecture & Flow\n\n\
         ```mermaid\nflowchart TD\n  A[Client] --> B[Server]\n```\n\n\
         Between the diagrams.\n\n\
         ```mermaid\nsequenceDiagram\n  Alice->>Bob: Hello\n```\n",
    )
    .unwrap();

    let out = dir.path().join("out");
    let outputs = convert(&input, &config_in(&out)).await.unwrap();
    let output = &outputs[0];
    assert_eq!(output.title, "Architecture & Flow");
    assert_eq!(output.stats.diagrams_found, 2);
    assert_eq!(output.stats.diagrams_substituted, 2);
    assert_pdf(&output.pdf_path);

    let md = std::fs::read_to_string(&output.markdown_path).unwrap();
    assert!(md.contains("![Architecture Diagram 1](architecture_diagram_1.png)"));
    assert!(md.contains("![Architecture Diagram 2](architecture_diagram_2.png)"));
}

#[tokio::test]
async fn test_folder_batch() {
    e2e_skip_unless_ready!(tool_locate::PANDOC);

    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(docs.join("b.md"), "# Second\n").unwrap();
    std::fs::write(docs.join("a.md"), "# First\n").unwrap();

    let out = dir.path().join("out");
    let outputs = convert(&docs, &config_in(&out)).await.unwrap();
    let titles: Vec<_> = outputs.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    for output in &outputs {
        assert_pdf(&output.pdf_path);
    }
}

#[tokio::test]
async fn test_invalid_diagram_fails() {
    e2e_skip_unless_ready!(tool_locate::MMDC, tool_locate::PANDOC);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.md");
    std::fs::write(&input, "# Broken\n\n```mermaid\nnot a diagram at all\n```\n").unwrap();

    let out = dir.path().join("out");
    let err = convert(&input, &config_in(&out)).await.unwrap_err();
    assert!(
        matches!(err, Mermaid2PdfError::RenderFailed { ordinal: 1, .. }),
        "unexpected: {err}"
    );
    assert!(!out.join("pdf/broken.pdf").exists());
}
