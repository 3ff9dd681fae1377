//! Block substitution: swap each diagram block for an image reference.
//!
//! The Nth ` ```mermaid ` block becomes `![Caption](file_name)` for the image
//! carrying ordinal N. The file name is bare (no directory); the document
//! compiler resolves it through its resource search path.
//!
//! ## Degradation policy
//!
//! When there is no image for a block (fewer images than blocks), that block
//! is left exactly as written. This is intentional: a document with surplus
//! diagrams still produces output, with the untouched blocks rendered as
//! code listings, rather than failing the run.

use crate::pipeline::extract::block_spans;
use crate::pipeline::render::RenderedImage;
use std::path::Path;
use tracing::warn;

/// Replace diagram blocks with references to their rendered images.
///
/// Returns the input unchanged when it contains no diagram blocks. Fenced
/// blocks in other languages are never touched, nor is anything inside them.
pub fn substitute_blocks(markdown: &str, images: &[RenderedImage]) -> String {
    substitute_counted(markdown, images).0
}

/// [`substitute_blocks`], also returning how many blocks were replaced.
pub fn substitute_counted(markdown: &str, images: &[RenderedImage]) -> (String, usize) {
    let mut out = String::with_capacity(markdown.len());
    let mut copied_to = 0usize;
    let mut total = 0usize;
    let mut replaced = 0usize;

    for (idx, span) in block_spans(markdown).enumerate() {
        total += 1;
        let Some(image) = images.iter().find(|img| img.ordinal == idx + 1) else {
            continue;
        };
        out.push_str(&markdown[copied_to..span.range.start]);
        out.push_str(&image_reference(image));
        copied_to = span.range.end;
        replaced += 1;
    }
    out.push_str(&markdown[copied_to..]);

    if replaced < total {
        warn!("{} of {} diagram block(s) left in place (no image)", total - replaced, total);
    }
    (out, replaced)
}

/// Convenience form of [`substitute_blocks`] taking bare image file names,
/// assigned to blocks by position.
pub fn substitute_with_names<S: AsRef<str>>(markdown: &str, names: &[S]) -> String {
    let images: Vec<RenderedImage> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| RenderedImage::new(idx + 1, name.as_ref()))
        .collect();
    substitute_blocks(markdown, &images)
}

/// Markdown image syntax for one rendered diagram.
pub fn image_reference(image: &RenderedImage) -> String {
    format!("![{}]({})", caption_for(&image.file_name), image.file_name)
}

/// Human-readable caption from an image file name:
/// `report_diagram_2.png` → `Report Diagram 2`.
pub fn caption_for(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    title_case(&stem.replace('_', " "))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
