//! Title and title-page synthesis.
//!
//! Produces the two LaTeX fragments handed to the compiler alongside the
//! Markdown body:
//!
//! - the **title page** (`-B`, inserted before the body): title, author,
//!   `\today`, optional logo, then the table of contents;
//! - the **preamble definitions** (`-H`, inserted in the header): named
//!   commands `\logopath`, `\haslogo` and `\headertext` that the style
//!   preamble consumes. Keeping them in a separate fragment lets the style
//!   preamble stay free of per-document data.

use crate::pipeline::sanitize::lines_outside_fences;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logo height on the title page.
pub const LOGO_HEIGHT: &str = "40pt";

static RE_TOP_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[ \t]+(.+)$").unwrap());

/// Per-document title information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMetadata {
    /// Title as written in the document.
    pub title: String,
    /// Title escaped for LaTeX.
    pub title_escaped: String,
    pub author: String,
    pub logo: Option<PathBuf>,
    pub header_text: String,
}

impl TitleMetadata {
    /// Resolve the title of `markdown`, falling back to `base_name`.
    pub fn resolve(
        markdown: &str,
        base_name: &str,
        author: impl Into<String>,
        logo: Option<PathBuf>,
        header_text: impl Into<String>,
    ) -> Self {
        let title = resolve_title(markdown, base_name);
        Self {
            title_escaped: escape_latex(&title),
            title,
            author: author.into(),
            logo,
            header_text: header_text.into(),
        }
    }

    /// The `titlepage` fragment, followed by the table of contents.
    pub fn title_page(&self) -> String {
        let author_block = if self.author.trim().is_empty() {
            String::new()
        } else {
            format!(
                "{{\\Large {}\\par}}\n\n\\vspace{{1cm}}\n\n",
                escape_latex(&self.author)
            )
        };
        let logo_block = match &self.logo {
            Some(logo) => format!(
                "\\includegraphics[height={LOGO_HEIGHT}]{{{}}}\n\n",
                latex_path(logo)
            ),
            None => String::new(),
        };

        format!(
            "\\begin{{titlepage}}\n\
             \\centering\n\n\
             \\vspace*{{3cm}}\n\n\
             {{\\fontsize{{30}}{{36}}\\selectfont\\bfseries {title}\\par}}\n\n\
             \\vspace{{1.5cm}}\n\n\
             {author_block}\
             {{\\large \\today\\par}}\n\n\
             \\vfill\n\n\
             {logo_block}\
             \\vspace{{1cm}}\n\
             \\end{{titlepage}}\n\n\
             \\tableofcontents\n\
             \\newpage\n",
            title = self.title_escaped,
        )
    }

    /// Named references for the style preamble. `\logopath` is always
    /// defined (empty without a logo); `\haslogo` only exists with one.
    pub fn preamble_definitions(&self) -> String {
        let mut lines = Vec::with_capacity(3);
        match &self.logo {
            Some(logo) => {
                lines.push(format!("\\newcommand{{\\logopath}}{{{}}}", latex_path(logo)));
                lines.push("\\newcommand{\\haslogo}{1}".to_string());
            }
            None => lines.push("\\newcommand{\\logopath}{}".to_string()),
        }
        lines.push(format!(
            "\\newcommand{{\\headertext}}{{{}}}",
            escape_latex(&self.header_text)
        ));
        lines.join("\n") + "\n"
    }
}

/// Text of the first non-blank top-level `# ` heading outside fenced code,
/// trimmed; `base_name` when there is none.
pub fn resolve_title(markdown: &str, base_name: &str) -> String {
    lines_outside_fences(markdown)
        .find_map(|line| {
            RE_TOP_HEADING
                .captures(line)
                .map(|caps| caps[1].trim().to_string())
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| base_name.to_string())
}

const BACKSLASH_PLACEHOLDER: &str = "\u{0}BKSL\u{0}";

/// Escape LaTeX special characters.
///
/// Backslashes go to a placeholder first and become `\textbackslash{}` last,
/// so the braces of that sequence are never re-escaped as `\{` `\}`.
pub fn escape_latex(text: &str) -> String {
    text.replace('\\', BACKSLASH_PLACEHOLDER)
        .replace('{', r"\{")
        .replace('}', r"\}")
        .replace('_', r"\_")
        .replace('&', r"\&")
        .replace('%', r"\%")
        .replace('$', r"\$")
        .replace('#', r"\#")
        .replace('^', r"\textasciicircum{}")
        .replace('~', r"\textasciitilde{}")
        .replace(BACKSLASH_PLACEHOLDER, r"\textbackslash{}")
}

/// Paths inside `\includegraphics` must use forward slashes.
fn latex_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
