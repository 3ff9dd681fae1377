//! Embedded LaTeX templates.
//!
//! The style preamble is passed to the compiler with `-H` after the
//! per-document definitions fragment, so it may reference `\headertext`,
//! `\logopath` and (when a logo exists) `\haslogo`.
//!
//! Callers can override the default via
//! [`crate::config::ConversionConfig::preamble`]; the constant here is used
//! only when no override is provided.

/// Default style preamble: running header with the document's header text and
/// optional logo, plus shaded code blocks.
pub const DEFAULT_PREAMBLE: &str = r#"% mermaid2pdf default style preamble
\usepackage{graphicx}
\usepackage{xcolor}
\usepackage{fancyhdr}

\definecolor{codebg}{HTML}{F6F8FA}
\definecolor{rulegray}{HTML}{D0D7DE}

% Running header: document header text on the left, logo on the right.
\pagestyle{fancy}
\fancyhf{}
\fancyhead[L]{\small\textcolor{gray}{\headertext}}
\ifdefined\haslogo
  \fancyhead[R]{\includegraphics[height=14pt]{\logopath}}
\fi
\fancyfoot[C]{\small\thepage}
\renewcommand{\headrulewidth}{0.4pt}
\renewcommand{\headrule}{\hbox to\headwidth{\color{rulegray}\leaders\hrule height \headrulewidth\hfill}}

% Chapter and title pages keep the header.
\fancypagestyle{plain}{
  \fancyhf{}
  \fancyhead[L]{\small\textcolor{gray}{\headertext}}
  \fancyfoot[C]{\small\thepage}
}

% Shaded code blocks.
\usepackage{framed}
\ifdefined\Shaded
  \renewenvironment{Shaded}{\begin{snugshade}}{\end{snugshade}}
\fi
\colorlet{shadecolor}{codebg}

\setlength{\parskip}{6pt}
\setlength{\parindent}{0pt}
"#;
