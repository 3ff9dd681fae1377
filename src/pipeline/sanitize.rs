//! Sanitisation: make Markdown safe for a LaTeX (xelatex) backend.
//!
//! ## Rule Order
//!
//! Rules must run in this order:
//! 1. Strip pictographic code points the body font cannot render
//! 2. Replace `→` with `$\rightarrow$` (the body font lacks the glyph)
//! 3. Unwrap single-backtick inline code, keeping the text
//! 4. Strip any hand-written `\begin{titlepage}…\end{titlepage}` region
//! 5. Strip front-matter fields the pipeline regenerates
//!
//! Every rule is best-effort: nothing here can fail, and text a rule does not
//! recognise passes through unmodified.

use crate::pipeline::fence::{FenceLine, FenceTracker};
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every sanitisation rule, in order.
pub fn sanitize(input: &str) -> String {
    let s = strip_emoji(input);
    let s = replace_arrows(&s);
    let s = remove_inline_backticks(&s);
    let s = strip_titlepage(&s);
    strip_front_matter_fields(&s)
}

// ── Rule 1: Strip emoji and pictographs ──────────────────────────────────────

static RE_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}", // emoticons
        r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
        r"\x{1F680}-\x{1F6FF}", // transport & map
        r"\x{1F1E0}-\x{1F1FF}", // flags
        r"\x{1F7E0}-\x{1F7EB}", // coloured circles
        r"\x{1F900}-\x{1F9FF}", // supplemental symbols
        r"\x{1FA00}-\x{1FA6F}", // chess symbols
        r"\x{1FA70}-\x{1FAFF}", // symbols extended-A
        r"\x{2702}-\x{27B0}",   // dingbats
        r"\x{FE00}-\x{FE0F}",   // variation selectors
        r"\x{200D}",            // zero width joiner
        r"\x{2600}-\x{26FF}",   // misc symbols
        r"\x{231A}-\x{231B}",   // watch, hourglass
        r"\x{2934}-\x{2935}",   // curved arrows
        r"\x{25AA}-\x{25FE}",   // geometric shapes
        r"\x{2B05}-\x{2B07}",   // arrows
        r"\x{2B1B}-\x{2B1C}",   // squares
        r"\x{2B50}",            // star
        r"\x{2B55}",            // circle
        r"\x{203C}-\x{2049}",   // exclamation marks
        r"\x{2139}",            // info
        r"\x{1F004}-\x{1F0CF}", // playing cards, mahjong
        r"\x{1F170}-\x{1F251}", // enclosed characters
        "]+",
    ))
    .unwrap()
});

/// Remove emoji. Surrounding whitespace is left as-is.
pub fn strip_emoji(input: &str) -> String {
    RE_EMOJI.replace_all(input, "").into_owned()
}

// ── Rule 2: Arrow glyph ──────────────────────────────────────────────────────

pub fn replace_arrows(input: &str) -> String {
    input.replace('→', r"$\rightarrow$")
}

// ── Rule 3: Inline code backticks ────────────────────────────────────────────

static RE_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+?)`").unwrap());

/// Unwrap `` `code` `` to `code` outside fenced code blocks.
///
/// Fence lines and everything between them are copied untouched. Replacement
/// repeats until nothing matches, which makes the rule idempotent even on
/// oddities like ``` ``a`b` ```.
pub fn remove_inline_backticks(input: &str) -> String {
    map_outside_fences(input, |line| {
        let mut current = line.to_string();
        loop {
            let next = RE_INLINE_CODE.replace_all(&current, "$1");
            if next == current {
                return current;
            }
            current = next.into_owned();
        }
    })
}

/// Lines of `input` that are not fence lines and not inside a fenced block.
pub(crate) fn lines_outside_fences(input: &str) -> impl Iterator<Item = &str> {
    let mut fences = FenceTracker::new();
    input
        .lines()
        .filter(move |line| fences.classify(line) == FenceLine::Text)
}

/// Apply `f` to every line outside fenced blocks; copy all other lines as-is.
/// An unclosed fence protects everything after it.
fn map_outside_fences(input: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(input.len());
    let mut fences = FenceTracker::new();

    for line in input.split_inclusive('\n') {
        if fences.classify(line) != FenceLine::Text {
            out.push_str(line);
            continue;
        }
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        out.push_str(&f(body));
        out.push_str(newline);
    }
    out
}

// ── Rule 4: Hand-written title page ──────────────────────────────────────────

static RE_TITLEPAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\begin\{titlepage\}.*?\\end\{titlepage\}").unwrap());

/// Remove every complete `titlepage` environment, content included.
pub fn strip_titlepage(input: &str) -> String {
    RE_TITLEPAGE.replace_all(input, "").into_owned()
}

// ── Rule 5: Front-matter fields ──────────────────────────────────────────────

static RE_FRONT_MATTER_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:title|author|date|numbersections|geometry):[^\r\n]*").unwrap()
});

static RE_HEADER_INCLUDES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^header-includes:[ \t]*(?:\r?\n[ \t]+-[ \t]+[^\r\n]*)*(?:\r?\n|\z)").unwrap()
});

/// Remove `title:`, `author:`, `date:`, `numbersections:`, `geometry:` lines
/// and the `header-includes:` list. Field names are case-sensitive and must
/// start the line. Both `\n` and `\r\n` line endings are handled; a removed
/// field keeps its line terminator.
pub fn strip_front_matter_fields(input: &str) -> String {
    let s = RE_FRONT_MATTER_FIELD.replace_all(input, "");
    RE_HEADER_INCLUDES.replace_all(&s, "").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
