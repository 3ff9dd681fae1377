//! # tool-locate
//!
//! Locate the external command-line tools that `mermaid2pdf` drives as
//! subprocesses (the Mermaid CLI `mmdc` and `pandoc`) so that a missing
//! installation is reported up front with an install hint instead of surfacing
//! as an opaque "No such file or directory" halfway through a conversion.
//!
//! ## How it works
//!
//! [`ExternalTool::locate_with`] resolves a tool in this order (first match
//! wins):
//!
//! 1. An explicit path supplied by the caller (e.g. a `--pandoc` CLI flag).
//! 2. The tool's environment variable override (`MERMAID2PDF_MMDC`,
//!    `MERMAID2PDF_PANDOC`).
//! 3. A search of every directory on `PATH`. On Windows the `PATHEXT`
//!    extensions are tried too, which matters for `mmdc.cmd` installed by npm.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tool_locate::{MMDC, PANDOC};
//!
//! let mmdc = MMDC.locate().expect("mmdc missing");
//! let pandoc = PANDOC.locate_with(None).expect("pandoc missing");
//! println!("{} / {}", mmdc.display(), PANDOC.version(&pandoc).unwrap_or_default());
//! ```

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating or probing an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool is not on `PATH` and no override was given.
    #[error("'{tool}' not found on PATH.\n{hint}")]
    NotFound { tool: String, hint: String },

    /// An explicit path or environment override points nowhere.
    #[error("{origin} points to '{path}', which does not exist or is not executable")]
    OverrideInvalid { origin: String, path: PathBuf },

    /// `<tool> --version` could not be run.
    #[error("Failed to run '{path}': {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Known tools ──────────────────────────────────────────────────────────────

/// Static description of an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalTool {
    /// Executable name searched on `PATH`.
    pub name: &'static str,
    /// Environment variable holding an explicit path.
    pub env_var: &'static str,
    /// Shown when the tool cannot be found.
    pub install_hint: &'static str,
}

/// The Mermaid CLI renderer.
pub const MMDC: ExternalTool = ExternalTool {
    name: "mmdc",
    env_var: "MERMAID2PDF_MMDC",
    install_hint: "Install it with:  npm install -g @mermaid-js/mermaid-cli\n\
                   or point MERMAID2PDF_MMDC at an existing mmdc executable.",
};

/// The pandoc document compiler.
pub const PANDOC: ExternalTool = ExternalTool {
    name: "pandoc",
    env_var: "MERMAID2PDF_PANDOC",
    install_hint: "Install pandoc and a TeX distribution providing xelatex \
                   (https://pandoc.org/installing.html),\n\
                   or point MERMAID2PDF_PANDOC at an existing pandoc executable.",
};

impl ExternalTool {
    /// Locate the tool via its environment override or `PATH`.
    pub fn locate(&self) -> Result<PathBuf, ToolError> {
        self.locate_with(None)
    }

    /// Locate the tool, preferring `explicit` when given.
    pub fn locate_with(&self, explicit: Option<&Path>) -> Result<PathBuf, ToolError> {
        if let Some(path) = explicit {
            return check_override(path, "explicit tool path");
        }

        if let Some(value) = std::env::var_os(self.env_var) {
            if !value.is_empty() {
                return check_override(Path::new(&value), self.env_var);
            }
        }

        let path_var = std::env::var_os("PATH").unwrap_or_default();
        find_in_path(self.name, &path_var).ok_or_else(|| ToolError::NotFound {
            tool: self.name.to_string(),
            hint: self.install_hint.to_string(),
        })
    }

    /// Returns `true` when [`locate`](Self::locate) would succeed.
    pub fn is_available(&self) -> bool {
        self.locate().is_ok()
    }

    /// Run `<path> --version` and return the first non-empty output line.
    ///
    /// Some tools (older `mmdc` releases) print their version on stderr, so
    /// both streams are checked.
    pub fn version(&self, path: &Path) -> Result<String, ToolError> {
        let output = Command::new(path)
            .arg("--version")
            .output()
            .map_err(|source| ToolError::Probe {
                path: path.to_path_buf(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let line = stdout
            .lines()
            .chain(stderr.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("unknown version");
        Ok(line.to_string())
    }
}

// ── PATH search ──────────────────────────────────────────────────────────────

/// Search every directory in `path_var` for an executable called `name`.
///
/// `path_var` uses the platform separator (`:` on Unix, `;` on Windows), i.e.
/// exactly the shape of the `PATH` environment variable.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    let candidates = candidate_names(name);
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates.iter().map(move |c| dir.join(c)))
        .find(|p| is_executable(p))
}

fn candidate_names(name: &str) -> Vec<OsString> {
    let mut names = vec![OsString::from(name)];
    if cfg!(windows) {
        let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| ".EXE;.CMD;.BAT".into());
        for ext in pathext.split(';').filter(|e| !e.is_empty()) {
            names.push(OsString::from(format!("{name}{}", ext.to_lowercase())));
        }
    }
    names
}

fn check_override(path: &Path, origin: &str) -> Result<PathBuf, ToolError> {
    if is_executable(path) {
        Ok(path.to_path_buf())
    } else {
        Err(ToolError::OverrideInvalid {
            origin: origin.to_string(),
            path: path.to_path_buf(),
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, "#!/bin/sh\necho fake 1.0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&p, fs::Permissions::from_mode(0o755)).unwrap();
        }
        p
    }

    #[test]
    fn finds_tool_in_second_path_entry() {
        let empty = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let expected = make_executable(bin.path(), "mmdc");

        let path_var = std::env::join_paths([empty.path(), bin.path()]).unwrap();
        assert_eq!(find_in_path("mmdc", &path_var), Some(expected));
    }

    #[test]
    fn missing_tool_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(find_in_path("definitely-not-a-tool", &path_var), None);
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pandoc"), "not executable").unwrap();
        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(find_in_path("pandoc", &path_var), None);
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let tool = make_executable(dir.path(), "my-pandoc");
        assert_eq!(PANDOC.locate_with(Some(&tool)).unwrap(), tool);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = MMDC
            .locate_with(Some(Path::new("/nonexistent/mmdc")))
            .unwrap_err();
        assert!(matches!(err, ToolError::OverrideInvalid { .. }));
        assert!(err.to_string().contains("/nonexistent/mmdc"));
    }

    #[test]
    fn not_found_message_carries_install_hint() {
        let err = ToolError::NotFound {
            tool: MMDC.name.into(),
            hint: MMDC.install_hint.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mmdc"));
        assert!(msg.contains("npm install -g @mermaid-js/mermaid-cli"));
    }

    #[test]
    fn version_of_missing_binary_is_probe_error() {
        let err = PANDOC.version(Path::new("/nonexistent/pandoc")).unwrap_err();
        assert!(matches!(err, ToolError::Probe { .. }));
    }
}
