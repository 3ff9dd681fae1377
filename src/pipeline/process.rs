//! Subprocess execution shared by the renderer and the compiler.
//!
//! Both external tools follow the same contract: run to completion, capture
//! stdout/stderr, treat a non-zero exit as failure. `kill_on_drop` makes an
//! elapsed timeout actually terminate the child instead of leaving an orphaned
//! `mmdc` (and its headless Chromium) behind.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Why a subprocess did not succeed.
#[derive(Debug)]
pub(crate) enum ProcessFailure {
    /// The program could not be started or awaited.
    Io(std::io::Error),
    /// The configured timeout elapsed; the child was killed.
    TimedOut,
    /// The program ran and exited non-zero.
    Exit { status: String, stderr: String },
}

/// Run `program` with `args`, waiting at most `timeout` when given.
pub(crate) async fn run_tool(
    program: &Path,
    args: &[OsString],
    timeout: Option<Duration>,
) -> Result<Output, ProcessFailure> {
    debug!(
        "exec: {} {}",
        program.display(),
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(ProcessFailure::Io)?;

    let wait = child.wait_with_output();
    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| ProcessFailure::TimedOut)?,
        None => wait.await,
    }
    .map_err(ProcessFailure::Io)?;

    if output.status.success() {
        return Ok(output);
    }

    // Tools occasionally report on stdout only; fall back to it so the user
    // always sees some diagnostic.
    let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    Err(ProcessFailure::Exit {
        status: output.status.to_string(),
        stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[tokio::test]
    async fn success_captures_stdout() {
        let out = run_tool(Path::new("sh"), &args(&["-c", "echo hello"]), None)
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn non_zero_exit_surfaces_stderr() {
        let err = run_tool(
            Path::new("sh"),
            &args(&["-c", "echo 'syntax error' >&2; exit 3"]),
            None,
        )
        .await
        .unwrap_err();
        match err {
            ProcessFailure::Exit { stderr, status } => {
                assert_eq!(stderr, "syntax error");
                assert!(status.contains('3'));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_io_error() {
        let err = run_tool(Path::new("/nonexistent/tool"), &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessFailure::Io(_)));
    }

    #[tokio::test]
    async fn timeout_kills_child() {
        let err = run_tool(
            Path::new("sh"),
            &args(&["-c", "sleep 5"]),
            Some(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProcessFailure::TimedOut));
    }
}
