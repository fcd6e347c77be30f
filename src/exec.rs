//! Blocking subprocess execution with stdin piping.

use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};

/// Run `program` with `args`, feeding `input` on stdin and returning stdout.
///
/// Fails when the binary cannot be spawned, exits non-zero (stderr is carried
/// in the error message), or emits output that is not valid UTF-8.
pub fn run_piped<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    input: &str,
) -> Result<String> {
    let name = program.as_ref().to_string_lossy().into_owned();

    let mut child = Command::new(program.as_ref())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn `{name}`"))?;

    // Dropping the handle closes the pipe so the child sees EOF. The child is
    // reaped before any error is reported; a broken pipe usually means the
    // child already failed, and its exit status is the better diagnostic.
    let write_result = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    };

    let output = child
        .wait_with_output()
        .with_context(|| format!("failed to wait for `{name}`"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "`{name}` failed with {status}: {detail}",
            status = output.status,
            detail = stderr.trim(),
        );
    }
    write_result.with_context(|| format!("failed to write stdin to `{name}`"))?;

    String::from_utf8(output.stdout)
        .map_err(|_| anyhow!("`{name}` produced output that is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_stdin_through_cat() {
        let output = run_piped("cat", &[] as &[&str], "piped content").unwrap();
        assert_eq!(output, "piped content");
    }

    #[test]
    fn passes_arguments_through() {
        let output = run_piped("echo", &["hello", "world"], "").unwrap();
        assert_eq!(output.trim(), "hello world");
    }

    #[test]
    fn reports_non_zero_exit() {
        let err = run_piped("false", &[] as &[&str], "").unwrap_err();
        assert!(err.to_string().contains("failed with"));
    }

    #[test]
    fn reports_missing_binary() {
        let err = run_piped("/nonexistent/transformer", &[] as &[&str], "").unwrap_err();
        assert!(err.to_string().contains("failed to spawn"));
    }
}
