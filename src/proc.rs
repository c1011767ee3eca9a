use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::PipelineError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug)]
pub(crate) struct ProcOutput {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: Vec<u8>,
}

/// Runs a child process to completion, feeding it `stdin` and capturing both
/// output streams. A child still running at the deadline is killed and
/// reported as a timeout. Output pipes are drained on separate threads so a
/// chatty child cannot deadlock against a full pipe.
pub(crate) fn run(
    program: &'static str,
    mut command: Command,
    stdin: Option<Vec<u8>>,
    timeout: Duration,
) -> Result<ProcOutput, PipelineError> {
    command
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .map_err(|e| PipelineError::Spawn { program, source: e })?;

    let writer = stdin.and_then(|bytes| {
        child.stdin.take().map(|mut pipe| {
            thread::spawn(move || {
                let _ = pipe.write_all(&bytes);
            })
        })
    });
    let stdout_reader = child.stdout.take().map(spawn_drain);
    let stderr_reader = child.stderr.take().map(spawn_drain);

    let waited = wait_with_deadline(&mut child, program, timeout);

    // The child is gone either way, so the pipes are at EOF and every
    // helper thread can be joined before the verdict is returned.
    let stdout = join_drain(stdout_reader);
    let stderr = join_drain(stderr_reader);
    if let Some(handle) = writer {
        let _ = handle.join();
    }

    let status = waited?;
    Ok(ProcOutput {
        status,
        stdout,
        stderr,
    })
}

fn wait_with_deadline(
    child: &mut Child,
    program: &'static str,
    timeout: Duration,
) -> Result<ExitStatus, PipelineError> {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PipelineError::Timeout {
                        program,
                        seconds: timeout.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PipelineError::Process {
                    program,
                    detail: format!("wait failed: {}", e),
                });
            }
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// One-line description of a failed exit, with the first stderr line when
/// the process left one.
pub(crate) fn failure_detail(status: ExitStatus, stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    match text.lines().next() {
        Some(line) => format!("{} ({})", status, line),
        None => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf hello"]);

        let out = run("sh", cmd, None, Duration::from_secs(5)).unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout, b"hello");
    }

    #[test]
    fn test_feeds_stdin_through() {
        let cmd = Command::new("cat");

        let out = run("cat", cmd, Some(b"forward me".to_vec()), Duration::from_secs(5)).unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout, b"forward me");
    }

    #[test]
    fn test_kills_child_at_deadline() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");

        let err = run("sleep", cmd, None, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { .. }));
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let cmd = Command::new("no-such-binary-anywhere");

        let err = run("no-such-binary-anywhere", cmd, None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, PipelineError::Spawn { .. }));
    }

    #[test]
    fn test_failure_detail_includes_stderr_line() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo broken >&2; exit 3"]);

        let out = run("sh", cmd, None, Duration::from_secs(5)).unwrap();
        assert!(!out.status.success());

        let detail = failure_detail(out.status, &out.stderr);
        assert!(detail.contains("broken"), "detail was: {}", detail);
    }
}
