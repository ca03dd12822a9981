//! Blocking external process execution with a hard timeout.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{JobError, JobResult, Stage};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A program to run once, with its time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Stage the command belongs to, for error context.
    pub stage: Stage,
    /// Executable.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Working directory, inherited when unset.
    pub cwd: Option<PathBuf>,
    /// Hard limit; the process is killed when it is exceeded.
    pub timeout: Duration,
}

impl ExternalCommand {
    /// A command with no arguments.
    #[must_use]
    pub fn new(stage: Stage, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn failure(&self, code: Option<i32>, diagnostics: String) -> JobError {
        JobError::ExternalProcessFailure {
            stage: self.stage,
            program: self.program.clone(),
            code,
            diagnostics,
        }
    }
}

/// Captured output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Wall time until exit.
    pub elapsed: Duration,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            // A read error leaves whatever was collected so far.
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("could not kill external process {}: {e}", child.id());
    }
    // Reap so the pipes close and the drain threads finish.
    let _ = child.wait();
}

/// Run `cmd` to completion, blocking the caller.
///
/// Output pipes are drained on background threads so a chatty child can
/// never block on a full pipe.
///
/// # Errors
///
/// - [`JobError::ExternalProcessTimeout`] if the budget runs out; the
///   process has been killed when this returns
/// - [`JobError::ExternalProcessFailure`] if it cannot start or exits
///   unsuccessfully, with stderr (or stdout, if stderr is empty) attached
pub fn run_external(cmd: &ExternalCommand) -> JobResult<ProcessOutput> {
    debug!("{}: running {} {:?}", cmd.stage, cmd.program, cmd.args);
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &cmd.cwd {
        command.current_dir(dir);
    }

    let start = Instant::now();
    let mut child = command
        .spawn()
        .map_err(|e| cmd.failure(None, format!("failed to start: {e}")))?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= cmd.timeout => {
                kill(&mut child);
                warn!(
                    "{}: {} timed out after {} s, killed",
                    cmd.stage,
                    cmd.program,
                    cmd.timeout.as_secs()
                );
                // Grandchildren may still hold the pipes; leave the readers detached.
                drop((stdout, stderr));
                return Err(JobError::ExternalProcessTimeout {
                    stage: cmd.stage,
                    program: cmd.program.clone(),
                    timeout_secs: cmd.timeout.as_secs(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill(&mut child);
                drop((stdout, stderr));
                return Err(cmd.failure(None, format!("wait failed: {e}")));
            }
        }
    };

    let elapsed = start.elapsed();
    let stdout = join(stdout);
    let stderr = join(stderr);
    if !status.success() {
        let diagnostics = if stderr.trim().is_empty() { &stdout } else { &stderr };
        return Err(cmd.failure(status.code(), diagnostics.trim().to_string()));
    }
    debug!("{}: {} finished in {elapsed:?}", cmd.stage, cmd.program);
    Ok(ProcessOutput { stdout, stderr, elapsed })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> ExternalCommand {
        ExternalCommand::new(Stage::Render, "sh", timeout).args(["-c", script])
    }

    #[test]
    fn captures_output() {
        let out = run_external(&sh("echo hello; echo oops >&2", Duration::from_secs(10))).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn non_zero_exit_is_failure_with_stderr() {
        let err = run_external(&sh("echo broken >&2; exit 3", Duration::from_secs(10))).unwrap_err();
        match err {
            JobError::ExternalProcessFailure { code, diagnostics, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(diagnostics, "broken");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn timeout_kills_the_process() {
        let start = Instant::now();
        let err = run_external(&sh("exec sleep 30", Duration::from_millis(200))).unwrap_err();
        assert!(matches!(err, JobError::ExternalProcessTimeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn missing_program_is_failure() {
        let cmd = ExternalCommand::new(Stage::Render, "definitely-not-a-real-program-xyz", Duration::from_secs(1));
        assert!(matches!(
            run_external(&cmd),
            Err(JobError::ExternalProcessFailure { code: None, .. })
        ));
    }
}
