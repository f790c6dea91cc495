use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::request::{EnvValue, ExecutionRequest};
use super::result::{ExecutionResult, NO_EXIT_CODE, OutputLine};
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long output readers may keep draining once the process is gone
const READER_GRACE: Duration = Duration::from_secs(2);

/// Seam between the orchestrator and the operating system
pub trait ProcessRunner: Send + Sync {
    /// Run the request to completion or until its timeout elapses.
    ///
    /// Only failing to start the process is an error; exit codes and timeouts
    /// are reported in the result. Descendants still running when the process
    /// exits are terminated along with it.
    fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResult>;
}

/// Runs requests as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        run(request)
    }
}

type LineBuffer = Arc<Mutex<Vec<OutputLine>>>;

pub fn run(request: &ExecutionRequest) -> Result<ExecutionResult> {
    let mut command = Command::new(request.program());
    command
        .args(request.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = request.working_dir() {
        command.current_dir(dir);
    }

    for (key, value) in request.env() {
        match value {
            EnvValue::Set(value) => {
                command.env(key, value);
            }
            EnvValue::Unset => {
                command.env_remove(key);
            }
        }
    }

    // Own process group so anything the tool spawned is killed with it.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    debug!("Running: {}", request.to_shell_command());
    let started = Instant::now();
    let mut child = command.spawn().map_err(|source| Error::Spawn {
        program: request.program().display().to_string(),
        source,
    })?;

    let lines: LineBuffer = Arc::new(Mutex::new(Vec::new()));
    let readers = [
        child.stdout.take().map(|out| drain(out, Arc::clone(&lines))),
        child.stderr.take().map(|err| drain(err, Arc::clone(&lines))),
    ];

    let outcome = match child.wait_timeout(request.timeout()) {
        Ok(Some(status)) => {
            // Background helpers may still hold the output pipes open.
            terminate(&mut child);
            Ok((exit_code(status), false))
        }
        Ok(None) => {
            warn!(
                "{} did not exit within {:?}, terminating",
                request.program_name(),
                request.timeout()
            );
            terminate(&mut child);
            let code = child.wait().map(exit_code).unwrap_or(NO_EXIT_CODE);
            Ok((code, true))
        }
        Err(e) => {
            terminate(&mut child);
            let _ = child.wait();
            Err(Error::IoError(e))
        }
    };

    let deadline = (started + request.timeout()).max(Instant::now() + READER_GRACE);
    join_readers(readers.into_iter().flatten().collect(), deadline, request);
    let elapsed = started.elapsed();
    let (exit_code, timed_out) = outcome?;

    let lines = std::mem::take(&mut *lines.lock().unwrap_or_else(PoisonError::into_inner));
    debug!(
        "{} finished: exit code {}, timed out {}, {} lines in {:?}",
        request.program_name(),
        exit_code,
        timed_out,
        lines.len(),
        elapsed
    );

    Ok(ExecutionResult {
        exit_code,
        timed_out,
        elapsed,
        lines,
    })
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(NO_EXIT_CODE)
}

/// Copy a stream into the shared buffer line by line until it closes
fn drain<R: Read + Send + 'static>(stream: R, sink: LineBuffer) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(trim_newline(&buf)).into_owned();
                    // Stamp under the lock so timestamps follow insertion order.
                    let mut lines = sink.lock().unwrap_or_else(PoisonError::into_inner);
                    lines.push(OutputLine::now(text));
                }
            }
        }
    })
}

/// Join the readers that finish before `deadline` and detach the rest.
///
/// A descendant outside the killed process group can keep a pipe open
/// indefinitely; its reader is left behind rather than blocking the caller.
fn join_readers(mut readers: Vec<JoinHandle<()>>, deadline: Instant, request: &ExecutionRequest) {
    loop {
        let (finished, pending): (Vec<_>, Vec<_>) =
            readers.into_iter().partition(JoinHandle::is_finished);
        for reader in finished {
            let _ = reader.join();
        }
        readers = pending;

        if readers.is_empty() {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            warn!(
                "Output of {} is still open after the process exited, detaching {} reader(s)",
                request.program_name(),
                readers.len()
            );
            return;
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn trim_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: signalling a process group we created; no memory is involved.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}

/// Extension trait to add `wait_timeout` to `Child`.
trait ChildExt {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(Some(status));
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
        }
    }
}
