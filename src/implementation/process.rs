//! External normalizer processes.
//!
//! One child process per implementation, kept alive for the whole formula
//! stream. Requests and replies are single lines on the child's stdin and
//! stdout; stderr is inherited so diagnostics reach the terminal.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::bench::config::ImplementationSpec;
use crate::{BenchError, BenchResult};

use super::traits::{Launcher, Normalizer, TerminationStatus};

/// How long a process gets to exit on its own after being asked to.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const SIGNAL_NAMES: &[(i32, &str)] = &[
    (libc::SIGHUP, "SIGHUP"),
    (libc::SIGINT, "SIGINT"),
    (libc::SIGQUIT, "SIGQUIT"),
    (libc::SIGILL, "SIGILL"),
    (libc::SIGTRAP, "SIGTRAP"),
    (libc::SIGABRT, "SIGABRT"),
    (libc::SIGBUS, "SIGBUS"),
    (libc::SIGFPE, "SIGFPE"),
    (libc::SIGKILL, "SIGKILL"),
    (libc::SIGUSR1, "SIGUSR1"),
    (libc::SIGSEGV, "SIGSEGV"),
    (libc::SIGUSR2, "SIGUSR2"),
    (libc::SIGPIPE, "SIGPIPE"),
    (libc::SIGALRM, "SIGALRM"),
    (libc::SIGTERM, "SIGTERM"),
    (libc::SIGXCPU, "SIGXCPU"),
    (libc::SIGXFSZ, "SIGXFSZ"),
];

/// Name of a signal number, `SIG<n>` when unknown.
pub fn signal_name(number: i32) -> String {
    SIGNAL_NAMES
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("SIG{number}"))
}

fn describe(status: ExitStatus) -> TerminationStatus {
    if let Some(code) = status.code() {
        TerminationStatus::Exited(code)
    } else if let Some(number) = status.signal() {
        TerminationStatus::Signaled {
            number,
            name: signal_name(number),
        }
    } else {
        TerminationStatus::Unknown
    }
}

/// A running normalizer behind piped stdin/stdout.
pub struct ImplementationProcess {
    name: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    shutdown_timeout: Duration,
    finished: bool,
}

impl ImplementationProcess {
    /// Start the implementation's command.
    pub fn spawn(spec: &ImplementationSpec) -> BenchResult<Self> {
        let (program, args) = spec.command.split_first().ok_or_else(|| {
            BenchError::Config(format!("implementation {} has an empty command", spec.name))
        })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                BenchError::Message(format!("failed to start {} ({program}): {e}", spec.name))
            })?;
        debug!(implementation = %spec.name, pid = child.id(), "started normalizer");

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| BenchError::Message(format!("no stdout for {}", spec.name)))?;

        Ok(ImplementationProcess {
            name: spec.name.clone(),
            child,
            stdin,
            stdout,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
            finished: false,
        })
    }

    /// Override the shutdown grace period.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Polls the child until it exits or `timeout` passes.
    fn wait_for_exit(&mut self, timeout: Duration) -> BenchResult<Option<ExitStatus>> {
        let start = Instant::now();
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.finished = true;
                return Ok(Some(status));
            }
            if start.elapsed() >= timeout {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn terminate(&self) {
        let Ok(pid) = libc::pid_t::try_from(self.child.id()) else {
            return;
        };
        // SAFETY: `pid` is our own unreaped child, so it cannot name an
        // unrelated process.
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc != 0 {
            debug!(implementation = %self.name, "SIGTERM not delivered: {}", std::io::Error::last_os_error());
        }
    }
}

impl Normalizer for ImplementationProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&mut self, formula: &str) -> BenchResult<Option<String>> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(None);
        };
        let sent = writeln!(stdin, "{formula}").and_then(|_| stdin.flush());
        match sent {
            Ok(()) => {}
            // the peer already closed its end
            Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let mut line = Vec::new();
        match read_line_until_eintr(&mut self.stdout, &mut line) {
            Ok(0) => return Ok(None),
            Ok(_) => {}
            // SIGINT while waiting for the reply
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        // invalid UTF-8 becomes U+FFFD and fails to parse as a formula
        let reply = String::from_utf8_lossy(&line);
        Ok(Some(reply.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn termination_status(&mut self) -> TerminationStatus {
        match self.wait_for_exit(self.shutdown_timeout) {
            Ok(Some(status)) => describe(status),
            Ok(None) => TerminationStatus::Running,
            Err(e) => {
                warn!(implementation = %self.name, "cannot query exit status: {e}");
                TerminationStatus::Unknown
            }
        }
    }

    fn shutdown(&mut self) -> BenchResult<()> {
        if self.finished {
            return Ok(());
        }
        drop(self.stdin.take());
        self.terminate();

        if let Some(status) = self.wait_for_exit(self.shutdown_timeout)? {
            debug!(implementation = %self.name, status = %describe(status), "normalizer exited");
            return Ok(());
        }
        warn!(
            implementation = %self.name,
            "normalizer did not exit within {:?}, killing it", self.shutdown_timeout
        );
        self.child.kill()?;
        self.child.wait()?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for ImplementationProcess {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Launches implementations as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher {
    shutdown_timeout: Option<Duration>,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        ProcessLauncher::default()
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, spec: &ImplementationSpec) -> BenchResult<Box<dyn Normalizer>> {
        let mut process = ImplementationProcess::spawn(spec)?;
        if let Some(timeout) = self.shutdown_timeout {
            process = process.with_shutdown_timeout(timeout);
        }
        Ok(Box::new(process))
    }
}

/// Like `BufRead::read_until(b'\n')`, but an `EINTR` from the underlying
/// read is returned instead of retried. Bytes read before the interruption
/// stay in `line`.
fn read_line_until_eintr<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> std::io::Result<usize> {
    let start = line.len();
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(line.len() - start);
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(end) => {
                line.extend_from_slice(&available[..=end]);
                reader.consume(end + 1);
                return Ok(line.len() - start);
            }
            None => {
                let used = available.len();
                line.extend_from_slice(available);
                reader.consume(used);
            }
        }
    }
}
