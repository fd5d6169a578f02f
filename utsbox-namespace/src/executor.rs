//! Process execution with inherited standard streams
//!
//! Both stages block on exactly one child. While waiting, `SIGTERM` and
//! `SIGHUP` received by the waiting process are forwarded to the child so a
//! terminated launcher does not leave the target running.

use std::ffi::OsStr;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::signal::unix::{Signal as SignalStream, SignalKind, signal};
use tracing::{debug, info, warn};
use utsbox_core::{Error, Result, TargetCommand};

/// Where a child's standard stream is connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamBinding {
    /// Share the parent's stream
    #[default]
    Inherit,
    /// Connect to `/dev/null`
    Null,
}

impl StreamBinding {
    fn to_stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
        }
    }
}

/// Stream bindings for a spawned child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StdioBindings {
    /// Standard input
    pub stdin: StreamBinding,
    /// Standard output
    pub stdout: StreamBinding,
    /// Standard error
    pub stderr: StreamBinding,
}

impl StdioBindings {
    /// Inherit all three streams from the parent
    #[must_use]
    pub fn inherit() -> Self {
        Self::default()
    }

    /// Discard all three streams
    #[must_use]
    pub const fn null() -> Self {
        Self {
            stdin: StreamBinding::Null,
            stdout: StreamBinding::Null,
            stderr: StreamBinding::Null,
        }
    }

    /// Build a command for `program` with these bindings applied
    pub(crate) fn command(self, program: impl AsRef<OsStr>) -> std::process::Command {
        let mut command = std::process::Command::new(program);
        command
            .stdin(self.stdin.to_stdio())
            .stdout(self.stdout.to_stdio())
            .stderr(self.stderr.to_stdio());
        command
    }
}

/// Isolation-agnostic subprocess runner
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    streams: StdioBindings,
}

impl ProcessExecutor {
    /// Create an executor with the given stream bindings
    #[must_use]
    pub const fn new(streams: StdioBindings) -> Self {
        Self { streams }
    }

    /// Create an executor whose children inherit all standard streams
    #[must_use]
    pub fn inherited() -> Self {
        Self::new(StdioBindings::inherit())
    }

    /// Run a command to completion and return its exit code
    ///
    /// # Errors
    /// Returns [`Error::Spawn`] if the command cannot be started and
    /// [`Error::Runtime`] if it is terminated by a signal.
    pub async fn execute(&self, command: &TargetCommand) -> Result<i32> {
        info!("🚀 Executing command: {}", command);

        let program = command.program().to_string_lossy();
        let signals = ForwardedSignals::install()?;

        let mut cmd = self.streams.command(command.program());
        cmd.args(command.args());

        let child = Command::from(cmd).spawn().map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

        wait_for_exit(child, &program, signals).await
    }
}

/// Termination signals relayed to a waited-for child
///
/// Install before spawning the child: a signal that arrives while spawning
/// is queued and forwarded once the child exists.
#[derive(Debug)]
pub struct ForwardedSignals {
    terminate: SignalStream,
    hangup: SignalStream,
}

impl ForwardedSignals {
    /// Start listening for `SIGTERM` and `SIGHUP`
    ///
    /// # Errors
    /// Returns error if the signal handlers cannot be registered
    pub fn install() -> Result<Self> {
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }
}

/// Wait for a spawned child, forwarding termination signals to it
///
/// # Errors
/// Returns [`Error::Runtime`] if the child is terminated by a signal.
pub async fn wait_for_exit(
    mut child: Child,
    program: &str,
    mut signals: ForwardedSignals,
) -> Result<i32> {
    let pid = child
        .id()
        .and_then(|id| i32::try_from(id).ok())
        .map(Pid::from_raw);

    debug!(program, pid = ?pid, "Waiting for child to exit");

    let wait = child.wait();
    tokio::pin!(wait);

    let status = loop {
        tokio::select! {
            status = &mut wait => break status?,
            Some(()) = signals.terminate.recv() => forward_signal(pid, Signal::SIGTERM),
            Some(()) = signals.hangup.recv() => forward_signal(pid, Signal::SIGHUP),
        }
    };

    exit_code(status, program)
}

fn forward_signal(pid: Option<Pid>, signal: Signal) {
    let Some(pid) = pid else {
        return;
    };

    warn!("Received {}, forwarding to child (PID {})", signal, pid);
    if let Err(e) = kill(pid, signal) {
        // ESRCH: the child exited between the signal and the forward
        debug!(error = %e, "Could not forward signal");
    }
}

fn exit_code(status: ExitStatus, program: &str) -> Result<i32> {
    if let Some(code) = status.code() {
        debug!(program, code, "Child exited");
        return Ok(code);
    }

    match status.signal() {
        Some(signal) => {
            warn!(program, signal, "Child terminated by signal");
            Err(Error::Runtime {
                program: program.to_string(),
                signal,
            })
        }
        None => Err(Error::Io(std::io::Error::other(format!(
            "{program} finished with unknown status {status}"
        )))),
    }
}
