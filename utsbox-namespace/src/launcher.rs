//! Outer stage: re-execute the current binary inside new namespaces

use std::ffi::OsString;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;

use nix::sched::unshare;
use tokio::process::Command;
use tracing::{debug, info};
use utsbox_core::{Error, Mode, Result, TargetCommand};

use crate::config::IsolationRequest;
use crate::executor::{ForwardedSignals, StdioBindings, wait_for_exit};

/// Source of the path used to re-execute the running program
pub trait ExecutablePath {
    /// Path of the executable image to re-launch
    ///
    /// # Errors
    /// Returns error if the path cannot be determined
    fn current_executable_path(&self) -> io::Result<PathBuf>;
}

/// Resolves the currently running executable through the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfExecutable;

impl ExecutablePath for SelfExecutable {
    fn current_executable_path(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }
}

/// Re-launches the program as its inner stage in freshly created namespaces
#[derive(Debug, Clone)]
pub struct Launcher<E = SelfExecutable> {
    executable: E,
    isolation: IsolationRequest,
    streams: StdioBindings,
    verbose: bool,
}

impl Launcher<SelfExecutable> {
    /// Launcher for the running binary with a new UTS namespace
    #[must_use]
    pub fn for_current_executable() -> Self {
        Self::new(SelfExecutable)
    }
}

impl<E: ExecutablePath> Launcher<E> {
    /// Create a launcher that re-executes `executable`
    #[must_use]
    pub fn new(executable: E) -> Self {
        Self {
            executable,
            isolation: IsolationRequest::default(),
            streams: StdioBindings::inherit(),
            verbose: false,
        }
    }

    /// Set the namespaces requested for the child
    #[must_use]
    pub fn with_isolation(mut self, isolation: IsolationRequest) -> Self {
        self.isolation = isolation;
        self
    }

    /// Set the child's stream bindings
    #[must_use]
    pub fn with_streams(mut self, streams: StdioBindings) -> Self {
        self.streams = streams;
        self
    }

    /// Pass `--verbose` on to the inner stage
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Arguments passed to the re-executed image: `[-v] inner <program> <args...>`
    #[must_use]
    pub fn reexec_args(&self, command: &TargetCommand) -> Vec<OsString> {
        let mut args = Vec::with_capacity(command.args().len() + 3);
        if self.verbose {
            args.push(OsString::from("-v"));
        }
        args.push(OsString::from(Mode::Inner.as_str()));
        args.push(command.program().to_os_string());
        args.extend(command.args().iter().cloned());
        args
    }

    /// Re-execute the program as the inner stage and wait for it
    ///
    /// # Errors
    /// Returns [`Error::Launch`] if the child cannot be spawned (including
    /// missing privilege to create the namespace) and [`Error::Runtime`] if the
    /// child is terminated by a signal.
    pub async fn launch(&self, command: &TargetCommand) -> Result<i32> {
        info!("📦 Running {}", command);

        let path = self
            .executable
            .current_executable_path()
            .map_err(|source| Error::Launch {
                program: "current executable".to_string(),
                source,
            })?;
        let program = path.display().to_string();
        let signals = ForwardedSignals::install()?;

        let mut cmd = self.streams.command(&path);
        cmd.args(self.reexec_args(command));

        if self.isolation.has_any() {
            let flags = self.isolation.to_clone_flags();
            debug!(namespaces = ?self.isolation.enabled_namespaces(), "Requesting namespaces for child");

            // SAFETY: the hook runs between fork and exec and only issues the
            // unshare(2) syscall, which neither allocates nor takes locks.
            unsafe {
                cmd.pre_exec(move || unshare(flags).map_err(io::Error::from));
            }
        }

        let child = Command::from(cmd).spawn().map_err(|source| Error::Launch {
            program: program.clone(),
            source,
        })?;

        debug!(program = %program, pid = ?child.id(), "Re-executed into new namespace");

        wait_for_exit(child, &program, signals).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPath(&'static str);

    impl ExecutablePath for FixedPath {
        fn current_executable_path(&self) -> io::Result<PathBuf> {
            Ok(PathBuf::from(self.0))
        }
    }

    struct Unresolvable;

    impl ExecutablePath for Unresolvable {
        fn current_executable_path(&self) -> io::Result<PathBuf> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn command(argv: &[&str]) -> TargetCommand {
        TargetCommand::from_argv(argv.iter().copied()).unwrap()
    }

    #[test]
    fn test_reexec_args() {
        let launcher = Launcher::for_current_executable();
        let args = launcher.reexec_args(&command(&["echo", "hello", "-n"]));
        assert_eq!(args, ["inner", "echo", "hello", "-n"]);
    }

    #[test]
    fn test_reexec_args_verbose() {
        let launcher = Launcher::for_current_executable().with_verbose(true);
        let args = launcher.reexec_args(&command(&["hostname"]));
        assert_eq!(args, ["-v", "inner", "hostname"]);
    }

    #[test]
    fn test_reexec_args_keep_raw_bytes() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![0xff, b'x']);
        let cmd = TargetCommand::from_argv([OsString::from("printf"), raw.clone()]).unwrap();
        let args = Launcher::for_current_executable().reexec_args(&cmd);

        assert_eq!(args[2], raw);
    }

    #[test]
    fn test_default_isolation_is_uts() {
        let launcher = Launcher::for_current_executable();
        assert!(launcher.isolation.uts);
        assert!(!launcher.verbose);
    }

    #[test]
    fn test_self_executable_resolves() {
        let path = SelfExecutable.current_executable_path().unwrap();
        assert!(path.is_absolute());
    }

    #[tokio::test]
    async fn test_launch_propagates_exit_code() {
        let launcher = Launcher::new(FixedPath("false"))
            .with_isolation(IsolationRequest::none())
            .with_streams(StdioBindings::null());

        assert_eq!(launcher.launch(&command(&["echo", "hi"])).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_launch_success() {
        let launcher = Launcher::new(FixedPath("true"))
            .with_isolation(IsolationRequest::none())
            .with_streams(StdioBindings::null());

        assert_eq!(launcher.launch(&command(&["hostname"])).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_executable_is_launch_error() {
        let launcher = Launcher::new(FixedPath("/nonexistent/utsbox"))
            .with_isolation(IsolationRequest::none())
            .with_streams(StdioBindings::null());

        let err = launcher.launch(&command(&["echo"])).await.unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
        assert_eq!(err.exit_code(), 125);
    }

    #[tokio::test]
    async fn test_unresolvable_executable_is_launch_error() {
        let launcher = Launcher::new(Unresolvable).with_streams(StdioBindings::null());

        let err = launcher.launch(&command(&["echo"])).await.unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
    }
}
