//! Core type definitions with strong typing and validation

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::str::FromStr;

use crate::{Error, Result};

/// Stage a utsbox process plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// User-facing entry point: re-executes itself into a new UTS namespace
    Outer,
    /// Re-exec target running inside the new namespace
    Inner,
}

impl Mode {
    /// Command-line spelling of the mode
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outer => "outer",
            Self::Inner => "inner",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command executed inside the isolated namespace
///
/// The program name and arguments are passed through unmodified; they are
/// kept as raw OS strings so arguments that are not valid UTF-8 survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl TargetCommand {
    /// Create a new target command with validation
    ///
    /// # Errors
    /// Returns error if the program name is empty or contains a NUL byte
    pub fn new(program: impl Into<OsString>, args: Vec<OsString>) -> Result<Self> {
        let program = program.into();

        if program.is_empty() {
            return Err(Error::invocation("command name cannot be empty"));
        }

        if program.as_bytes().contains(&0) {
            return Err(Error::invocation("command name cannot contain NUL bytes"));
        }

        Ok(Self { program, args })
    }

    /// Build a target command from `[program, args...]`
    ///
    /// # Errors
    /// Returns error if the list is empty or the program name is invalid
    pub fn from_argv<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .ok_or_else(|| Error::invocation("missing command to run"))?;
        Self::new(program, argv.collect())
    }

    /// Program name
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Program arguments
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Hostname assigned inside a freshly created UTS namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NamespaceIdentity(String);

impl NamespaceIdentity {
    /// Marker hostname used when none is configured
    pub const DEFAULT: &'static str = "inside-container";

    /// Maximum hostname length (`HOST_NAME_MAX` on Linux)
    pub const MAX_LENGTH: usize = 64;

    /// Create a new `NamespaceIdentity` with validation
    ///
    /// # Errors
    /// Returns error if the hostname is empty, too long, or contains a NUL byte
    pub fn new(hostname: impl Into<String>) -> Result<Self> {
        let hostname = hostname.into();
        Self::validate(&hostname)?;
        Ok(Self(hostname))
    }

    fn validate(hostname: &str) -> Result<()> {
        if hostname.is_empty() {
            return Err(Error::namespace_setup("hostname cannot be empty"));
        }

        if hostname.len() > Self::MAX_LENGTH {
            return Err(Error::namespace_setup(format!(
                "hostname too long (max {} bytes)",
                Self::MAX_LENGTH
            )));
        }

        if hostname.contains('\0') {
            return Err(Error::namespace_setup("hostname cannot contain NUL bytes"));
        }

        Ok(())
    }

    /// Get the hostname as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NamespaceIdentity {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for NamespaceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NamespaceIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// A fully parsed command line: which stage to run and what to run in it
///
/// Constructed once at the program entry point and handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    mode: Mode,
    command: TargetCommand,
}

impl Invocation {
    /// Create a new invocation
    #[must_use]
    pub const fn new(mode: Mode, command: TargetCommand) -> Self {
        Self { mode, command }
    }

    /// Selected stage
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Command to run inside the namespace
    #[must_use]
    pub const fn command(&self) -> &TargetCommand {
        &self.command
    }

    /// Split into mode and command
    #[must_use]
    pub fn into_parts(self) -> (Mode, TargetCommand) {
        (self.mode, self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_spelling() {
        assert_eq!(Mode::Outer.as_str(), "outer");
        assert_eq!(Mode::Inner.to_string(), "inner");
    }

    #[test]
    fn test_target_command_from_argv() {
        let cmd = TargetCommand::from_argv(["ls", "-la", "/tmp"]).unwrap();

        assert_eq!(cmd.program(), "ls");
        assert_eq!(cmd.args(), ["-la", "/tmp"]);
        assert_eq!(cmd.to_string(), "ls -la /tmp");
    }

    #[test]
    fn test_target_command_rejects_empty() {
        assert!(matches!(
            TargetCommand::from_argv(Vec::<OsString>::new()),
            Err(Error::Invocation { .. })
        ));
        assert!(matches!(
            TargetCommand::new("", Vec::new()),
            Err(Error::Invocation { .. })
        ));
    }

    #[test]
    fn test_target_command_keeps_raw_bytes() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![0xff, b'b', b'y', b't', b'e']);
        let cmd = TargetCommand::from_argv([OsString::from("printf"), raw.clone()]).unwrap();

        assert_eq!(cmd.args(), [raw]);
        assert_eq!(cmd.to_string(), "printf \u{fffd}byte");
    }

    #[test]
    fn test_target_command_rejects_nul() {
        assert!(TargetCommand::new("ec\0ho", Vec::new()).is_err());
    }

    #[test]
    fn test_identity_default() {
        assert_eq!(NamespaceIdentity::default().as_str(), "inside-container");
    }

    #[test]
    fn test_identity_validation() {
        assert!(NamespaceIdentity::new("box-1").is_ok());
        assert!(NamespaceIdentity::new("").is_err());
        assert!(NamespaceIdentity::new("a".repeat(65)).is_err());
        assert!(NamespaceIdentity::new("a".repeat(64)).is_ok());
        assert!("bad\0name".parse::<NamespaceIdentity>().is_err());
    }

    #[test]
    fn test_invocation_parts() {
        let cmd = TargetCommand::new("hostname", Vec::new()).unwrap();

        let invocation = Invocation::new(Mode::Outer, cmd.clone());

        assert_eq!(invocation.mode(), Mode::Outer);
        assert_eq!(invocation.command(), &cmd);
        assert_eq!(invocation.into_parts(), (Mode::Outer, cmd));
    }
}
