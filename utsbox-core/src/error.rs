//! Error types for utsbox

use std::io;

use thiserror::Error;

/// utsbox error types
///
/// Every variant maps to a process exit status through [`Error::exit_code`], so
/// failures in either stage surface as the final status of the outer invocation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Missing or unrecognized mode, or an empty command
    #[error("Invalid invocation: {message}")]
    Invocation {
        /// Error message
        message: String,
    },

    /// The outer stage could not re-execute itself into a new namespace
    #[error("Failed to launch {program}: {source}")]
    Launch {
        /// Executable that was being launched
        program: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Namespace-local setup failed inside the inner stage
    #[error("Namespace setup failed: {message}")]
    NamespaceSetup {
        /// Error message
        message: String,
    },

    /// The target command could not be started
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        /// Command that was being spawned
        program: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// A child process terminated abnormally
    #[error("{program} terminated by signal {signal}")]
    Runtime {
        /// Command that was running
        program: String,
        /// Terminating signal number
        signal: i32,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// System error from nix
    #[error("System error: {0}")]
    System(#[from] nix::Error),
}

impl Error {
    /// Exit status for malformed invocations, matching clap's usage errors
    pub const INVOCATION_EXIT_CODE: i32 = 2;
    /// Exit status for failures of the launcher itself
    pub const SETUP_EXIT_CODE: i32 = 125;
    /// Exit status when the target exists but cannot be executed
    pub const CANNOT_EXECUTE_EXIT_CODE: i32 = 126;
    /// Exit status when the target cannot be found
    pub const NOT_FOUND_EXIT_CODE: i32 = 127;
    /// Base added to the signal number for signal-terminated children
    pub const SIGNAL_EXIT_BASE: i32 = 128;

    /// Create an invocation error
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::Invocation {
            message: message.into(),
        }
    }

    /// Create a namespace setup error
    pub fn namespace_setup(message: impl Into<String>) -> Self {
        Self::NamespaceSetup {
            message: message.into(),
        }
    }

    /// Process exit status that reports this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Invocation { .. } => Self::INVOCATION_EXIT_CODE,
            Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Self::NOT_FOUND_EXIT_CODE
            }
            Self::Spawn { .. } => Self::CANNOT_EXECUTE_EXIT_CODE,
            Self::Runtime { signal, .. } => Self::SIGNAL_EXIT_BASE + signal,
            Self::Launch { .. } | Self::NamespaceSetup { .. } | Self::Io(_) | Self::System(_) => {
                Self::SETUP_EXIT_CODE
            }
        }
    }
}

/// Result type alias for utsbox operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_exit_code() {
        let err = Error::invocation("unknown mode 'badmode'");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Invalid invocation: unknown mode 'badmode'");
    }

    #[test]
    fn test_spawn_not_found_vs_denied() {
        let missing = Error::Spawn {
            program: "nonexistent-cmd".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let denied = Error::Spawn {
            program: "/etc/passwd".to_string(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };

        assert_eq!(missing.exit_code(), 127);
        assert_eq!(denied.exit_code(), 126);
    }

    #[test]
    fn test_runtime_exit_code() {
        let err = Error::Runtime {
            program: "sleep".to_string(),
            signal: 15,
        };
        assert_eq!(err.exit_code(), 143);
        assert!(err.to_string().contains("signal 15"));
    }

    #[test]
    fn test_setup_failures_share_exit_code() {
        let launch = Error::Launch {
            program: "/proc/self/exe".to_string(),
            source: io::Error::from_raw_os_error(libc_eperm()),
        };
        let setup = Error::namespace_setup("sethostname failed");
        let system = Error::from(nix::Error::EPERM);

        assert_eq!(launch.exit_code(), 125);
        assert_eq!(setup.exit_code(), 125);
        assert_eq!(system.exit_code(), 125);
    }

    #[test]
    fn test_launch_error_keeps_cause() {
        use std::error::Error as _;

        let err = Error::Launch {
            program: "utsbox".to_string(),
            source: io::Error::from_raw_os_error(libc_eperm()),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to launch utsbox"));
    }

    fn libc_eperm() -> i32 {
        nix::Error::EPERM as i32
    }
}
