//! UTS namespace inspection

use std::fmt;
use std::fs;

use nix::unistd::{Pid, getpid, getppid};
use utsbox_core::{Error, Result};

/// Identity of the UTS namespace a process belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
    /// Process the namespace was read from
    pub pid: Pid,
    /// UTS namespace ID, e.g. `uts:[4026531838]`
    pub uts: String,
}

impl NamespaceInfo {
    /// Get the UTS namespace of the current process
    ///
    /// # Errors
    /// Returns error if `/proc/self/ns/uts` cannot be read
    pub fn current() -> Result<Self> {
        Self::for_pid(getpid())
    }

    /// Get the UTS namespace of the parent process
    ///
    /// # Errors
    /// Returns error if the parent's namespace link cannot be read
    pub fn parent() -> Result<Self> {
        Self::for_pid(getppid())
    }

    /// Get the UTS namespace for a specific PID
    ///
    /// # Errors
    /// Returns error if reading the namespace link fails
    pub fn for_pid(pid: Pid) -> Result<Self> {
        let path = format!("/proc/{pid}/ns/uts");

        let uts = fs::read_link(&path)
            .map(|p| p.to_string_lossy().into_owned())
            .map_err(|e| {
                Error::namespace_setup(format!("Failed to read UTS namespace of PID {pid}: {e}"))
            })?;

        Ok(Self { pid, uts })
    }

    /// Check whether both processes are members of the same UTS namespace
    #[must_use]
    pub fn shares_namespace_with(&self, other: &Self) -> bool {
        self.uts == other.uts
    }
}

impl fmt::Display for NamespaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID {}: {}", self.pid, self.uts)
    }
}
