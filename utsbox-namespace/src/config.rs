//! Isolation request configuration

use nix::sched::CloneFlags;

/// Namespace kinds to create for a spawned child
///
/// Attached to a spawn request and consumed once by the kernel when the child
/// is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationRequest {
    /// Create a new UTS namespace (hostname)
    pub uts: bool,
}

impl Default for IsolationRequest {
    fn default() -> Self {
        Self { uts: true }
    }
}

impl IsolationRequest {
    /// Request a new UTS namespace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request no new namespaces; the child shares the parent's
    #[must_use]
    pub const fn none() -> Self {
        Self { uts: false }
    }

    /// Convert to clone flags for unshare(2)
    #[must_use]
    pub fn to_clone_flags(&self) -> CloneFlags {
        let mut flags = CloneFlags::empty();

        if self.uts {
            flags |= CloneFlags::CLONE_NEWUTS;
        }

        flags
    }

    /// Check if any namespaces are requested
    #[must_use]
    pub const fn has_any(&self) -> bool {
        self.uts
    }

    /// Get list of requested namespace names
    #[must_use]
    pub fn enabled_namespaces(&self) -> Vec<&'static str> {
        let mut namespaces = Vec::new();

        if self.uts {
            namespaces.push("uts");
        }

        namespaces
    }
}
