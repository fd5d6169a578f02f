//! Inner stage: establish namespace identity, then run the target
//!
//! Only ever entered as the re-exec target of [`Launcher`](crate::Launcher),
//! which creates the UTS namespace before this code runs. The stage refuses to
//! touch the hostname unless its namespace differs from its parent's, so a
//! direct `inner` invocation cannot rename the host.

use nix::unistd::sethostname;
use tracing::{debug, error, info};
use utsbox_core::{Error, NamespaceIdentity, Result, TargetCommand};

use crate::executor::ProcessExecutor;
use crate::info::NamespaceInfo;

/// Sets the namespace-local hostname and runs the target command
#[derive(Debug, Clone, Default)]
pub struct NamespaceInitializer {
    identity: NamespaceIdentity,
    executor: ProcessExecutor,
}

impl NamespaceInitializer {
    /// Create an initializer assigning `identity` as the hostname
    #[must_use]
    pub fn new(identity: NamespaceIdentity) -> Self {
        Self {
            identity,
            executor: ProcessExecutor::inherited(),
        }
    }

    /// Use a specific executor for the target command
    #[must_use]
    pub fn with_executor(mut self, executor: ProcessExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Set up the namespace and run `command` to completion
    ///
    /// # Errors
    /// Returns [`Error::NamespaceSetup`] if the process is not in a fresh UTS
    /// namespace or the hostname cannot be set; target failures are reported as
    /// by [`ProcessExecutor::execute`].
    pub async fn run(&self, command: &TargetCommand) -> Result<i32> {
        info!("🔒 Running in new UTS namespace: {}", command);

        ensure_fresh_namespace()?;
        self.set_hostname()?;

        self.executor.execute(command).await
    }

    fn set_hostname(&self) -> Result<()> {
        let hostname = self.identity.as_str();
        debug!(hostname = %hostname, "Setting hostname");

        sethostname(hostname).map_err(|e| {
            error!(hostname = %hostname, error = %e, "Failed to set hostname");
            Error::namespace_setup(format!("Failed to set hostname: {e}"))
        })
    }
}

/// Fail unless the current UTS namespace differs from the parent's
///
/// # Errors
/// Returns [`Error::NamespaceSetup`] if the namespaces match or cannot be read
pub fn ensure_fresh_namespace() -> Result<()> {
    let current = NamespaceInfo::current()?;
    let parent = NamespaceInfo::parent()?;

    if current.shares_namespace_with(&parent) {
        error!(
            namespace = %current.uts,
            parent = %parent.pid,
            "Inner stage is sharing its parent's UTS namespace"
        );
        return Err(Error::namespace_setup(format!(
            "not running in a fresh UTS namespace ({} is shared with parent PID {}); \
             use `outer` to launch commands",
            current.uts, parent.pid
        )));
    }

    debug!(namespace = %current.uts, parent = %parent.uts, "Fresh UTS namespace confirmed");
    Ok(())
}
