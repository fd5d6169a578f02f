//! Routes an invocation to the outer or inner stage

use tracing::debug;
use utsbox_core::{Invocation, Mode, NamespaceIdentity, Result};
use utsbox_namespace::{Launcher, NamespaceInitializer};

/// Run the stage selected by `invocation` and return the target's exit code
///
/// `verbose` is forwarded to the inner stage when re-executing.
pub async fn dispatch(invocation: Invocation, verbose: bool) -> Result<i32> {
    let (mode, command) = invocation.into_parts();
    debug!(%mode, %command, "Dispatching");

    match mode {
        Mode::Outer => {
            Launcher::for_current_executable()
                .with_verbose(verbose)
                .launch(&command)
                .await
        }
        Mode::Inner => {
            NamespaceInitializer::new(NamespaceIdentity::default())
                .run(&command)
                .await
        }
    }
}
