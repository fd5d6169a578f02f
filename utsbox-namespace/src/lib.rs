//! UTS namespace isolation by self re-execution
//!
//! This crate provides the two stages of the launcher:
//! - Outer stage - re-executes the running binary into a new UTS namespace
//! - Inner stage - sets the namespace-local hostname and runs the target
//! - Process executor - spawns a command with inherited stdio and waits for it

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod executor;
pub mod info;
pub mod initializer;
pub mod launcher;

pub use config::IsolationRequest;
pub use executor::{ForwardedSignals, ProcessExecutor, StdioBindings, StreamBinding, wait_for_exit};
pub use info::NamespaceInfo;
pub use initializer::{NamespaceInitializer, ensure_fresh_namespace};
pub use launcher::{ExecutablePath, Launcher, SelfExecutable};
