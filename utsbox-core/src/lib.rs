//! utsbox Core - Foundation types and error taxonomy
//!
//! This crate provides the abstractions shared by both stages of the launcher.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Invocation, Mode, NamespaceIdentity, TargetCommand};
