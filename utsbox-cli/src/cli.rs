//! CLI argument definitions

use std::ffi::OsString;

use clap::{Parser, Subcommand};
use utsbox_core::{Invocation, Mode, Result, TargetCommand};

#[derive(Parser, Debug)]
#[command(name = "utsbox")]
#[command(about = "Run a command with an isolated hostname", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command in a new UTS namespace
    Outer {
        /// Command to run, followed by its arguments
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND",
            value_parser = clap::value_parser!(OsString)
        )]
        command: Vec<OsString>,
    },

    /// Re-exec target inside the new namespace (internal)
    #[command(hide = true)]
    Inner {
        /// Command to run, followed by its arguments
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND",
            value_parser = clap::value_parser!(OsString)
        )]
        command: Vec<OsString>,
    },
}

impl Commands {
    /// Build the invocation handed to the dispatcher
    pub fn into_invocation(self) -> Result<Invocation> {
        let (mode, argv) = match self {
            Self::Outer { command } => (Mode::Outer, command),
            Self::Inner { command } => (Mode::Inner, command),
        };

        Ok(Invocation::new(mode, TargetCommand::from_argv(argv)?))
    }
}
