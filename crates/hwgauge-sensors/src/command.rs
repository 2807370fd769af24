//! External command execution.

use std::process::Command;

use tracing::debug;

use crate::{Error, Result};

/// Runs an external program and returns its standard output.
///
/// The command-backed readers go through this trait so they can be fed
/// canned output.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` and returns stdout as text.
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Runs commands through `std::process::Command` in the C locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommand;

impl SystemCommand {
    /// Creates a new system command runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommand {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!("Running {} {}", program, args.join(" "));

        // Decimal separators in `top` output follow LC_NUMERIC
        let output = Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .output()
            .map_err(|source| Error::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: program.to_string(),
                status: output.status.to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
