use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

use spdlog::{debug, error};

use crate::error::{PublishError, Result};

/// A program invocation, kept as data so it can be logged and replaced in tests
#[derive(Debug, Clone, PartialEq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(program: &str) -> Self {
        ShellCommand {
            program: program.to_string(),
            args: vec![],
            current_dir: None,
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item=S>, S: Into<String>
    {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }
}

impl Display for ShellCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

pub trait CommandRunner {
    /// Runs the command to completion. A nonzero exit is an error.
    fn run(&self, cmd: &ShellCommand) -> Result<()>;
}

/// Runs commands on this machine with the terminal attached
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ShellCommand) -> Result<()> {
        debug!("Running {}", cmd);

        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(ref dir) = cmd.current_dir {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|e| {
            error!("Could not start {}: {}", cmd.program, e);
            PublishError::CommandFailed { command: cmd.to_string(), code: None }
        })?;

        if !status.success() {
            error!("{} exited with {}", cmd, status);
            return Err(PublishError::CommandFailed { command: cmd.to_string(), code: status.code() });
        }

        Ok(())
    }
}
