use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::HarnessError;

/// What the validator had to say about one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ValidationResult {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Anything that can check a JSON file on disk.
///
/// The harness never looks at the verdict beyond printing it, so an
/// implementation only has to produce the output streams.
pub trait Validator {
    fn validate(&self, path: &Path) -> Result<ValidationResult, HarnessError>;
}

impl<V: Validator + ?Sized> Validator for &V {
    fn validate(&self, path: &Path) -> Result<ValidationResult, HarnessError> {
        (**self).validate(path)
    }
}

/// Runs an external program as `<program> [args...] <path>` and waits for it.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandValidator {
    pub fn new(program: impl Into<OsString>) -> Self {
        CommandValidator {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Human-readable command line, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Validator for CommandValidator {
    fn validate(&self, path: &Path) -> Result<ValidationResult, HarnessError> {
        tracing::debug!(command = %self.display(), file = %path.display(), "running validator");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| HarnessError::Launch {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        Ok(ValidationResult {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
