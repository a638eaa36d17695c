//! Subprocess execution utilities.
//!
//! Every external program (qmake, make) goes through a [`ProcessRunner`].
//! A non-zero exit status is an ordinary return value; only a failure to
//! start the program at all is reported as a [`ProcessError`].

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use thiserror::Error;

/// Description of a single subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable for this invocation only.
    ///
    /// The parent process environment is never modified.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the environment overrides.
    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Get the working directory, if one was set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Display the command for messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Exit status and captured output of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output (empty when streamed).
    pub stdout: String,
    /// Captured standard error (empty when streamed).
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for ProcessOutput {
    fn from(output: Output) -> Self {
        ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// The program could not be run at all.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch `{program}`")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    fn launch(cmd: &ProcessBuilder, source: io::Error) -> Self {
        ProcessError::Launch {
            program: cmd.get_program().display().to_string(),
            source,
        }
    }
}

/// How a runner treats subprocess output for build steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Buffer stdout/stderr and return them.
    #[default]
    Captured,
    /// Pass output straight through to the terminal.
    Streamed,
}

/// Executes external programs.
pub trait ProcessRunner {
    /// Run a build step, handling output according to the runner's mode.
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError>;

    /// Run a query whose output must be inspected. Always captures.
    fn capture(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError>;

    /// Whether [`ProcessRunner::run`] passes output through live.
    fn streams_output(&self) -> bool {
        false
    }
}

/// Runner that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    mode: OutputMode,
}

impl SystemRunner {
    pub fn new(mode: OutputMode) -> Self {
        SystemRunner { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    fn stream(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        let status = cmd
            .build_command()
            .stdin(Stdio::inherit())
            .status()
            .map_err(|e| ProcessError::launch(cmd, e))?;

        Ok(ProcessOutput {
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!("running `{}`", cmd.display_command());
        match self.mode {
            OutputMode::Captured => self.capture(cmd),
            OutputMode::Streamed => self.stream(cmd),
        }
    }

    fn capture(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        let output = cmd
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ProcessError::launch(cmd, e))?;

        Ok(output.into())
    }

    fn streams_output(&self) -> bool {
        self.mode == OutputMode::Streamed
    }
}
