//! Test utilities and mocks for qtbuild unit tests.
//!
//! [`MockRunner`] stands in for real subprocesses. Commands are matched on
//! the program's file name followed by its arguments (`"make -j4"`), so
//! expectations do not depend on where a fake executable lives.
//!
//! # Example
//!
//! ```rust,ignore
//! let runner = MockRunner::new()
//!     .expect("qmake-qt5 -query QT_VERSION", MockProcessOutput::success("5.15.2\n"))
//!     .expect_with(CommandExpectation::exact("make -j4", MockProcessOutput::success("")).creates("app"));
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::util::process::{ProcessBuilder, ProcessError, ProcessOutput, ProcessRunner};

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

impl From<MockProcessOutput> for ProcessOutput {
    fn from(output: MockProcessOutput) -> Self {
        ProcessOutput {
            code: Some(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Pattern for matching commands in MockRunner.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
    /// Files created in the working directory when matched.
    pub creates: Vec<String>,
    /// Simulate a program that cannot be started.
    pub launch_failure: bool,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
            creates: Vec::new(),
            launch_failure: false,
        }
    }

    /// Expectation for an exact command string.
    pub fn exact(cmd: &str, output: MockProcessOutput) -> Self {
        CommandExpectation::new(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Create `file` in the invocation's working directory when matched.
    pub fn creates(mut self, file: &str) -> Self {
        self.creates.push(file.to_string());
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

/// A command the mock was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program file name and arguments, space separated.
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    /// Whether the call went through `capture` rather than `run`.
    pub captured: bool,
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<RecordedCall>,
    default_output: Option<MockProcessOutput>,
}

/// Mock process runner.
///
/// Unmatched commands fail to launch unless a default output is set.
#[derive(Debug, Default)]
pub struct MockRunner {
    state: Mutex<MockState>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(self, cmd: &str, output: MockProcessOutput) -> Self {
        self.expect_with(CommandExpectation::exact(cmd, output))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(self, prefix: &str, output: MockProcessOutput) -> Self {
        self.expect_with(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command that cannot be started.
    pub fn expect_launch_failure(self, cmd: &str) -> Self {
        let mut expectation = CommandExpectation::exact(cmd, MockProcessOutput::default());
        expectation.launch_failure = true;
        self.expect_with(expectation)
    }

    /// Add a custom expectation.
    pub fn expect_with(self, expectation: CommandExpectation) -> Self {
        self.lock().expectations.push(expectation);
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(self, output: MockProcessOutput) -> Self {
        self.lock().default_output = Some(output);
        self
    }

    /// Get all calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Get the command strings of all calls made so far.
    pub fn commands(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.command.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn execute(&self, cmd: &ProcessBuilder, captured: bool) -> Result<ProcessOutput, ProcessError> {
        let command = command_key(cmd);
        let mut state = self.lock();

        state.calls.push(RecordedCall {
            command: command.clone(),
            cwd: cmd.get_cwd().map(Path::to_path_buf),
            env: cmd.get_env().to_vec(),
            captured,
        });

        let matched = state
            .expectations
            .iter_mut()
            .find(|exp| exp.pattern.matches(&command) && exp.available())
            .map(|exp| {
                exp.used += 1;
                exp.clone()
            });

        let Some(expectation) = matched else {
            return match state.default_output.clone() {
                Some(output) => Ok(output.into()),
                None => Err(launch_error(&command)),
            };
        };

        if expectation.launch_failure {
            return Err(launch_error(&command));
        }

        let dir = cmd.get_cwd().map(Path::to_path_buf).unwrap_or_default();
        for file in &expectation.creates {
            fs::write(dir.join(file), "").map_err(|source| ProcessError::Launch {
                program: command.clone(),
                source,
            })?;
        }

        Ok(expectation.output.into())
    }
}

impl ProcessRunner for MockRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        self.execute(cmd, false)
    }

    fn capture(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        self.execute(cmd, true)
    }
}

fn command_key(cmd: &ProcessBuilder) -> String {
    let program = cmd
        .get_program()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    std::iter::once(program)
        .chain(cmd.get_args().iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn launch_error(command: &str) -> ProcessError {
    ProcessError::Launch {
        program: command.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "unexpected command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_runner_matches_and_records() {
        let tmp = TempDir::new().unwrap();
        let runner = MockRunner::new()
            .expect_with(
                CommandExpectation::exact("make -j4", MockProcessOutput::success("ok"))
                    .times(1)
                    .creates("app"),
            )
            .expect_prefix("make", MockProcessOutput::failure(2, "boom"));

        let cmd = ProcessBuilder::new("/usr/bin/make").arg("-j4").cwd(tmp.path());
        let first = runner.run(&cmd).unwrap();
        assert!(first.success());
        assert!(tmp.path().join("app").exists());

        let second = runner.capture(&cmd).unwrap();
        assert_eq!(second.code, Some(2));

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command, "make -j4");
        assert_eq!(calls[0].cwd.as_deref(), Some(tmp.path()));
        assert!(!calls[0].captured);
        assert!(calls[1].captured);
    }

    #[test]
    fn test_unexpected_command_fails_to_launch() {
        let runner = MockRunner::new();
        assert!(runner.run(&ProcessBuilder::new("qmake")).is_err());

        let runner = MockRunner::new().set_default(MockProcessOutput::success(""));
        assert!(runner.run(&ProcessBuilder::new("qmake")).unwrap().success());
    }
}
