//! Operator-facing output.
//!
//! All status lines go to stderr as `{status:>12} {message}`, colored when
//! stderr is a terminal. While a buffered subprocess runs, a spinner keeps
//! the operator informed; in verbose mode the subprocess output is streamed
//! instead and no spinner is drawn.

use std::fmt::Display;
use std::fmt;
use std::io::{self, IsTerminal};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Status messages and spinners.
    #[default]
    Normal,
    /// Status messages; subprocess output streamed live.
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status words for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Found,
    Installed,
    Finished,

    // In-progress statuses (cyan)
    Checking,
    Detecting,
    Generating,
    Cleaning,
    Compiling,
    Installing,

    // Info statuses (blue)
    Using,

    // Warning statuses (yellow)
    Skipped,
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Found => "Found",
            Status::Installed => "Installed",
            Status::Finished => "Finished",
            Status::Checking => "Checking",
            Status::Detecting => "Detecting",
            Status::Generating => "Generating",
            Status::Cleaning => "Cleaning",
            Status::Compiling => "Compiling",
            Status::Installing => "Installing",
            Status::Using => "Using",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Found | Status::Installed | Status::Finished => "\x1b[1;32m",
            Status::Checking
            | Status::Detecting
            | Status::Generating
            | Status::Cleaning
            | Status::Compiling
            | Status::Installing => "\x1b[1;36m",
            Status::Using => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
    interactive: bool,
    /// Spinner currently drawn on stderr; other output is printed around it
    active: Mutex<Option<ProgressBar>>,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("verbosity", &self.verbosity)
            .field("use_color", &self.use_color)
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl Shell {
    /// Create a new shell.
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let interactive = io::stderr().is_terminal();
        let use_color = match color {
            ColorChoice::Auto => interactive,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
            interactive,
            active: Mutex::new(None),
        }
    }

    /// Shell that only prints errors, for tests and embedding.
    pub fn quiet() -> Self {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Print a status message. In quiet mode only errors are printed.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }

        let line = format!("{} {}", self.format_status(status), msg);
        self.write_stderr(|| eprintln!("{}", line));
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Replay captured subprocess output, indented under the last status line.
    pub fn dump_output(&self, output: &str) {
        if output.is_empty() {
            return;
        }

        self.write_stderr(|| {
            for line in output.lines() {
                eprintln!("{:width$} {}", "", line, width = STATUS_WIDTH);
            }
        });
    }

    /// Print with the active spinner, if any, hidden for the duration.
    fn write_stderr(&self, print: impl FnOnce()) {
        let active = self.active.lock().ok().and_then(|slot| slot.clone());
        match active {
            Some(pb) => pb.suspend(print),
            None => print(),
        }
    }

    #[cfg(test)]
    fn has_spinner(&self) -> bool {
        self.active.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();

        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Start a spinner for a long-running buffered step.
    ///
    /// The status line is always printed; the animated spinner is only drawn
    /// on an interactive, non-verbose, non-quiet terminal.
    pub fn spinner(&self, status: Status, msg: impl Display) -> Spinner<'_> {
        let msg = msg.to_string();
        self.status(status, &msg);

        let pb = if self.interactive && self.verbosity == Verbosity::Normal {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
            {
                pb.set_style(style);
            }
            pb.set_message("please wait");
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        if let (Some(pb), Ok(mut slot)) = (&pb, self.active.lock()) {
            *slot = Some(pb.clone());
        }

        Spinner { shell: self, pb }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// Spinner handle; cleared when dropped.
pub struct Spinner<'a> {
    shell: &'a Shell,
    pb: Option<ProgressBar>,
}

impl Drop for Spinner<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.pb.take() {
            if let Ok(mut slot) = self.shell.active.lock() {
                *slot = None;
            }
            pb.finish_and_clear();
        }
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_modes() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Never);
        assert!(!shell.is_quiet());
        assert!(!shell.is_verbose());

        assert!(Shell::quiet().is_quiet());
        assert!(Shell::new(Verbosity::Verbose, ColorChoice::Never).is_verbose());
    }

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("ALWAYS".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("sometimes".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Never);
        assert_eq!(shell.format_status(Status::Compiling), "   Compiling");

        assert_eq!(shell.format_status(Status::Warning), "     Warning");

        let colored = Shell::new(Verbosity::Normal, ColorChoice::Always);
        let formatted = colored.format_status(Status::Error);
        assert!(formatted.starts_with("\x1b[1;31m"));
        assert!(formatted.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_output_while_spinner_active() {
        let shell = Shell {
            interactive: true,
            ..Shell::new(Verbosity::Normal, ColorChoice::Never)
        };

        let spinner = shell.spinner(Status::Compiling, "src");
        assert!(shell.has_spinner());
        shell.dump_output("main.cpp:1: error: expected ';'\n");
        shell.warn("still drawing");

        drop(spinner);
        assert!(!shell.has_spinner());
        shell.dump_output("after");
    }

    #[test]
    fn test_no_spinner_when_not_interactive() {
        let shell = Shell::quiet();
        let _spinner = shell.spinner(Status::Compiling, "src");
        assert!(!shell.has_spinner());
    }
}
