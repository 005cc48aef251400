//! User-friendly diagnostic messages.
//!
//! Fatal errors reaching the CLI are turned into a [`Diagnostic`] carrying the
//! error chain as context and, where the cause is recognizable, a suggested fix.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::util::path::PathError;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the solution file cannot be found.
    pub const NO_SOLUTION: &str = "help: Pass the path to an existing `.sln` file";

    /// Suggestion when a referenced file lives on another volume.
    pub const CROSS_ROOT: &str =
        "help: Move the referenced files onto the same volume as the solution, or exclude them with `--exclude`";

    /// Suggestion when a project file cannot be read.
    pub const UNREADABLE_PROJECT: &str =
        "help: Check the file permissions, or exclude the project from the solution";
}

/// A fatal error message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Build a diagnostic from a fatal error, walking its cause chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut diag = Diagnostic::error(err.to_string());

        for cause in err.chain().skip(1) {
            diag = diag.with_context(cause.to_string());
        }

        for cause in err.chain() {
            if let Some(path_err) = cause.downcast_ref::<PathError>() {
                if let PathError::CrossRoot { path, .. } = path_err {
                    diag = diag
                        .with_location(path.clone())
                        .with_suggestion(suggestions::CROSS_ROOT);
                }
                break;
            }
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                match io_err.kind() {
                    io::ErrorKind::NotFound => {
                        diag = diag.with_suggestion(suggestions::NO_SOLUTION);
                    }
                    io::ErrorKind::PermissionDenied => {
                        diag = diag.with_suggestion(suggestions::UNREADABLE_PROJECT);
                    }
                    _ => {}
                }
                break;
            }
        }

        diag
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let label = if color {
            "\x1b[1;31merror\x1b[0m"
        } else {
            "error"
        };

        output.push_str(&format!("{}: {}\n", label, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  caused by: {}\n", ctx));
        }

        for suggestion in &self.suggestions {
            output.push_str(&format!("  {}\n", suggestion));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
