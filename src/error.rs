//! Error types.
//!
//! Two layers:
//!
//! - `BuildError` / `BuildErrorKind`: typed library errors raised while turning a
//!   theory block into an evaluation tree. Every one of them is fatal to the
//!   build of that run's tree and carries the offending source line number.
//! - `AppError`: the binary's error, carrying a process exit code and a
//!   human-readable message.

use thiserror::Error;

use crate::plugin::PluginError;

/// Why a theory line could not be turned into a tree node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildErrorKind {
    #[error("theory function '{0}' is undefined")]
    UndefinedKernel(String),

    #[error("'{name}' expects {expected} parameter(s), found {found}")]
    ArityMismatch {
        name: &'static str,
        expected: String,
        found: usize,
    },

    #[error("token '{0}' is not a parameter number, fun<N> or map<N>")]
    UnrecognizedToken(String),

    #[error("parameter number {number} out of range (1..={param_count})")]
    ParamOutOfRange { number: usize, param_count: usize },

    #[error("fun{0} is not defined in the FUNCTIONS block")]
    UndefinedFunction(usize),

    #[error("map{index} cannot be resolved ({reason})")]
    MapOutOfRange { index: usize, reason: String },

    #[error("user function '{type_name}' not found (module '{module}')")]
    PluginNotFound { module: String, type_name: String },

    #[error("user function '{type_name}' could not be bound: {source}")]
    PluginBindFailed {
        type_name: String,
        #[source]
        source: PluginError,
    },

    #[error("misplaced '+' term separator")]
    MisplacedSeparator,

    #[error("theory block is empty")]
    EmptyTheory,
}

/// A fatal theory-build error, located at a source line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("theory block line {line}: {kind}")]
pub struct BuildError {
    pub line: usize,
    pub kind: BuildErrorKind,
}

impl BuildError {
    pub fn new(line: usize, kind: BuildErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<BuildError> for AppError {
    fn from(err: BuildError) -> Self {
        AppError::new(2, format!("**ERROR** {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_message_names_the_line() {
        let err = BuildError::new(7, BuildErrorKind::UndefinedKernel("foo".to_string()));
        assert_eq!(
            err.to_string(),
            "theory block line 7: theory function 'foo' is undefined"
        );

        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
        assert!(app.to_string().contains("line 7"));
    }
}
