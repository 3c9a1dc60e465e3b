//! Error types for invocation construction and stdin access.
//!
//! Absence of an option or environment variable is never an error; those
//! surface as `None` from the accessors.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors reported while parsing option patterns.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// Short option characters must be ASCII alphanumerics.
    #[error("Invalid short option character '{0}'")]
    InvalidShortOption(char),

    /// A `:` with no option character before it.
    #[error("Colon at position {position} does not follow an option character")]
    DanglingColon { position: usize },

    /// More than two colons after a single option.
    #[error("Option '{option}' has more than two colons")]
    TooManyColons { option: String },

    /// A long pattern with nothing left after stripping colons.
    #[error("Long option pattern '{pattern}' has an empty name")]
    EmptyLongName { pattern: String },

    /// A long name containing `=`, whitespace, or a leading `-`.
    #[error("Invalid long option name '{0}'")]
    InvalidLongName(String),
}

/// Errors that can occur when building or reading an [`Invocation`].
///
/// [`Invocation`]: crate::invocation::Invocation
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The option grammar could not be parsed.
    #[error("Option grammar error: {0}")]
    Grammar(#[from] GrammarError),

    /// Reading standard input failed.
    #[error("Failed to read standard input: {0}")]
    Input(#[source] io::Error),

    /// Standard input is not valid UTF-8.
    #[error("Standard input is not valid UTF-8: {0}")]
    InputNotUtf8(#[source] std::str::Utf8Error),

    /// Standard input did not reach end-of-stream in time.
    #[error("Standard input not drained after {}ms", .0.as_millis())]
    InputTimedOut(Duration),

    /// The background reader exited without handing the stream back.
    #[error("Standard input reader was lost before finishing")]
    InputLost,
}
