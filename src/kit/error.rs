// SPDX-License-Identifier: MIT

//! Typed error handling for prflow-rs
//!
//! Condition evaluation has no error type: it is total and fails closed.
//! Everything that can go wrong before or around it is described here.

use thiserror::Error;

/// Top-level error type for prflow-rs
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration errors (missing env vars, malformed ruleset shape)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A rule that could not be compiled
    #[error("Invalid rule '{rule}': {message}")]
    Rule { rule: String, message: String },

    /// A condition string that could not be parsed
    #[error("Invalid condition: {0}")]
    Condition(#[from] ConditionError),

    /// Template errors outside of action execution (e.g. `check`)
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Platform transport failures
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while parsing a condition string
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConditionError {
    #[error("empty condition")]
    Empty,

    #[error("missing attribute in condition '{0}'")]
    MissingAttribute(String),

    #[error("invalid attribute name '{0}'")]
    InvalidAttribute(String),

    #[error("missing value in condition '{0}'")]
    MissingValue(String),

    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// Errors raised while compiling or rendering a message template
///
/// The Display strings are shown verbatim to users in check-run summaries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// The template source is not well-formed
    #[error("There is an error in your message: {message} at line {line}")]
    Syntax { message: String, line: usize },

    /// The template references a variable outside the namespace
    #[error("There is an error in your message, the following variable is unknown: {0}")]
    UnknownVariable(String),
}

/// Errors from the platform transport (GitHub API, etc.)
#[derive(Debug, Error)]
pub enum TransportError {
    /// API errors from the hosting platform
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Pull request not found
    #[error("Pull request #{0} not found")]
    NotFound(u64),

    /// Transport configuration errors (missing token, owner, repo)
    #[error("Transport configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a rule error
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl TemplateError {
    /// Create a syntax error at a 1-based line
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
        }
    }
}

impl TransportError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<octocrab::Error> for TransportError {
    fn from(err: octocrab::Error) -> Self {
        Self::api("github", err.to_string())
    }
}
