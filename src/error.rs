use colored::Colorize;
use std::{
    num::{ParseFloatError, ParseIntError},
    ops::Deref,
    path::PathBuf,
};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to convert one raw string into a field's type
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parsing {0:?}: invalid syntax")]
    Bool(String),
    #[error("parsing {value:?}: {source}")]
    Int {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("parsing {value:?}: {source}")]
    Float {
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("parsing time {value:?}: {source}")]
    Time {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("element {index} {value:?}: {source}")]
    Element {
        index: usize,
        value: String,
        #[source]
        source: Box<ParseError>,
    },
    #[error("parsing {value:?}: {reason}")]
    Invalid { value: String, reason: String },
    #[error(transparent)]
    Custom(BoxError),
}

impl ParseError {
    pub fn invalid(value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Structural problem with a destination type, found before any variable is read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    #[error("field cannot be required and have a default")]
    RequiredWithDefault,
    #[error("default cannot be empty")]
    EmptyDefault,
    #[error("nested structs can't be required")]
    RequiredNested,
    #[error("nested structs can't have a default")]
    DefaultOnNested,
    #[error("destination field cannot be a pointer: {type_name}")]
    Pointer { type_name: String },
    #[error("unsupported destination type: {type_name}")]
    Unsupported { type_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {path:?}: {kind}")]
pub struct SchemaError {
    /// Dotted path of Rust field names, e.g. `database.pool_size`
    pub path: String,
    #[source]
    pub kind: SchemaErrorKind,
}

#[derive(Debug, Error)]
pub enum ValueErrorKind {
    #[error("required field is not set")]
    Required,
    #[error(transparent)]
    Invalid(ParseError),
    #[error("setting default value {default:?}: {source}")]
    Default {
        default: String,
        #[source]
        source: ParseError,
    },
}

/// One variable that could not be satisfied
#[derive(Debug, Error)]
#[error("env var {env_var}: {kind}")]
pub struct ConfigValueError {
    pub env_var: String,
    #[source]
    pub kind: ValueErrorKind,
}

impl ConfigValueError {
    pub fn new(env_var: impl Into<String>, kind: ValueErrorKind) -> Self {
        Self {
            env_var: env_var.into(),
            kind,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.kind, ValueErrorKind::Required)
    }
}

/// Every value error from one decode pass, in field declaration order
#[derive(Debug, Error)]
#[error("one or more config errors have occurred: {}", join_errors(.0))]
pub struct ValueErrors(pub Vec<ConfigValueError>);

fn join_errors(errors: &[ConfigValueError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValueErrors {
    pub fn env_vars(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.env_var.as_str()).collect()
    }
}

impl Deref for ValueErrors {
    type Target = [ConfigValueError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for ValueErrors {
    type Item = ConfigValueError;
    type IntoIter = std::vec::IntoIter<ConfigValueError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("reading env file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid line in env file {}: {line}", path.display())]
    Line { path: PathBuf, line: String },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid config struct: {0}")]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Values(#[from] ValueErrors),
    #[error("not all defined environment variables used in config: {}", .0.join(", "))]
    Unused(Vec<String>),
}

impl DecodeError {
    /// Value errors of the pass, empty for schema and unused-variable errors
    pub fn value_errors(&self) -> &[ConfigValueError] {
        match self {
            Self::Values(errors) => &errors.0,
            _ => &[],
        }
    }
}

/// Format value errors one per line for a terminal
pub fn format_config_errors(errors: &[ConfigValueError]) -> String {
    let error_summary = errors
        .iter()
        .map(|e| format!("  - {}: {}", e.env_var.magenta().bold(), e.kind))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Configuration failed with {} error(s):\n{}\n",
        errors.len().to_string().yellow().bold(),
        error_summary
    )
}
