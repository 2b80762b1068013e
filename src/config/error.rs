use std::fmt;

use thiserror::Error;

/// Scalar type a configuration value was expected to parse as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Floating point number.
    Float,
    /// `true` / `false`.
    Bool,
    /// Free-form string.
    Str,
    /// Strategy name resolved against a closed set of known strategies.
    Name,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "string",
            Self::Name => "name",
        };
        f.write_str(name)
    }
}

/// Errors raised by the configuration-source layer.
///
/// Policy construction never invents errors of its own; it only propagates
/// these when a configured value cannot be read as the type its key demands.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A configured value failed to parse as its key's scalar type.
    #[error("invalid {kind} value for `{key}`: {value:?}")]
    Parse {
        /// Configuration key.
        key: String,
        /// Raw configured value.
        value: String,
        /// Expected type.
        kind: ValueKind,
    },
    /// No window factory is registered under the configured name.
    #[error("unknown compaction window factory `{0}`")]
    UnknownWindowFactory(String),
    /// The configured window or store policy name is not a known strategy.
    #[error("unknown compaction policy `{0}`")]
    UnknownPolicy(String),
}
