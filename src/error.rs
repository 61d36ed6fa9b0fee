//! Error types for umbra transforms.

use thiserror::Error;

/// Errors that can occur while rewriting declaration values.
///
/// Unresolvable colors are deliberately not an error: a color the resolver
/// cannot evaluate at build time degrades to a runtime `color-mix()`
/// expression instead. Malformed syntax (mismatched parentheses, unknown
/// function names) is left as literal text; only recognized functions with
/// invalid arguments fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid length: {0}")]
    InvalidLength(String),

    #[error("Invalid alpha value: {0}")]
    InvalidAlpha(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
