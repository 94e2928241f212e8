//! Error types for the theme engine
//!
//! Resolution misses are not errors: a candidate name that is absent from the
//! registry is the expected "keep searching" outcome and surfaces as `Option`.
//! Only definition parsing, strict lookups, and developer misuse produce a
//! [`ThemeError`].

use thiserror::Error;

/// Errors produced by the theme engine.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// A theme name was required to exist in the registry but does not.
    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    /// A theme definition document failed to parse.
    #[error("invalid theme definition: {0}")]
    InvalidDefinition(#[from] toml::de::Error),

    /// A color token value could not be parsed as a hex color.
    #[error("invalid color value `{0}`")]
    InvalidColor(String),

    /// A scope operation needed a configuration request and none was available.
    ///
    /// Fatal in debug builds, degrades to an empty result in release builds.
    #[error("no theme request available for scope operation")]
    MissingRequest,
}
