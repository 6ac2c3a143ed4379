//! Override Engine Error Hierarchy
//!
//! Defines error types for the override resolution engine, categorized by
//! the layer that raises them: identity construction/parsing, cache
//! operations, and record sources.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Identity construction and pattern parsing failures
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Override cache operation failures
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Record source loading failures
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Raised while constructing a `ComponentIdentity` or parsing one from its
/// canonical textual form. Parse variants carry the raw input so a bad
/// record can be attributed in diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("component name cannot be empty")]
    EmptyName,

    /// Version attribute is not four dot-separated ordinals
    #[error("invalid version `{value}` in identity pattern `{raw}`")]
    InvalidVersion { raw: String, value: String },

    /// Public key token is not 16 hex digits (or `null`)
    #[error("invalid public key token `{value}` in identity pattern `{raw}`")]
    InvalidPublicKeyToken { raw: String, value: String },

    /// Attribute segment is not `Key=Value`
    #[error("malformed attribute `{segment}` in identity pattern `{raw}`")]
    MalformedAttribute { raw: String, segment: String },

    /// Attribute key other than Version/Culture/PublicKeyToken
    #[error("unknown attribute `{attribute}` in identity pattern `{raw}`")]
    UnknownAttribute { raw: String, attribute: String },

    /// Same attribute appears twice in one pattern
    #[error("duplicate attribute `{attribute}` in identity pattern `{raw}`")]
    DuplicateAttribute { raw: String, attribute: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Any operation other than `dispose` itself, invoked after disposal.
    /// Fatal to the call; the cache must be re-created.
    #[error("override cache has been disposed")]
    Disposed,

    /// Facility id outside the 11-bit range
    #[error("facility id {value} outside valid range 0..={max}", max = crate::MAX_FACILITY_ID)]
    FacilityOutOfRange { value: u16 },

    /// `end_update` without a matching `begin_update`
    #[error("end_update called without a matching begin_update")]
    UnbalancedEndUpdate,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Source file unreadable or structurally unparseable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A single record carries a malformed identity pattern. Never reaches
    /// the cache; surfaced to the caller with the offending raw string.
    #[error("override record `{name}` is malformed")]
    Record {
        name: String,
        #[source]
        source: IdentityError,
    },
}

// ============== Conversion Implementations ============== //
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Source(SourceError::Config(e))
    }
}
