//! Error types for content operations.
//!
//! Parsing and rendering are fail-open by design: malformed captured
//! content degrades, it never errors. `ClipError` covers the places a
//! caller can actually hold something wrong: the wire boundary, name and
//! id lookups, and renderer plumbing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipError {
    /// Malformed wire shape (unknown tag, missing field, mistyped flag).
    #[error("structural error: {0}")]
    Structural(String),
    /// Renderer infrastructure failure.
    #[error("render error: {0}")]
    Render(String),
    /// No capability record registered for this destination id.
    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),
    /// No renderer registered under this name.
    #[error("unknown renderer '{0}'")]
    UnknownRenderer(String),
}
