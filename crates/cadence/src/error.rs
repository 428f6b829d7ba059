//! Error types for Cadence operations.
//!
//! Most queries of the engine are tolerant by design and degrade to empty or
//! partial results; [`CadenceError`] is only returned where a caller asked about
//! one specific element that cannot be resolved, for rejected edits, and for
//! configuration loading.

use std::io;

use thiserror::Error;

use cadence_core::identifier::Id;

/// The main error type for Cadence operations.
#[derive(Debug, Error)]
pub enum CadenceError {
    /// The element exists but is not reachable from the diagram root.
    #[error("Element `{0}` is not attached to the diagram")]
    NotAttached(Id),

    /// The model does not know the element at all.
    #[error("Unknown element `{0}`")]
    UnknownElement(Id),

    /// An edit was rejected by the in-memory model.
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CadenceError>;
