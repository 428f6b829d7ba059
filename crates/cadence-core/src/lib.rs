//! Cadence Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Cadence sequence
//! diagram engine. It includes:
//!
//! - **Identifiers**: Stable string-interned element identities ([`identifier::Id`])
//! - **Geometry**: Bounds and vertical ranges ([`geometry`] module)
//! - **Events**: The closed set of element kinds and event records ([`event`] module)
//! - **Ordering**: Semantic event ends and the graphical ordering ([`ordering`] module)

pub mod event;
pub mod geometry;
pub mod identifier;
pub mod ordering;
