//! Domain layer: pure domain model and shared types.
//!
//! This layer contains types that are used across multiple layers of the system
//! but do not depend on any runtime implementation details.
//!
//! Submodules:
//! - [`execution`]: control state, run status and run outcome models.
//! - [`model`]: protocol-stable types (algorithm identifiers).

pub mod execution;
pub mod model;
