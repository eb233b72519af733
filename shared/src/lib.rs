//! Shared types and domain rules for the ChemTrack inventory platform
//!
//! This crate holds the entities, enums and pure business rules (status
//! derivation, alert conditions, order totals) used by the backend server.
//! Nothing in here performs I/O.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
