//! Domain models for the ChemTrack inventory platform

mod activity_log;
mod alert;
mod chemical;
mod purchase_order;
mod supplier;

pub use activity_log::*;
pub use alert::*;
pub use chemical::*;
pub use purchase_order::*;
pub use supplier::*;
