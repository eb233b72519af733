//! HTTP handlers for the ChemTrack API

mod activity_log;
mod alert;
mod chemical;
mod health;
mod purchase_order;
mod supplier;

pub use activity_log::*;
pub use alert::*;
pub use chemical::*;
pub use health::*;
pub use purchase_order::*;
pub use supplier::*;
