//! duo-domain
//!
//! Pure domain models for the two-party expense tracker (expense records,
//! calendar periods, split and projection policies).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod expense;
pub mod period;
pub mod policy;

pub use expense::*;
pub use period::*;
pub use policy::*;

// Re-export common dependencies so consumers can rely on this crate as a façade.
pub use chrono;
pub use uuid;
