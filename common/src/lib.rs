//! PTAX Common Types
//!
//! Shared types for the PTAX workspace: currency codes, rate records and
//! rate sets, plus the calendar-date helpers used to address and parse the
//! daily feed.

pub mod monetary;
pub mod error;
pub mod time;

pub use monetary::*;
pub use error::*;
pub use time::*;
