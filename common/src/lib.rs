//! EuroFX Common Types
//!
//! Shared types used across EuroFX: currency codes, monetary amounts and
//! base-relative rate tables.

pub mod monetary;
pub mod rates;
pub mod error;

pub use monetary::*;
pub use rates::*;
pub use error::*;
