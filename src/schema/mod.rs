//! focuspro.snapshot.v1 input schema
//!
//! This module defines the records handed over by the data-access layer and
//! the adapter that normalizes them into the engine's single `RawEvent` type.

mod records;
mod adapter;

pub use records::*;
pub use adapter::*;
