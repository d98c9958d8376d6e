//! Mission sheet schema
//!
//! This module defines the fixed column layout of the mission worksheet and
//! converts between store tables and typed mission rows.

mod adapter;
mod layout;

pub use adapter::*;
pub use layout::*;
