//! # Fluid Rules
//!
//! Shared vocabulary for the Vessel organ simulation: what a fluid is, how
//! a mixture of fluids is measured, and what an object placed inside an organ
//! must expose. This crate holds no organ logic.

pub mod entities;
pub mod error;
pub mod fluids;
pub mod mixture;

pub use entities::*;
pub use error::*;
pub use fluids::*;
pub use mixture::*;
