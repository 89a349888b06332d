//! Utilities.
pub mod test;
