//! Macros shared by the inkmesh crates.

pub mod macros;
