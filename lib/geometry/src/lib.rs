#![doc = include_str!("../README.md")]

mod component;
pub use component::*;

mod error;
pub use error::*;

pub mod format;
pub use format::*;

pub mod packing;
pub use packing::{AttributeCodingParams, ComponentCodingParams};

mod mesh;
pub use mesh::*;

mod partitioned;
pub use partitioned::*;
