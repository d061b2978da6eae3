//! Compact persistence of ink stroke meshes.
//!
//! Every number stream of a mesh (coordinates, other attribute components, triangle indices and
//! outlines) is stored as a delta-coded [numeric run](run). The in-memory geometry lives in
//! [inkmesh_geometry], re-exported here as [geometry]; the wire messages live in [proto].
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub use inkmesh_geometry as geometry;

mod error;
pub use error::*;

pub mod format;
pub mod mesh;
pub mod partitioned;
pub mod proto;
pub mod run;

pub use format::{decode_mesh_format, encode_mesh_format};
pub use mesh::{decode_mesh, decode_mesh_using_format, encode_mesh, encode_mesh_omitting_format};
pub use partitioned::{decode_partitioned_mesh, encode_partitioned_mesh};
