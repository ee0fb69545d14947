//! Host-side mesh records and the copy-out assembler.
//!
//! The generator returns meshes as flat float buffers in its own coordinate
//! space; this crate validates and copies them into owned [`Mesh`] records,
//! mapping positions back into the caller's reference frame and correcting
//! the normals for the generator's differing handedness.

mod assemble;
mod mesh;

pub use assemble::{assemble_mesh, AssembleError};
pub use mesh::{Mesh, SubMesh};
