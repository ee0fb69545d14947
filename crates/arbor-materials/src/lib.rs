//! Host-side material records and the copy-out assembler.
//!
//! Generated materials arrive as a name, three RGB floats, and an absolute
//! engine-side texture path. The assembler copies them into owned
//! [`Material`] records and rebases texture paths into the host asset space;
//! an unresolvable texture degrades to an untextured material with a single
//! diagnostic instead of failing the generation.

mod material;
mod resolve;

pub use material::Material;
pub use resolve::{assemble_material, TextureResolver};
