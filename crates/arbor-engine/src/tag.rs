//! Raw compound type tags reported by the boundary.
//!
//! The engine encodes an attribute's type as OR'd capability flags: a
//! directory, file, or color attribute is structurally a string attribute
//! with an extra flag set, and an enum attribute carries the flag of its
//! underlying scalar. The raw representation never crosses the marshaller;
//! `arbor-attrs` decodes it into a closed kind enumeration once.

use bitflags::bitflags;

bitflags! {
    /// Compound attribute type tag as reported by `GenerationEngine::attribute_tag`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RawAttrTag: u32 {
        const BOOL      = 1 << 0;
        const FLOAT     = 1 << 1;
        const STRING    = 1 << 2;
        const ENUM      = 1 << 3;
        const DIRECTORY = 1 << 4;
        const FILE      = 1 << 5;
        const COLOR     = 1 << 6;
    }
}

impl RawAttrTag {
    /// Tag for a plain directory attribute (a string with the directory flag).
    pub fn directory() -> Self {
        Self::DIRECTORY | Self::STRING
    }

    /// Tag for a plain file attribute (a string with the file flag).
    pub fn file() -> Self {
        Self::FILE | Self::STRING
    }

    /// Tag for a color attribute (a string with the color flag).
    pub fn color() -> Self {
        Self::COLOR | Self::STRING
    }

    /// Tag for an enum over the given underlying scalar tag.
    pub fn enum_over(underlying: Self) -> Self {
        Self::ENUM | underlying
    }
}
