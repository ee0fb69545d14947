//! The owned attribute model: [`Attribute`], [`AttrValue`], [`AttrKind`].

use arbor_engine::RawAttrTag;
use serde::{Deserialize, Serialize};

/// The closed set of attribute kinds the bridge understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
    Bool,
    Float,
    String,
    Directory,
    File,
    Color,
    Enum,
}

impl AttrKind {
    /// Decode a compound boundary tag into exactly one kind.
    ///
    /// The most specific applicable kind wins: an enum outranks its
    /// underlying scalar, and the file/directory/color capability flags
    /// outrank the plain string they are layered on.
    pub fn from_tag(tag: RawAttrTag) -> Option<Self> {
        if tag.contains(RawAttrTag::ENUM) {
            Some(Self::Enum)
        } else if tag.contains(RawAttrTag::FILE) {
            Some(Self::File)
        } else if tag.contains(RawAttrTag::DIRECTORY) {
            Some(Self::Directory)
        } else if tag.contains(RawAttrTag::COLOR) {
            Some(Self::Color)
        } else if tag.contains(RawAttrTag::STRING) {
            Some(Self::String)
        } else if tag.contains(RawAttrTag::FLOAT) {
            Some(Self::Float)
        } else if tag.contains(RawAttrTag::BOOL) {
            Some(Self::Bool)
        } else {
            None
        }
    }

    /// Lowercase name used by the service projection.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::String => "string",
            Self::Directory => "directory",
            Self::File => "file",
            Self::Color => "color",
            Self::Enum => "enum",
        }
    }
}

/// Tagged value storage; exactly one payload is valid per kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrValue {
    Bool(bool),
    /// Bounds are descriptor metadata; `None` means the rule declares none.
    Float {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    String(String),
    Directory(String),
    /// Value plus an extension filter string. The filter is presentation
    /// only; nothing is enforced against it.
    File {
        value: String,
        ext_filter: String,
    },
    /// Color literal in `#rrggbb` form, stored verbatim.
    Color(String),
    /// Selection index into a finite ordered field list. The index satisfies
    /// `selection < fields.len()` whenever `fields` is non-empty.
    Enum {
        selection: usize,
        fields: Vec<String>,
    },
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            Self::Bool(_) => AttrKind::Bool,
            Self::Float { .. } => AttrKind::Float,
            Self::String(_) => AttrKind::String,
            Self::Directory(_) => AttrKind::Directory,
            Self::File { .. } => AttrKind::File,
            Self::Color(_) => AttrKind::Color,
            Self::Enum { .. } => AttrKind::Enum,
        }
    }
}

/// A named, typed generation parameter.
///
/// `index` is the attribute's stable position in the boundary's registry and
/// the sole key used for write-back; it stays valid until the rule package,
/// rule file, or start rule changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub index: usize,
    /// May be namespaced, e.g. `Style$Param`.
    pub name: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn kind(&self) -> AttrKind {
        self.value.kind()
    }
}
