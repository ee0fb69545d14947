//! Bidirectional conversion between the typed attribute model and the
//! boundary's primitive call surface.
//!
//! Reads copy every boundary-owned string into host storage within the call
//! that produced it; enum field lists are fetched eagerly because the buffer
//! backing them is not guaranteed to survive the next engine call. Writes
//! dispatch on the attribute's kind and treat a rejected write as a logged
//! no-op rather than an error.

use arbor_engine::GenerationEngine;
use tracing::warn;

use crate::attribute::{AttrKind, AttrValue, Attribute};

/// Read one attribute, decoding the compound type tag into exactly one kind.
///
/// Returns `None` when the index is out of range, the tag does not decode,
/// or the boundary reports inconsistent data (e.g. an enum selection outside
/// its field list).
pub fn read_attribute<E: GenerationEngine + ?Sized>(engine: &E, index: usize) -> Option<Attribute> {
    let name = engine.attribute_name(index)?.to_owned();
    let kind = AttrKind::from_tag(engine.attribute_tag(index))?;

    let value = match kind {
        AttrKind::Bool => AttrValue::Bool(engine.bool_value(index)?),
        AttrKind::Float => {
            let bounds = engine.float_value(index)?;
            AttrValue::Float {
                value: bounds.value,
                min: bounds.min_bound(),
                max: bounds.max_bound(),
            }
        }
        AttrKind::String => AttrValue::String(engine.string_value(index)?.to_owned()),
        AttrKind::Directory => AttrValue::Directory(engine.directory_value(index)?.to_owned()),
        AttrKind::File => {
            let (value, ext) = engine.file_value(index)?;
            AttrValue::File {
                value: value.to_owned(),
                ext_filter: ext.to_owned(),
            }
        }
        AttrKind::Color => AttrValue::Color(engine.color_value(index)?.to_owned()),
        AttrKind::Enum => {
            let selection = engine.enum_selection(index)?;
            let count = engine.enum_field_count(index);
            let mut fields = Vec::with_capacity(count);
            for field in 0..count {
                fields.push(engine.enum_field(index, field)?.to_owned());
            }
            if !fields.is_empty() && selection >= fields.len() {
                warn!(
                    attribute = %name,
                    selection,
                    fields = fields.len(),
                    "enum selection out of range, skipping attribute"
                );
                return None;
            }
            AttrValue::Enum { selection, fields }
        }
    };

    Some(Attribute { index, name, value })
}

/// Enumerate all attributes of the current selection, in registry order.
///
/// The returned indices match the boundary's internal indexing, which is the
/// sole key for write-back. Unreadable entries are skipped with a warning.
pub fn read_all<E: GenerationEngine + ?Sized>(engine: &E) -> Vec<Attribute> {
    let count = engine.attribute_count();
    let mut attrs = Vec::with_capacity(count);
    for index in 0..count {
        match read_attribute(engine, index) {
            Some(attr) => attrs.push(attr),
            None => warn!(index, "skipping unreadable attribute"),
        }
    }
    attrs
}

/// Write one attribute's current value back through the matching setter.
///
/// A write the engine rejects (unknown index or mismatched kind) is logged
/// and ignored; the value silently fails to apply.
pub fn write_attribute<E: GenerationEngine + ?Sized>(engine: &mut E, attr: &Attribute) {
    let applied = match &attr.value {
        AttrValue::Bool(value) => engine.set_bool_value(attr.index, *value),
        AttrValue::Float { value, .. } => engine.set_float_value(attr.index, *value),
        AttrValue::String(value) => engine.set_string_value(attr.index, value),
        AttrValue::Directory(value) => engine.set_directory_value(attr.index, value),
        AttrValue::File { value, .. } => engine.set_file_value(attr.index, value),
        AttrValue::Color(value) => engine.set_color_value(attr.index, value),
        AttrValue::Enum { selection, .. } => engine.set_enum_selection(attr.index, *selection),
    };

    if !applied {
        warn!(
            attribute = %attr.name,
            index = attr.index,
            kind = attr.kind().as_str(),
            "attribute write rejected by the engine, value not applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_engine::stub::{StubAttr, StubEngine, StubPackage};
    use arbor_engine::RawAttrTag;
    use std::path::Path;

    fn engine_with(attributes: Vec<StubAttr>) -> StubEngine {
        let package = StubPackage {
            rule_files: vec!["bin/test.cgb".into()],
            start_rules: vec!["Default$Init".into()],
            attributes,
            output: Default::default(),
        };
        let mut engine = StubEngine::new().with_package("/pkg.rpk", package);
        engine
            .bind(Path::new("/pkg.rpk"), Path::new("/tmp/unpack"))
            .unwrap();
        engine.select_rule_file(0).unwrap();
        engine.select_start_rule(0).unwrap();
        engine
    }

    fn all_kinds() -> Vec<StubAttr> {
        vec![
            StubAttr::Bool {
                name: "hasRoof".into(),
                value: true,
            },
            StubAttr::Float {
                name: "height".into(),
                value: 0.5,
                min: 0.0,
                max: 1.0,
            },
            StubAttr::String {
                name: "label".into(),
                value: "north wing".into(),
            },
            StubAttr::Directory {
                name: "assetDir".into(),
                value: "/data/assets".into(),
            },
            StubAttr::File {
                name: "roofTexture".into(),
                value: "roof.png".into(),
                ext: "*.png;*.jpg;".into(),
            },
            StubAttr::Color {
                name: "wallColor".into(),
                value: "#c0ffee".into(),
            },
            StubAttr::Enum {
                name: "Style$Variant".into(),
                selection: 1,
                fields: vec!["modern".into(), "baroque".into(), "gothic".into()],
                underlying: RawAttrTag::STRING,
            },
        ]
    }

    #[test]
    fn test_read_all_preserves_registry_order() {
        let engine = engine_with(all_kinds());
        let attrs = read_all(&engine);
        assert_eq!(attrs.len(), 7);
        for (i, attr) in attrs.iter().enumerate() {
            assert_eq!(attr.index, i);
        }
        assert_eq!(attrs[0].kind(), AttrKind::Bool);
        assert_eq!(attrs[6].name, "Style$Variant");
    }

    #[test]
    fn test_float_bounds_decode_to_options() {
        let engine = engine_with(vec![StubAttr::Float {
            name: "angle".into(),
            value: 30.0,
            min: f64::NAN,
            max: f64::NAN,
        }]);
        let attr = read_attribute(&engine, 0).unwrap();
        assert_eq!(
            attr.value,
            AttrValue::Float {
                value: 30.0,
                min: None,
                max: None,
            }
        );
    }

    #[test]
    fn test_enum_fields_fetched_eagerly() {
        let engine = engine_with(all_kinds());
        let attr = read_attribute(&engine, 6).unwrap();
        match attr.value {
            AttrValue::Enum { selection, fields } => {
                assert_eq!(selection, 1);
                assert_eq!(fields, ["modern", "baroque", "gothic"]);
                assert!(selection < fields.len());
            }
            other => panic!("expected enum, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_every_kind() {
        let mut engine = engine_with(all_kinds());
        let attrs = read_all(&engine);
        for attr in &attrs {
            write_attribute(&mut engine, attr);
        }
        assert_eq!(read_all(&engine), attrs);
    }

    #[test]
    fn test_in_range_float_write_reads_back_exactly() {
        let mut engine = engine_with(all_kinds());
        let mut attr = read_attribute(&engine, 1).unwrap();
        attr.value = AttrValue::Float {
            value: 0.875,
            min: Some(0.0),
            max: Some(1.0),
        };
        write_attribute(&mut engine, &attr);

        let back = read_attribute(&engine, 1).unwrap();
        assert_eq!(
            back.value,
            AttrValue::Float {
                value: 0.875,
                min: Some(0.0),
                max: Some(1.0),
            }
        );
    }

    #[test]
    fn test_mismatched_write_is_a_no_op() {
        let mut engine = engine_with(all_kinds());
        let before = read_all(&engine);

        // Targets the bool attribute with a float payload.
        let bogus = Attribute {
            index: 0,
            name: "hasRoof".into(),
            value: AttrValue::Float {
                value: 1.0,
                min: None,
                max: None,
            },
        };
        write_attribute(&mut engine, &bogus);
        assert_eq!(read_all(&engine), before);
    }

    #[test]
    fn test_unbound_engine_reads_empty() {
        let engine = StubEngine::new();
        assert!(read_all(&engine).is_empty());
    }
}
