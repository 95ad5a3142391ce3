use std::sync::Arc;

use crate::core::Hl7Version;
use crate::types::{DatatypeDefinition, PrimitiveKind};

const PRIMITIVES: &[(&str, PrimitiveKind)] = &[
    ("ST", PrimitiveKind::Text),
    ("TX", PrimitiveKind::Text),
    ("FT", PrimitiveKind::Text),
    ("ID", PrimitiveKind::Coded),
    ("IS", PrimitiveKind::Coded),
    ("NM", PrimitiveKind::Numeric),
    ("SI", PrimitiveKind::Numeric),
    ("TM", PrimitiveKind::Time),
    ("DT", PrimitiveKind::Date),
    ("DTM", PrimitiveKind::DateTime),
];

/// Composite code followed by its component codes.
const COMPOSITES: &[(&str, &[&str])] = &[
    ("CE", &["ST", "ST", "ID", "ST", "ST", "ID"]),
    ("CWE", &["ST", "ST", "ID", "ST", "ST", "ID", "ST", "ST", "ST"]),
    ("HD", &["IS", "ST", "ID"]),
];

/// Common datatypes of `version`.
///
/// TS is a primitive up to 2.4 and becomes the composite `DTM ^ ID`
/// (time, degree of precision) from 2.5 on.
pub fn builtin_datatypes(version: Hl7Version) -> Vec<Arc<DatatypeDefinition>> {
    let primitives: Vec<Arc<DatatypeDefinition>> = PRIMITIVES
        .iter()
        .map(|(code, kind)| Arc::new(DatatypeDefinition::primitive(*code, *kind)))
        .collect();
    let lookup = |code: &str| {
        primitives
            .iter()
            .find(|definition| definition.name() == code)
            .cloned()
    };

    let mut definitions: Vec<Arc<DatatypeDefinition>> = COMPOSITES
        .iter()
        .map(|(code, components)| {
            let components = components.iter().filter_map(|component| lookup(component)).collect();
            Arc::new(DatatypeDefinition::composite(*code, components))
        })
        .collect();

    let ts = if version >= Hl7Version::V25 {
        DatatypeDefinition::composite("TS", ["DTM", "ID"].into_iter().filter_map(lookup).collect())
    } else {
        DatatypeDefinition::primitive("TS", PrimitiveKind::DateTime)
    };
    definitions.push(Arc::new(ts));
    definitions.push(Arc::new(DatatypeDefinition::varies()));
    definitions.extend(primitives.iter().cloned());
    definitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composites_resolve_all_components() {
        let definitions = builtin_datatypes(Hl7Version::V231);
        let cwe = definitions.iter().find(|d| d.name() == "CWE").unwrap();
        assert_eq!(cwe.components().len(), 9);
        let hd = definitions.iter().find(|d| d.name() == "HD").unwrap();
        let names: Vec<_> = hd.components().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["IS", "ST", "ID"]);
    }

    #[test]
    fn test_timestamp_shape_changes_in_25() {
        let ts = |version| {
            builtin_datatypes(version)
                .into_iter()
                .find(|d| d.name() == "TS")
                .unwrap()
        };
        assert!(ts(Hl7Version::V24).components().is_empty());
        assert_eq!(ts(Hl7Version::V25).components().len(), 2);
        assert_eq!(ts(Hl7Version::V26).components()[1].name(), "ID");
    }
}
