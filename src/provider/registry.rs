use std::collections::HashMap;
use std::sync::Arc;

use super::ModelClassFactory;
use super::builtin::builtin_datatypes;
use crate::core::Hl7Version;
use crate::error::{Hl7Error, Result};
use crate::structure::StructureKind;
use crate::types::DatatypeDefinition;

type Key = (String, String);

fn key(version: &str, name: &str) -> Key {
    (version.to_string(), name.to_string())
}

/// Table-driven [`ModelClassFactory`] keyed by `(version, name)`.
///
/// Filled once at startup and then shared read-only behind an `Arc`.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    segments: HashMap<Key, Arc<StructureKind>>,
    groups: HashMap<Key, Arc<StructureKind>>,
    messages: HashMap<Key, Arc<StructureKind>>,
    datatypes: HashMap<Key, Arc<DatatypeDefinition>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the common datatypes registered for every version.
    pub fn with_builtin_datatypes() -> Self {
        let mut registry = Self::new();
        for version in Hl7Version::all() {
            for definition in builtin_datatypes(*version) {
                registry.datatypes.insert(
                    key(version.as_str(), definition.name()),
                    definition,
                );
            }
        }
        tracing::debug!(
            datatypes = registry.datatypes.len(),
            "Registered builtin datatypes"
        );
        registry
    }

    pub fn register_segment(&mut self, version: &str, kind: StructureKind) -> Arc<StructureKind> {
        let kind = Arc::new(kind);
        self.segments
            .insert(key(version, kind.name()), Arc::clone(&kind));
        kind
    }

    pub fn register_group(&mut self, version: &str, kind: StructureKind) -> Arc<StructureKind> {
        let kind = Arc::new(kind);
        self.groups.insert(key(version, kind.name()), Arc::clone(&kind));
        kind
    }

    pub fn register_message(&mut self, version: &str, kind: StructureKind) -> Arc<StructureKind> {
        let kind = Arc::new(kind);
        self.messages
            .insert(key(version, kind.name()), Arc::clone(&kind));
        kind
    }

    pub fn register_datatype(
        &mut self,
        version: &str,
        definition: DatatypeDefinition,
    ) -> Arc<DatatypeDefinition> {
        let definition = Arc::new(definition);
        self.datatypes
            .insert(key(version, definition.name()), Arc::clone(&definition));
        definition
    }

    pub fn datatype(&self, version: &str, code: &str) -> Option<Arc<DatatypeDefinition>> {
        self.datatypes.get(&key(version, code)).cloned()
    }

    /// Like [`SchemaRegistry::datatype`], failing for unknown codes.
    pub fn require_datatype(&self, version: &str, code: &str) -> Result<Arc<DatatypeDefinition>> {
        self.datatype(version, code).ok_or_else(|| {
            Hl7Error::data_type(format!(
                "The datatype {code} is not known for version {version}"
            ))
        })
    }

    pub fn segment(&self, version: &str, name: &str) -> Option<Arc<StructureKind>> {
        self.segments.get(&key(version, name)).cloned()
    }

    pub fn group(&self, version: &str, name: &str) -> Option<Arc<StructureKind>> {
        self.groups.get(&key(version, name)).cloned()
    }

    pub fn message(&self, version: &str, name: &str) -> Option<Arc<StructureKind>> {
        self.messages.get(&key(version, name)).cloned()
    }
}

impl ModelClassFactory for SchemaRegistry {
    fn resolve_segment(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>> {
        Ok(self.segment(version, name))
    }

    fn resolve_group(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>> {
        Ok(self.group(version, name))
    }

    fn resolve_message(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>> {
        Ok(self.message(version, name))
    }

    fn resolve_datatype(&self, code: &str, version: &str) -> Result<Arc<DatatypeDefinition>> {
        self.require_datatype(version, code)
    }
}
