use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Message, StructureCategory, StructureKind};
use crate::core::{Hl7Version, ModelConfig};
use crate::error::{Hl7Error, Result};
use crate::provider::ModelClassFactory;

pub const GENERIC_MESSAGE_NAME: &str = "GenericMessage";

/// Generic message structure for one HL7 version.
#[derive(Debug, Clone)]
pub struct GenericMessageVersion {
    version: Hl7Version,
    kind: Arc<StructureKind>,
}

impl GenericMessageVersion {
    fn new(version: Hl7Version) -> Self {
        let kind = StructureKind::new(GENERIC_MESSAGE_NAME, StructureCategory::Group)
            .with_factory_constructor(|scope, _factory| {
                scope.extend_with_unplanned_segment("MSH").map(|_| ())
            });
        Self {
            version,
            kind: Arc::new(kind),
        }
    }

    pub fn version(&self) -> Hl7Version {
        self.version
    }

    pub fn kind(&self) -> &Arc<StructureKind> {
        &self.kind
    }
}

/// Version to generic message lookup. Built once and shared by reference.
#[derive(Debug, Clone)]
pub struct GenericMessageTable {
    versions: BTreeMap<&'static str, GenericMessageVersion>,
}

impl Default for GenericMessageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericMessageTable {
    pub fn new() -> Self {
        let versions = Hl7Version::all()
            .iter()
            .filter(|version| version.supports_generic_message())
            .map(|version| (version.as_str(), GenericMessageVersion::new(*version)))
            .collect();
        Self { versions }
    }

    pub fn lookup(&self, version: &str) -> Result<&GenericMessageVersion> {
        self.versions
            .get(version)
            .ok_or_else(|| Hl7Error::unsupported_version(version))
    }

    pub fn versions(&self) -> impl Iterator<Item = Hl7Version> + '_ {
        self.versions.values().map(GenericMessageVersion::version)
    }
}

/// Message of unknown structure: a root group holding only an unplanned
/// `MSH` slot, to which further unplanned structures are added as met.
pub struct GenericMessage;

impl GenericMessage {
    pub fn create(
        table: &GenericMessageTable,
        version: &str,
        factory: Arc<dyn ModelClassFactory>,
    ) -> Result<Message> {
        Self::create_with_config(table, version, factory, ModelConfig::default())
    }

    pub fn create_with_config(
        table: &GenericMessageTable,
        version: &str,
        factory: Arc<dyn ModelClassFactory>,
        config: ModelConfig,
    ) -> Result<Message> {
        let entry = table.lookup(version)?;
        Message::from_kind(entry.kind(), Some(entry.version().as_str()), factory, config)
    }
}
