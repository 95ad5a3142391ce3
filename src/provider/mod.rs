//! Class resolution: mapping structure and datatype names plus an HL7
//! version to schema entries.

pub mod builtin;
pub mod composite;
pub mod registry;

use std::sync::Arc;

use crate::error::Result;
use crate::structure::StructureKind;
use crate::types::DatatypeDefinition;

pub use composite::CompositeFactory;
pub use registry::SchemaRegistry;

/// Version-aware lookup of schema entries.
///
/// Structure lookups return `Ok(None)` for unknown names so callers can fall
/// back to generic structures. Datatype lookup fails instead, since a field
/// cannot be typed without a definition.
pub trait ModelClassFactory: Send + Sync {
    fn resolve_segment(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>>;

    fn resolve_group(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>>;

    fn resolve_message(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>>;

    fn resolve_datatype(&self, code: &str, version: &str) -> Result<Arc<DatatypeDefinition>>;
}
