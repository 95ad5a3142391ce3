use std::fmt;
use std::sync::Arc;

use super::ModelClassFactory;
use crate::error::{Hl7Error, Result};
use crate::structure::StructureKind;
use crate::types::DatatypeDefinition;

/// Fallback chain of factories, consulted in order.
///
/// Typically a small registry of site-specific Z-segments layered over the
/// standard schema. Structure lookups return the first hit; datatype lookup
/// returns the first success, or the last failure when every layer fails.
#[derive(Clone, Default)]
pub struct CompositeFactory {
    layers: Vec<Arc<dyn ModelClassFactory>>,
}

impl fmt::Debug for CompositeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeFactory")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl CompositeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, factory: Arc<dyn ModelClassFactory>) -> Self {
        self.layers.push(factory);
        self
    }

    fn first_structure(
        &self,
        lookup: impl Fn(&dyn ModelClassFactory) -> Result<Option<Arc<StructureKind>>>,
    ) -> Result<Option<Arc<StructureKind>>> {
        for layer in &self.layers {
            if let Some(kind) = lookup(layer.as_ref())? {
                return Ok(Some(kind));
            }
        }
        Ok(None)
    }
}

impl ModelClassFactory for CompositeFactory {
    fn resolve_segment(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>> {
        self.first_structure(|layer| layer.resolve_segment(name, version))
    }

    fn resolve_group(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>> {
        self.first_structure(|layer| layer.resolve_group(name, version))
    }

    fn resolve_message(&self, name: &str, version: &str) -> Result<Option<Arc<StructureKind>>> {
        self.first_structure(|layer| layer.resolve_message(name, version))
    }

    fn resolve_datatype(&self, code: &str, version: &str) -> Result<Arc<DatatypeDefinition>> {
        let mut last_error = None;
        for layer in &self.layers {
            match layer.resolve_datatype(code, version) {
                Ok(definition) => return Ok(definition),
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            Hl7Error::data_type(format!(
                "The datatype {code} is not known for version {version}"
            ))
        }))
    }
}
