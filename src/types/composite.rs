use std::sync::Arc;

use super::{DatatypeDefinition, ExtraComponents, Type, UNKNOWN_TYPE_NAME, Varies};
use crate::error::{Hl7Error, Result};

/// Datatype made of ordered components.
///
/// Components are created on first access. A declared composite has the
/// fixed size of its definition; a generic one (no definition) grows to any
/// index and fills gaps with `Varies` placeholders.
#[derive(Debug, Clone)]
pub struct Composite {
    definition: Option<Arc<DatatypeDefinition>>,
    components: Vec<Type>,
    extra: ExtraComponents,
}

impl Composite {
    pub fn declared(definition: Arc<DatatypeDefinition>) -> Self {
        Self {
            definition: Some(definition),
            components: Vec::new(),
            extra: ExtraComponents::new(),
        }
    }

    pub fn generic() -> Self {
        Self {
            definition: None,
            components: Vec::new(),
            extra: ExtraComponents::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        self.definition
            .as_ref()
            .map_or(UNKNOWN_TYPE_NAME, |definition| definition.name())
    }

    pub fn is_generic(&self) -> bool {
        self.definition.is_none()
    }

    pub fn definition(&self) -> Option<&Arc<DatatypeDefinition>> {
        self.definition.as_ref()
    }

    /// Declared component count, or the current size of a generic composite.
    pub fn len(&self) -> usize {
        match &self.definition {
            Some(definition) => definition.components().len(),
            None => self.components.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.iter().all(Type::is_empty) && self.extra.is_empty()
    }

    /// Component `index` (0-based) if it has been created.
    pub fn component(&self, index: usize) -> Option<&Type> {
        self.components.get(index)
    }

    /// Component `index` (0-based), creating it and every earlier one.
    pub fn component_mut(&mut self, index: usize) -> Result<&mut Type> {
        match &self.definition {
            Some(definition) => {
                let declared = definition.components();
                if index >= declared.len() {
                    return Err(Hl7Error::data_type(format!(
                        "Can't get component {} of {} - it has only {} components",
                        index + 1,
                        definition.name(),
                        declared.len()
                    )));
                }
                while self.components.len() <= index {
                    let next = declared[self.components.len()].instantiate(&[])?;
                    self.components.push(next);
                }
            }
            None => {
                if self.components.len() <= index {
                    self.components
                        .resize_with(index + 1, || Type::Varies(Varies::new()));
                }
            }
        }
        Ok(&mut self.components[index])
    }

    /// Components created so far.
    pub fn components(&self) -> &[Type] {
        &self.components
    }

    pub fn extra_components(&self) -> &ExtraComponents {
        &self.extra
    }

    pub fn extra_components_mut(&mut self) -> &mut ExtraComponents {
        &mut self.extra
    }
}
