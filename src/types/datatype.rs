use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Composite, ExtraComponents, Primitive, Varies};
use crate::error::{Hl7Error, Result};

/// Type name reported by generic primitives and composites.
pub const UNKNOWN_TYPE_NAME: &str = "UNKNOWN";

/// Value rules applied by a primitive on `set_value`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    /// No constraints at all.
    Generic,
    Text,
    /// Coded value, optionally bound to an HL7 table.
    Coded,
    Numeric,
    Time,
    Date,
    DateTime,
}

impl PrimitiveKind {
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Time | PrimitiveKind::Date | PrimitiveKind::DateTime
        )
    }
}

/// Extra construction arguments recorded on a field slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConstructorArg {
    /// HL7 table number for coded values (e.g. 125 for OBX-2).
    Table(u32),
}

#[derive(Debug, Clone)]
pub enum DatatypeShape {
    Primitive(PrimitiveKind),
    Composite(Vec<Arc<DatatypeDefinition>>),
    Varies,
}

/// Schema entry for a datatype: its code and the shape of its instances.
#[derive(Debug, Clone)]
pub struct DatatypeDefinition {
    name: String,
    shape: DatatypeShape,
}

impl DatatypeDefinition {
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            name: name.into(),
            shape: DatatypeShape::Primitive(kind),
        }
    }

    pub fn composite(name: impl Into<String>, components: Vec<Arc<DatatypeDefinition>>) -> Self {
        Self {
            name: name.into(),
            shape: DatatypeShape::Composite(components),
        }
    }

    pub fn varies() -> Self {
        Self {
            name: "Varies".to_string(),
            shape: DatatypeShape::Varies,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &DatatypeShape {
        &self.shape
    }

    pub fn is_varies(&self) -> bool {
        matches!(self.shape, DatatypeShape::Varies)
    }

    /// Declared components of a composite; empty for other shapes.
    pub fn components(&self) -> &[Arc<DatatypeDefinition>] {
        match &self.shape {
            DatatypeShape::Composite(components) => components,
            _ => &[],
        }
    }

    /// Whether `args` can be passed when instantiating this datatype.
    pub fn accepts(&self, args: &[ConstructorArg]) -> bool {
        match (&self.shape, args) {
            (_, []) => true,
            (DatatypeShape::Primitive(PrimitiveKind::Coded), [ConstructorArg::Table(_)]) => true,
            _ => false,
        }
    }

    /// Create a fresh, empty instance.
    pub fn instantiate(self: &Arc<Self>, args: &[ConstructorArg]) -> Result<Type> {
        if !self.accepts(args) {
            return Err(Hl7Error::application_internal(format!(
                "Can't instantiate {} with constructor arguments {args:?}",
                self.name
            )));
        }
        Ok(match &self.shape {
            DatatypeShape::Primitive(kind) => {
                let mut primitive = Primitive::new(&self.name, *kind);
                if let [ConstructorArg::Table(table)] = args {
                    primitive = primitive.with_table(*table);
                }
                Type::Primitive(primitive)
            }
            DatatypeShape::Composite(_) => Type::Composite(Composite::declared(Arc::clone(self))),
            DatatypeShape::Varies => Type::Varies(Varies::new()),
        })
    }
}

/// A field value: primitive, composite, or runtime-typed.
#[derive(Debug, Clone)]
pub enum Type {
    Primitive(Primitive),
    Composite(Composite),
    Varies(Varies),
}

impl Default for Type {
    fn default() -> Self {
        Type::Primitive(Primitive::generic())
    }
}

impl Type {
    pub fn type_name(&self) -> &str {
        match self {
            Type::Primitive(primitive) => primitive.type_name(),
            Type::Composite(composite) => composite.type_name(),
            Type::Varies(varies) => varies.type_name(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Type::Primitive(primitive) => primitive.is_empty(),
            Type::Composite(composite) => composite.is_empty(),
            Type::Varies(varies) => varies.is_empty(),
        }
    }

    pub fn is_generic_primitive(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.kind() == PrimitiveKind::Generic)
    }

    /// Extra components; a `Varies` exposes those of its inner type.
    pub fn extra_components(&self) -> &ExtraComponents {
        match self {
            Type::Primitive(primitive) => primitive.extra_components(),
            Type::Composite(composite) => composite.extra_components(),
            Type::Varies(varies) => varies.data().extra_components(),
        }
    }

    pub fn extra_components_mut(&mut self) -> &mut ExtraComponents {
        match self {
            Type::Primitive(primitive) => primitive.extra_components_mut(),
            Type::Composite(composite) => composite.extra_components_mut(),
            Type::Varies(varies) => varies.data_mut().extra_components_mut(),
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Type::Primitive(primitive) => Some(primitive),
            Type::Varies(varies) => varies.data().as_primitive(),
            Type::Composite(_) => None,
        }
    }

    pub fn as_primitive_mut(&mut self) -> Option<&mut Primitive> {
        match self {
            Type::Primitive(primitive) => Some(primitive),
            Type::Varies(varies) => varies.data_mut().as_primitive_mut(),
            Type::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Type::Composite(composite) => Some(composite),
            Type::Varies(varies) => varies.data().as_composite(),
            Type::Primitive(_) => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut Composite> {
        match self {
            Type::Composite(composite) => Some(composite),
            Type::Varies(varies) => varies.data_mut().as_composite_mut(),
            Type::Primitive(_) => None,
        }
    }

    pub fn as_varies(&self) -> Option<&Varies> {
        match self {
            Type::Varies(varies) => Some(varies),
            _ => None,
        }
    }

    pub fn as_varies_mut(&mut self) -> Option<&mut Varies> {
        match self {
            Type::Varies(varies) => Some(varies),
            _ => None,
        }
    }

    /// Value of the first primitive reached through first components.
    pub fn first_value(&self) -> Option<&str> {
        match self {
            Type::Primitive(primitive) => primitive.value(),
            Type::Composite(composite) => composite.component(0)?.first_value(),
            Type::Varies(varies) => varies.data().first_value(),
        }
    }

    /// Set the value of the first primitive, creating first components as needed.
    pub fn set_first_value(&mut self, value: Option<&str>) -> Result<()> {
        match self {
            Type::Primitive(primitive) => primitive.set_value(value),
            Type::Composite(composite) => composite.component_mut(0)?.set_first_value(value),
            Type::Varies(varies) => varies.data_mut().set_first_value(value),
        }
    }
}
