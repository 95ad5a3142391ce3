use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::StructureScope;
use crate::error::Result;
use crate::provider::ModelClassFactory;
use crate::types::{ConstructorArg, DatatypeDefinition};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StructureCategory {
    Group,
    Segment,
    GenericGroup,
    GenericSegment,
}

impl StructureCategory {
    pub fn is_group(&self) -> bool {
        matches!(self, StructureCategory::Group | StructureCategory::GenericGroup)
    }

    pub fn is_segment(&self) -> bool {
        matches!(
            self,
            StructureCategory::Segment | StructureCategory::GenericSegment
        )
    }

    pub fn is_generic(&self) -> bool {
        matches!(
            self,
            StructureCategory::GenericGroup | StructureCategory::GenericSegment
        )
    }
}

/// Constructor receiving the class-resolution factory.
pub type FactoryConstructor =
    Arc<dyn Fn(&mut StructureScope<'_>, &dyn ModelClassFactory) -> Result<()> + Send + Sync>;

/// Constructor taking no collaborators.
pub type DefaultConstructor = Arc<dyn Fn(&mut StructureScope<'_>) -> Result<()> + Send + Sync>;

/// Schema entry for a group or segment.
///
/// Instantiation prefers the factory-aware constructor and falls back to the
/// default one only when no factory-aware constructor is registered.
#[derive(Clone)]
pub struct StructureKind {
    name: String,
    category: StructureCategory,
    factory_constructor: Option<FactoryConstructor>,
    default_constructor: Option<DefaultConstructor>,
}

impl fmt::Debug for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureKind")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("factory_constructor", &self.factory_constructor.is_some())
            .field("default_constructor", &self.default_constructor.is_some())
            .finish()
    }
}

impl StructureKind {
    pub fn new(name: impl Into<String>, category: StructureCategory) -> Self {
        Self {
            name: name.into(),
            category,
            factory_constructor: None,
            default_constructor: None,
        }
    }

    pub fn with_factory_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&mut StructureScope<'_>, &dyn ModelClassFactory) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.factory_constructor = Some(Arc::new(constructor));
        self
    }

    pub fn with_default_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&mut StructureScope<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.default_constructor = Some(Arc::new(constructor));
        self
    }

    /// Fallback for segments the factory does not know; named per instance.
    pub fn generic_segment() -> Arc<Self> {
        Arc::new(Self::new("GenericSegment", StructureCategory::GenericSegment))
    }

    /// Fallback for groups the factory does not know; named per instance.
    pub fn generic_group() -> Arc<Self> {
        Arc::new(Self::new("GenericGroup", StructureCategory::GenericGroup))
    }

    /// Table-driven group: declares `children` in order.
    ///
    /// A child that fails to declare is logged and skipped while lenient
    /// declarations are enabled.
    pub fn group(name: impl Into<String>, children: Vec<ChildDecl>) -> Self {
        let name = name.into();
        let structure = name.clone();
        Self::new(name, StructureCategory::Group).with_factory_constructor(
            move |scope: &mut StructureScope<'_>, _factory: &dyn ModelClassFactory| {
                for child in &children {
                    let declared =
                        scope.declare(Arc::clone(&child.kind), child.required, child.repeating);
                    scope.tolerate(declared, &structure, child.kind.name())?;
                }
                Ok(())
            },
        )
    }

    /// Table-driven segment: adds `fields` in order.
    pub fn segment(name: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        let name = name.into();
        let structure = name.clone();
        Self::new(name, StructureCategory::Segment).with_factory_constructor(
            move |scope: &mut StructureScope<'_>, _factory: &dyn ModelClassFactory| {
                for field in &fields {
                    let added = scope.add_field(field.clone());
                    scope.tolerate(added, &structure, field.datatype.name())?;
                }
                Ok(())
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> StructureCategory {
        self.category
    }

    pub fn is_group(&self) -> bool {
        self.category.is_group()
    }

    pub fn is_segment(&self) -> bool {
        self.category.is_segment()
    }

    pub fn factory_constructor(&self) -> Option<&FactoryConstructor> {
        self.factory_constructor.as_ref()
    }

    pub fn default_constructor(&self) -> Option<&DefaultConstructor> {
        self.default_constructor.as_ref()
    }
}

/// One child of a table-driven group.
#[derive(Debug, Clone)]
pub struct ChildDecl {
    pub kind: Arc<StructureKind>,
    pub required: bool,
    pub repeating: bool,
}

impl ChildDecl {
    pub fn new(kind: Arc<StructureKind>, required: bool, repeating: bool) -> Self {
        Self {
            kind,
            required,
            repeating,
        }
    }
}

/// One field slot of a table-driven segment.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub datatype: Arc<DatatypeDefinition>,
    pub required: bool,
    /// Values `<= 0` mean unbounded.
    pub max_reps: i32,
    pub length: u32,
    pub args: Vec<ConstructorArg>,
    pub description: Option<String>,
}

impl FieldDecl {
    pub fn new(datatype: Arc<DatatypeDefinition>, required: bool, max_reps: i32, length: u32) -> Self {
        Self {
            datatype,
            required,
            max_reps,
            length,
            args: Vec::new(),
            description: None,
        }
    }

    pub fn with_args(mut self, args: Vec<ConstructorArg>) -> Self {
        self.args = args;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
