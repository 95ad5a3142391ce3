use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::summary::{FieldSummary, SlotSummary, StructureSummary};
use super::{FieldDecl, Group, GroupItem, Segment, StructureCategory, StructureKind};
use crate::core::ModelConfig;
use crate::error::{Hl7Error, Result};
use crate::provider::ModelClassFactory;

/// Index of a structure in its message's arena.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructureId(usize);

impl StructureId {
    pub const ROOT: StructureId = StructureId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum StructureBody {
    Group(Group),
    Segment(Segment),
}

/// A node of the message tree.
#[derive(Debug, Clone)]
pub struct Structure {
    name: String,
    parent: Option<StructureId>,
    category: StructureCategory,
    body: StructureBody,
}

impl Structure {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the message root.
    pub fn parent(&self) -> Option<StructureId> {
        self.parent
    }

    pub fn category(&self) -> StructureCategory {
        self.category
    }

    pub fn body(&self) -> &StructureBody {
        &self.body
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.body {
            StructureBody::Group(group) => Some(group),
            StructureBody::Segment(_) => None,
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match &self.body {
            StructureBody::Segment(segment) => Some(segment),
            StructureBody::Group(_) => None,
        }
    }
}

/// An HL7 message: the root group of an arena-backed structure tree.
///
/// Every structure of the message lives in `nodes`; parents and children
/// refer to each other by [`StructureId`]. Slots and repetitions only ever
/// grow, so ids stay valid for the life of the message.
pub struct Message {
    nodes: Vec<Structure>,
    version: Option<String>,
    factory: Arc<dyn ModelClassFactory>,
    config: ModelConfig,
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("name", &self.name())
            .field("version", &self.version)
            .field("structures", &self.nodes.len())
            .finish()
    }
}

impl Message {
    /// An empty message with no declared slots.
    pub fn new(
        name: impl Into<String>,
        version: Option<&str>,
        factory: Arc<dyn ModelClassFactory>,
    ) -> Self {
        Self::with_config(name, version, factory, ModelConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        version: Option<&str>,
        factory: Arc<dyn ModelClassFactory>,
        config: ModelConfig,
    ) -> Self {
        Self {
            nodes: vec![Structure {
                name: name.into(),
                parent: None,
                category: StructureCategory::Group,
                body: StructureBody::Group(Group::new()),
            }],
            version: version.map(str::to_string),
            factory,
            config,
        }
    }

    /// Build a message whose root is constructed by `kind`.
    pub fn from_kind(
        kind: &StructureKind,
        version: Option<&str>,
        factory: Arc<dyn ModelClassFactory>,
        config: ModelConfig,
    ) -> Result<Self> {
        if !kind.is_group() {
            return Err(Hl7Error::instantiation(
                kind.name(),
                Hl7Error::application_internal(format!("{} is not a group", kind.name())),
            ));
        }
        let mut message = Self::with_config(kind.name(), version, factory, config);
        if kind.category() == StructureCategory::Group {
            message
                .construct(StructureId::ROOT, kind)
                .map_err(|err| Hl7Error::instantiation(kind.name(), err))?;
        }
        tracing::debug!(
            structure = kind.name(),
            version = ?version,
            "Constructed message"
        );
        Ok(message)
    }

    /// Build the message structure `name` registered for `version`.
    pub fn from_registry(
        name: &str,
        version: &str,
        factory: Arc<dyn ModelClassFactory>,
        config: ModelConfig,
    ) -> Result<Self> {
        let kind = factory.resolve_message(name, version)?.ok_or_else(|| {
            Hl7Error::application_internal(format!(
                "No message structure {name} is registered for version {version}"
            ))
        })?;
        Self::from_kind(&kind, Some(version), factory, config)
    }

    pub fn root(&self) -> StructureId {
        StructureId::ROOT
    }

    pub fn name(&self) -> &str {
        &self.nodes[0].name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn factory(&self) -> &Arc<dyn ModelClassFactory> {
        &self.factory
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn structure_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn structure(&self, id: StructureId) -> Result<&Structure> {
        self.nodes.get(id.0).ok_or_else(|| {
            Hl7Error::application_internal(format!(
                "Structure {id} does not belong to message {}",
                self.name()
            ))
        })
    }

    fn name_of(&self, id: StructureId) -> &str {
        self.nodes.get(id.0).map_or("", |structure| structure.name.as_str())
    }

    fn structure_mut(&mut self, id: StructureId) -> Result<&mut Structure> {
        let name = self.name().to_string();
        self.nodes.get_mut(id.0).ok_or_else(|| {
            Hl7Error::application_internal(format!(
                "Structure {id} does not belong to message {name}"
            ))
        })
    }

    pub fn parent(&self, id: StructureId) -> Result<Option<StructureId>> {
        Ok(self.structure(id)?.parent)
    }

    /// Walk parent links up to the message root.
    pub fn owning_root(&self, id: StructureId) -> Result<StructureId> {
        let mut current = id;
        while let Some(parent) = self.structure(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    pub fn group(&self, id: StructureId) -> Result<&Group> {
        let structure = self.structure(id)?;
        structure.as_group().ok_or_else(|| {
            Hl7Error::application_internal(format!("{} is not a group", structure.name))
        })
    }

    fn group_mut(&mut self, id: StructureId) -> Result<&mut Group> {
        let structure = self.structure_mut(id)?;
        match &mut structure.body {
            StructureBody::Group(group) => Ok(group),
            StructureBody::Segment(_) => Err(Hl7Error::application_internal(format!(
                "{} is not a group",
                structure.name
            ))),
        }
    }

    pub fn segment(&self, id: StructureId) -> Result<&Segment> {
        let structure = self.structure(id)?;
        structure.as_segment().ok_or_else(|| {
            Hl7Error::application_internal(format!("{} is not a segment", structure.name))
        })
    }

    pub fn segment_mut(&mut self, id: StructureId) -> Result<&mut Segment> {
        let structure = self.structure_mut(id)?;
        match &mut structure.body {
            StructureBody::Segment(segment) => Ok(segment),
            StructureBody::Group(_) => Err(Hl7Error::application_internal(format!(
                "{} is not a segment",
                structure.name
            ))),
        }
    }

    fn item(&self, group: StructureId, name: &str) -> Result<&GroupItem> {
        let structure = self.structure(group)?;
        self.group(group)?
            .item(name)
            .ok_or_else(|| Hl7Error::not_found(name, structure.name.as_str()))
    }

    /// Declare `kind` as the next child slot of `group`.
    ///
    /// The slot is named after the kind. Group kinds named
    /// `<message>_<group>` drop the message prefix and one separator.
    pub fn declare(
        &mut self,
        group: StructureId,
        kind: Arc<StructureKind>,
        required: bool,
        repeating: bool,
    ) -> Result<String> {
        let name = self.default_slot_name(&kind);
        let index = self.group(group)?.len();
        self.register(group, kind, required, repeating, index, &name)
    }

    fn default_slot_name(&self, kind: &StructureKind) -> String {
        let name = kind.name();
        if kind.is_group() {
            if let Some(rest) = name.strip_prefix(self.name()).filter(|rest| !rest.is_empty()) {
                return rest.chars().skip(1).collect();
            }
        }
        name.to_string()
    }

    /// Insert a slot at `at_index`, suffixing `name` with 2, 3, ... on
    /// collision. Returns the name actually used.
    pub fn register(
        &mut self,
        group: StructureId,
        kind: Arc<StructureKind>,
        required: bool,
        repeating: bool,
        at_index: usize,
        name: &str,
    ) -> Result<String> {
        let group_name = self.structure(group)?.name.clone();
        let slots = self.group_mut(group)?;
        if at_index > slots.len() {
            return Err(Hl7Error::application_internal(format!(
                "Can't insert {name} at index {at_index} of {group_name} - it has only {} slots",
                slots.len()
            )));
        }
        let actual = slots.unique_name(name);
        tracing::debug!(
            group = %group_name,
            slot = %actual,
            kind = kind.name(),
            index = at_index,
            required,
            repeating,
            "Registered structure slot"
        );
        slots.insert(at_index, actual.clone(), GroupItem::new(kind, required, repeating));
        Ok(actual)
    }

    /// Append a slot for a segment outside the declared schema.
    pub fn extend_with_unplanned_segment(&mut self, group: StructureId, name: &str) -> Result<String> {
        let index = self.group(group)?.len();
        self.extend_with_unplanned_segment_at(group, name, index)
    }

    /// The kind comes from the factory, or is the generic segment when the
    /// factory has none. One repetition is built and discarded to check the
    /// kind can be instantiated before the slot is registered as optional
    /// and repeating.
    pub fn extend_with_unplanned_segment_at(
        &mut self,
        group: StructureId,
        name: &str,
        index: usize,
    ) -> Result<String> {
        let version = self.require_version(group, name)?;
        let kind = self
            .factory
            .resolve_segment(name, &version)?
            .unwrap_or_else(StructureKind::generic_segment);
        if !kind.is_segment() {
            return Err(Hl7Error::instantiation(
                kind.name(),
                Hl7Error::application_internal(format!("{} is not a segment", kind.name())),
            ));
        }
        self.extend_with_unplanned(group, kind, name, index)
    }

    /// Append a slot for a group outside the declared schema.
    pub fn extend_with_unplanned_group(&mut self, group: StructureId, name: &str) -> Result<String> {
        let version = self.require_version(group, name)?;
        let kind = self
            .factory
            .resolve_group(name, &version)?
            .unwrap_or_else(StructureKind::generic_group);
        if !kind.is_group() {
            return Err(Hl7Error::instantiation(
                kind.name(),
                Hl7Error::application_internal(format!("{} is not a group", kind.name())),
            ));
        }
        let index = self.group(group)?.len();
        self.extend_with_unplanned(group, kind, name, index)
    }

    fn require_version(&self, group: StructureId, name: &str) -> Result<String> {
        let group_name = &self.structure(group)?.name;
        self.version.clone().ok_or_else(|| {
            Hl7Error::missing_version(format!("add unplanned structure {name} to {group_name}"))
        })
    }

    fn extend_with_unplanned(
        &mut self,
        group: StructureId,
        kind: Arc<StructureKind>,
        name: &str,
        index: usize,
    ) -> Result<String> {
        let mark = self.nodes.len();
        self.instantiate(group, &kind, name)?;
        self.nodes.truncate(mark);

        let actual = self.register(group, Arc::clone(&kind), false, true, index, name)?;
        tracing::debug!(
            group = %self.name_of(group),
            slot = %actual,
            kind = kind.name(),
            "Extended group with unplanned structure"
        );
        Ok(actual)
    }

    /// Repetition `rep` of slot `name`, created if `rep` is the next one.
    pub fn get_or_create(&mut self, group: StructureId, name: &str, rep: usize) -> Result<StructureId> {
        let item = self.item(group, name)?;
        let count = item.instances().len();
        if rep < count {
            return Ok(item.instances()[rep]);
        }
        if rep > count {
            return Err(Hl7Error::RepetitionGap {
                name: name.to_string(),
                requested: rep,
                available: count,
            });
        }
        if !item.is_repeating() && count > 0 {
            return Err(Hl7Error::NonRepeatingViolation {
                name: name.to_string(),
                rep,
            });
        }

        let kind = Arc::clone(item.kind());
        let id = self.instantiate(group, &kind, name)?;
        let group_name = self.structure(group)?.name.clone();
        self.group_mut(group)?
            .item_mut(name)
            .ok_or_else(|| Hl7Error::not_found(name, group_name))?
            .push(id);
        Ok(id)
    }

    /// First repetition of `name`, created if needed.
    pub fn get(&mut self, group: StructureId, name: &str) -> Result<StructureId> {
        self.get_or_create(group, name, 0)
    }

    /// Repetitions created so far; never creates any.
    pub fn get_all(&self, group: StructureId, name: &str) -> Result<Vec<StructureId>> {
        Ok(self.item(group, name)?.instances().to_vec())
    }

    pub fn names(&self, group: StructureId) -> Result<Vec<String>> {
        Ok(self.group(group)?.names().map(str::to_string).collect())
    }

    pub fn is_repeating(&self, group: StructureId, name: &str) -> Result<bool> {
        Ok(self.item(group, name)?.is_repeating())
    }

    pub fn is_required(&self, group: StructureId, name: &str) -> Result<bool> {
        Ok(self.item(group, name)?.is_required())
    }

    pub fn current_reps(&self, group: StructureId, name: &str) -> Result<usize> {
        Ok(self.item(group, name)?.instances().len())
    }

    pub fn kind_of(&self, group: StructureId, name: &str) -> Result<Arc<StructureKind>> {
        Ok(Arc::clone(self.item(group, name)?.kind()))
    }

    /// Bind the runtime-typed `value_field` of a segment from its
    /// `type_code_field`, using this message's version and factory.
    pub fn resolve_typed_field(
        &mut self,
        segment: StructureId,
        type_code_field: usize,
        value_field: usize,
    ) -> Result<()> {
        let factory = Arc::clone(&self.factory);
        let version = self.version.clone();
        let target = self.segment_mut(segment)?;
        crate::types::resolve_typed_field(
            target,
            version.as_deref(),
            factory.as_ref(),
            type_code_field,
            value_field,
        )
    }

    /// Serialisable snapshot of the subtree at `id`.
    pub fn summarize(&self, id: StructureId) -> Result<StructureSummary> {
        let structure = self.structure(id)?;
        let mut summary = StructureSummary {
            name: structure.name.clone(),
            category: structure.category,
            slots: Vec::new(),
            fields: Vec::new(),
        };
        match &structure.body {
            StructureBody::Group(group) => {
                for (name, item) in group.items() {
                    summary.slots.push(SlotSummary {
                        name: name.to_string(),
                        kind: item.kind().name().to_string(),
                        required: item.is_required(),
                        repeating: item.is_repeating(),
                        repetitions: item
                            .instances()
                            .iter()
                            .map(|child| self.summarize(*child))
                            .collect::<Result<Vec<_>>>()?,
                    });
                }
            }
            StructureBody::Segment(segment) => {
                for (index, item) in segment.items().iter().enumerate() {
                    summary.fields.push(FieldSummary::from_item(index + 1, item));
                }
            }
        }
        Ok(summary)
    }

    /// Instantiate `kind` as a new child of `parent`.
    ///
    /// Generic kinds take `name`; other kinds run their factory-aware
    /// constructor, or their default constructor when they have no
    /// factory-aware one. Nodes created by a failed attempt are discarded.
    fn instantiate(
        &mut self,
        parent: StructureId,
        kind: &StructureKind,
        name: &str,
    ) -> Result<StructureId> {
        let mark = self.nodes.len();
        let result = self.build(parent, kind, name);
        if result.is_err() {
            self.nodes.truncate(mark);
        }
        result
    }

    fn build(&mut self, parent: StructureId, kind: &StructureKind, name: &str) -> Result<StructureId> {
        match kind.category() {
            StructureCategory::GenericSegment => {
                let body =
                    StructureBody::Segment(Segment::generic(name, self.config.generic_field_length));
                Ok(self.push(name, parent, StructureCategory::GenericSegment, body))
            }
            StructureCategory::GenericGroup => Ok(self.push(
                name,
                parent,
                StructureCategory::GenericGroup,
                StructureBody::Group(Group::new()),
            )),
            category => {
                let body = match category {
                    StructureCategory::Group => StructureBody::Group(Group::new()),
                    _ => StructureBody::Segment(Segment::new(kind.name())),
                };
                let id = self.push(kind.name(), parent, category, body);
                self.construct(id, kind)
                    .map_err(|err| Hl7Error::instantiation(kind.name(), err))?;
                Ok(id)
            }
        }
    }

    fn construct(&mut self, id: StructureId, kind: &StructureKind) -> Result<()> {
        let factory = Arc::clone(&self.factory);
        if let Some(constructor) = kind.factory_constructor() {
            constructor(&mut StructureScope::new(self, id), factory.as_ref())
        } else if let Some(constructor) = kind.default_constructor() {
            constructor(&mut StructureScope::new(self, id))
        } else {
            Err(Hl7Error::application_internal(format!(
                "{} has no constructor",
                kind.name()
            )))
        }
    }

    fn push(
        &mut self,
        name: &str,
        parent: StructureId,
        category: StructureCategory,
        body: StructureBody,
    ) -> StructureId {
        let id = StructureId(self.nodes.len());
        self.nodes.push(Structure {
            name: name.to_string(),
            parent: Some(parent),
            category,
            body,
        });
        id
    }
}

/// What a structure constructor can do to the structure being built.
pub struct StructureScope<'a> {
    message: &'a mut Message,
    id: StructureId,
}

impl<'a> StructureScope<'a> {
    fn new(message: &'a mut Message, id: StructureId) -> Self {
        Self { message, id }
    }

    pub fn id(&self) -> StructureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.message.nodes[self.id.0].name
    }

    pub fn version(&self) -> Option<&str> {
        self.message.version()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.message.config
    }

    pub fn declare(
        &mut self,
        kind: Arc<StructureKind>,
        required: bool,
        repeating: bool,
    ) -> Result<String> {
        self.message.declare(self.id, kind, required, repeating)
    }

    pub fn register(
        &mut self,
        kind: Arc<StructureKind>,
        required: bool,
        repeating: bool,
        at_index: usize,
        name: &str,
    ) -> Result<String> {
        self.message
            .register(self.id, kind, required, repeating, at_index, name)
    }

    pub fn add_field(&mut self, decl: FieldDecl) -> Result<()> {
        self.message.segment_mut(self.id)?.add_field(decl)
    }

    pub fn extend_with_unplanned_segment(&mut self, name: &str) -> Result<String> {
        self.message.extend_with_unplanned_segment(self.id, name)
    }

    /// Apply the declaration policy to a failed schema declaration: log and
    /// continue while declarations are lenient, otherwise fail.
    pub fn tolerate<T>(&self, result: Result<T>, structure: &str, item: &str) -> Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(err) if self.message.config.lenient_declarations => {
                tracing::error!(
                    structure,
                    item,
                    error = %err,
                    "Unexpected error declaring schema item; it is left undeclared"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
