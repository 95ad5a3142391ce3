use indexmap::IndexMap;
use std::sync::Arc;

use super::{StructureId, StructureKind};

/// A named child slot of a group and the repetitions created so far.
#[derive(Debug, Clone)]
pub struct GroupItem {
    kind: Arc<StructureKind>,
    required: bool,
    repeating: bool,
    instances: Vec<StructureId>,
}

impl GroupItem {
    pub fn new(kind: Arc<StructureKind>, required: bool, repeating: bool) -> Self {
        Self {
            kind,
            required,
            repeating,
            instances: Vec::new(),
        }
    }

    pub fn kind(&self) -> &Arc<StructureKind> {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    pub fn instances(&self) -> &[StructureId] {
        &self.instances
    }

    pub(crate) fn push(&mut self, id: StructureId) {
        self.instances.push(id);
    }
}

/// Ordered, name-addressed child slots.
#[derive(Debug, Clone, Default)]
pub struct Group {
    items: IndexMap<String, GroupItem>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, name: &str) -> Option<&GroupItem> {
        self.items.get(name)
    }

    pub(crate) fn item_mut(&mut self, name: &str) -> Option<&mut GroupItem> {
        self.items.get_mut(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &GroupItem)> {
        self.items.iter().map(|(name, item)| (name.as_str(), item))
    }

    /// `name`, or `name` followed by the first free number starting at 2.
    pub fn unique_name(&self, name: &str) -> String {
        if !self.items.contains_key(name) {
            return name.to_string();
        }
        (2..)
            .map(|suffix| format!("{name}{suffix}"))
            .find(|candidate| !self.items.contains_key(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    /// Caller guarantees `index <= len()` and that `name` is unused.
    pub(crate) fn insert(&mut self, index: usize, name: String, item: GroupItem) {
        self.items.shift_insert(index, name, item);
    }
}
