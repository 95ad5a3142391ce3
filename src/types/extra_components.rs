use super::Varies;

/// Trailing components beyond a datatype's declared shape.
///
/// Locally defined sub-components are kept here instead of being dropped.
/// The store only grows: asking for component `i` creates every missing
/// component up to and including `i`.
#[derive(Debug, Clone, Default)]
pub struct ExtraComponents {
    components: Vec<Varies>,
}

impl ExtraComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Component `index` (0-based), creating placeholders as needed.
    pub fn component_at(&mut self, index: usize) -> &mut Varies {
        if self.components.len() <= index {
            self.components.resize_with(index + 1, Varies::new);
        }
        &mut self.components[index]
    }

    pub fn get(&self, index: usize) -> Option<&Varies> {
        self.components.get(index)
    }

    pub fn count(&self) -> usize {
        self.components.len()
    }

    /// True when no component carries a value.
    pub fn is_empty(&self) -> bool {
        self.components.iter().all(Varies::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Varies> {
        self.components.iter()
    }
}
