use std::sync::Arc;

use super::FieldDecl;
use crate::error::{Hl7Error, Result};
use crate::types::{ConstructorArg, DatatypeDefinition, Type};

/// Metadata of one field slot plus the repetitions bound so far.
#[derive(Debug, Clone)]
pub struct SegmentItem {
    datatype: Arc<DatatypeDefinition>,
    required: bool,
    max_reps: u32,
    length: u32,
    args: Vec<ConstructorArg>,
    description: Option<String>,
    fields: Vec<Type>,
}

impl SegmentItem {
    pub fn new(decl: FieldDecl) -> Self {
        Self {
            datatype: decl.datatype,
            required: decl.required,
            max_reps: u32::try_from(decl.max_reps)
                .ok()
                .filter(|max| *max > 0)
                .unwrap_or(u32::MAX),
            length: decl.length,
            args: decl.args,
            description: decl.description,
            fields: Vec::new(),
        }
    }

    pub fn datatype(&self) -> &Arc<DatatypeDefinition> {
        &self.datatype
    }

    pub fn type_name(&self) -> &str {
        self.datatype.name()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// `u32::MAX` when unbounded.
    pub fn max_reps(&self) -> u32 {
        self.max_reps
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_reps == u32::MAX
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn constructor_args(&self) -> &[ConstructorArg] {
        &self.args
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn fields(&self) -> &[Type] {
        &self.fields
    }
}

/// Ordered field slots of a segment. Field numbers are 1-based.
#[derive(Debug, Clone)]
pub struct Segment {
    name: String,
    items: Vec<SegmentItem>,
    /// Set on generic segments, which grow `Varies` slots on access.
    generic_field_length: Option<u32>,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            generic_field_length: None,
        }
    }

    pub fn generic(name: impl Into<String>, field_length: u32) -> Self {
        Self {
            generic_field_length: Some(field_length),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_generic(&self) -> bool {
        self.generic_field_length.is_some()
    }

    pub fn add_field(&mut self, decl: FieldDecl) -> Result<()> {
        if !decl.datatype.accepts(&decl.args) {
            return Err(Hl7Error::application_internal(format!(
                "Can't add field {} to {}: {} does not take constructor arguments {:?}",
                self.items.len() + 1,
                self.name,
                decl.datatype.name(),
                decl.args
            )));
        }
        self.items.push(SegmentItem::new(decl));
        Ok(())
    }

    pub fn num_fields(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[SegmentItem] {
        &self.items
    }

    pub fn item(&self, number: usize) -> Result<&SegmentItem> {
        let count = self.items.len();
        number
            .checked_sub(1)
            .and_then(|index| self.items.get(index))
            .ok_or_else(|| self.missing_field(number, count))
    }

    pub fn item_mut(&mut self, number: usize) -> Result<&mut SegmentItem> {
        self.ensure_fields(number)?;
        let count = self.items.len();
        if number == 0 || number > count {
            return Err(self.missing_field(number, count));
        }
        Ok(&mut self.items[number - 1])
    }

    /// Repetitions of field `number` created so far.
    pub fn fields(&self, number: usize) -> Result<&[Type]> {
        if self.is_generic() && number > self.items.len() {
            return Ok(&[]);
        }
        Ok(self.item(number)?.fields())
    }

    pub fn fields_mut(&mut self, number: usize) -> Result<&mut [Type]> {
        Ok(&mut self.item_mut(number)?.fields)
    }

    /// Existing repetition `rep` of field `number`; never creates it.
    pub fn field(&self, number: usize, rep: usize) -> Result<Option<&Type>> {
        Ok(self.fields(number)?.get(rep))
    }

    /// Repetition `rep` of field `number`, created when `rep` is the next one.
    pub fn field_mut(&mut self, number: usize, rep: usize) -> Result<&mut Type> {
        let segment = self.name.clone();
        let item = self.item_mut(number)?;
        let count = item.fields.len();
        if rep > count {
            return Err(Hl7Error::RepetitionGap {
                name: format!("{segment}-{number}"),
                requested: rep,
                available: count,
            });
        }
        if rep == count {
            if !u32::try_from(rep).is_ok_and(|rep| rep < item.max_reps) {
                return Err(Hl7Error::NonRepeatingViolation {
                    name: format!("{segment}-{number}"),
                    rep,
                });
            }
            let field = item.datatype.instantiate(&item.args).map_err(|err| {
                Hl7Error::application_internal_with_source(
                    format!("Can't create {segment}-{number} of type {}", item.datatype.name()),
                    err,
                )
            })?;
            item.fields.push(field);
        }
        Ok(&mut item.fields[rep])
    }

    fn ensure_fields(&mut self, number: usize) -> Result<()> {
        let Some(length) = self.generic_field_length else {
            return Ok(());
        };
        let varies = Arc::new(DatatypeDefinition::varies());
        while self.items.len() < number {
            self.add_field(FieldDecl::new(Arc::clone(&varies), false, 0, length))?;
        }
        Ok(())
    }

    fn missing_field(&self, number: usize, count: usize) -> Hl7Error {
        Hl7Error::application_internal(format!(
            "Can't retrieve field {number} from segment {} - there are only {count} fields",
            self.name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    fn st() -> Arc<DatatypeDefinition> {
        Arc::new(DatatypeDefinition::primitive("ST", PrimitiveKind::Text))
    }

    #[test]
    fn test_non_positive_max_reps_is_unbounded() {
        let item = SegmentItem::new(FieldDecl::new(st(), false, 0, 10));
        assert_eq!(item.max_reps(), u32::MAX);
        let item = SegmentItem::new(FieldDecl::new(st(), false, -3, 10));
        assert!(item.is_unbounded());
        let item = SegmentItem::new(FieldDecl::new(st(), true, 2, 10));
        assert_eq!(item.max_reps(), 2);
    }

    #[test]
    fn test_field_fetch_or_create() {
        let mut segment = Segment::new("NTE");
        segment.add_field(FieldDecl::new(st(), false, 2, 80)).unwrap();

        assert!(segment.field(1, 0).unwrap().is_none());
        segment.field_mut(1, 0).unwrap().set_first_value(Some("a")).unwrap();
        assert_eq!(segment.field(1, 0).unwrap().unwrap().first_value(), Some("a"));
        segment.field_mut(1, 1).unwrap();
        assert_eq!(segment.fields(1).unwrap().len(), 2);

        assert!(matches!(
            segment.field_mut(1, 2),
            Err(Hl7Error::NonRepeatingViolation { rep: 2, .. })
        ));
        assert!(segment.field_mut(2, 0).is_err());
        assert!(segment.item(0).is_err());
    }

    #[test]
    fn test_field_repetition_gap() {
        let mut segment = Segment::new("NTE");
        segment.add_field(FieldDecl::new(st(), false, 0, 80)).unwrap();
        assert!(matches!(
            segment.field_mut(1, 2),
            Err(Hl7Error::RepetitionGap {
                requested: 2,
                available: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_generic_segment_grows_varies_fields() {
        let mut segment = Segment::generic("ZPI", 65536);
        assert_eq!(segment.num_fields(), 0);
        assert!(segment.fields(4).unwrap().is_empty());

        segment.field_mut(4, 0).unwrap().set_first_value(Some("x")).unwrap();
        assert_eq!(segment.num_fields(), 4);
        let item = segment.item(4).unwrap();
        assert_eq!(item.type_name(), "Varies");
        assert!(item.is_unbounded());
        assert_eq!(item.length(), 65536);
        assert_eq!(segment.field(4, 0).unwrap().unwrap().type_name(), "UNKNOWN");
    }

    #[test]
    fn test_description_is_mutable() {
        let mut segment = Segment::new("PID");
        segment
            .add_field(FieldDecl::new(st(), false, 1, 20).with_description("Set ID"))
            .unwrap();
        segment
            .item_mut(1)
            .unwrap()
            .set_description(Some("Set ID - PID".to_string()));
        assert_eq!(segment.item(1).unwrap().description(), Some("Set ID - PID"));
    }

    #[test]
    fn test_rejects_bad_constructor_args() {
        let mut segment = Segment::new("OBX");
        let err = segment
            .add_field(FieldDecl::new(st(), false, 1, 2).with_args(vec![ConstructorArg::Table(125)]))
            .unwrap_err();
        assert!(matches!(err, Hl7Error::ApplicationInternal { .. }));
        assert_eq!(segment.num_fields(), 0);
    }
}
