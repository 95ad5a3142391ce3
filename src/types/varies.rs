use super::{Primitive, Type, deep_copy};
use crate::error::{Hl7Error, Result};
use crate::provider::ModelClassFactory;
use crate::structure::Segment;

/// Field whose datatype is only known at runtime.
///
/// Starts out holding a generic primitive. Rebinding to the concrete type
/// copies any content already present, so a value set before the type was
/// known survives the switch.
#[derive(Debug, Clone)]
pub struct Varies {
    data: Box<Type>,
}

impl Default for Varies {
    fn default() -> Self {
        Self::new()
    }
}

impl Varies {
    pub fn new() -> Self {
        Self {
            data: Box::new(Type::Primitive(Primitive::generic())),
        }
    }

    pub fn type_name(&self) -> &str {
        self.data.type_name()
    }

    pub fn data(&self) -> &Type {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Type {
        &mut self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Replace the inner type with `new_type`.
    ///
    /// A composite, or a primitive holding a value, is deep-copied into
    /// `new_type` first. Copy failures leave the current data in place.
    pub fn rebind(&mut self, new_type: Type) -> Result<()> {
        let bound = self.bound_copy(new_type)?;
        self.replace(bound);
        Ok(())
    }

    /// `new_type` with this field's content copied into it.
    fn bound_copy(&self, mut new_type: Type) -> Result<Type> {
        let carries_content = match self.data.as_ref() {
            Type::Primitive(primitive) => primitive.value().is_some(),
            _ => true,
        };
        if carries_content {
            deep_copy::copy_value(&self.data, &mut new_type)?;
        }
        Ok(new_type)
    }

    fn replace(&mut self, new_type: Type) {
        tracing::debug!(
            from = self.data.type_name(),
            to = new_type.type_name(),
            "Rebinding varies"
        );
        *self.data = new_type;
    }
}

/// Bind every repetition of `value_field` to the datatype named by
/// `type_code_field`, the way OBX-5 is typed by OBX-2.
///
/// Field numbers are 1-based. A value without a type code is a
/// `RequiredFieldMissing` error; failing to resolve or build the datatype is
/// reported as `ApplicationInternal`. Repetitions are only rebound once every
/// one of them has been copied, so on error the field is left untouched.
pub fn resolve_typed_field(
    segment: &mut Segment,
    version: Option<&str>,
    factory: &dyn ModelClassFactory,
    type_code_field: usize,
    value_field: usize,
) -> Result<()> {
    let segment_name = segment.name().to_string();
    let type_code = segment
        .field(type_code_field, 0)?
        .and_then(Type::first_value)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    let Some(type_code) = type_code else {
        if segment.fields(value_field)?.iter().any(|field| !field.is_empty()) {
            return Err(Hl7Error::RequiredFieldMissing {
                message: format!(
                    "{segment_name}-{value_field} is valued, but {segment_name}-{type_code_field} is not. A datatype for {segment_name}-{value_field} must be specified using {segment_name}-{type_code_field}"
                ),
            });
        }
        return Ok(());
    };

    let Some(version) = version else {
        tracing::warn!(
            segment = %segment_name,
            type_code = %type_code,
            "Can't resolve a typed field on a message without a version"
        );
        return Err(Hl7Error::application_internal_with_source(
            format!("Can't resolve datatype {type_code} for {segment_name}"),
            Hl7Error::missing_version("resolve a runtime-typed field"),
        ));
    };

    let definition = factory.resolve_datatype(&type_code, version).map_err(|err| {
        Hl7Error::application_internal_with_source(
            format!("Can't resolve datatype {type_code} for version {version}"),
            err,
        )
    })?;

    let mut bound = Vec::new();
    for (rep, field) in segment.fields(value_field)?.iter().enumerate() {
        let varies = field.as_varies().ok_or_else(|| {
            Hl7Error::application_internal(format!(
                "{segment_name}-{value_field} repetition {rep} is not a runtime-typed field"
            ))
        })?;
        let new_type = definition.instantiate(&[]).map_err(|err| {
            Hl7Error::application_internal_with_source(
                format!("Can't instantiate datatype {type_code}"),
                err,
            )
        })?;
        bound.push(varies.bound_copy(new_type)?);
    }

    for (field, new_type) in segment.fields_mut(value_field)?.iter_mut().zip(bound) {
        if let Some(varies) = field.as_varies_mut() {
            varies.replace(new_type);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatatypeDefinition, PrimitiveKind};
    use std::sync::Arc;

    #[test]
    fn test_default_is_generic_primitive() {
        let varies = Varies::new();
        assert_eq!(varies.type_name(), "UNKNOWN");
        assert!(varies.data().is_generic_primitive());
        assert!(varies.is_empty());
    }

    #[test]
    fn test_rebind_keeps_value() {
        let mut varies = Varies::new();
        varies.data_mut().set_first_value(Some("19901012")).unwrap();

        let dt = Arc::new(DatatypeDefinition::primitive("DT", PrimitiveKind::Date));
        varies.rebind(dt.instantiate(&[]).unwrap()).unwrap();
        assert_eq!(varies.type_name(), "DT");
        assert_eq!(varies.data().first_value(), Some("19901012"));
    }

    #[test]
    fn test_rebind_empty_skips_copy() {
        let mut varies = Varies::new();
        let dt = Arc::new(DatatypeDefinition::primitive("DT", PrimitiveKind::Date));
        varies.rebind(dt.instantiate(&[]).unwrap()).unwrap();
        assert_eq!(varies.type_name(), "DT");
        assert_eq!(varies.data().first_value(), None);
    }

    #[test]
    fn test_rebind_failure_keeps_old_data() {
        let mut varies = Varies::new();
        varies.data_mut().set_first_value(Some("not a date")).unwrap();
        let dt = Arc::new(DatatypeDefinition::primitive("DT", PrimitiveKind::Date));
        let err = varies.rebind(dt.instantiate(&[]).unwrap()).unwrap_err();
        assert!(matches!(err, Hl7Error::DataType { .. }));
        assert_eq!(varies.type_name(), "UNKNOWN");
        assert_eq!(varies.data().first_value(), Some("not a date"));
    }
}
