//! Component-wise value copying between datatypes.
//!
//! Positions are addressed the way a terser addresses them: 1-based
//! component and sub-component numbers, where positions past a type's
//! declared shape land in its extra components. Only primitive values are
//! copied; the destination keeps its own shape.

use super::{Composite, Primitive, Type};
use crate::error::{Hl7Error, Result};

/// Copy every primitive value of `from` into the same position of `to`.
pub fn copy_value(from: &Type, to: &mut Type) -> Result<()> {
    for component in 1..=num_components(from) {
        for sub_component in 1..=num_sub_components(from, component) {
            let value = primitive(from, component, sub_component).and_then(Primitive::value);
            if let Some(value) = value {
                primitive_mut(to, component, sub_component)?.set_value(Some(value))?;
            }
        }
    }
    Ok(())
}

fn num_standard_components(value: &Type) -> usize {
    match value {
        Type::Primitive(_) => 1,
        Type::Composite(composite) => composite.len(),
        Type::Varies(varies) => num_standard_components(varies.data()),
    }
}

/// Declared plus extra components.
pub fn num_components(value: &Type) -> usize {
    match value {
        Type::Varies(varies) => num_components(varies.data()),
        other => num_standard_components(other) + other.extra_components().count(),
    }
}

pub fn num_sub_components(value: &Type, component_number: usize) -> usize {
    if component_number == 1 && matches!(value, Type::Primitive(_)) {
        return 1;
    }
    component(value, component_number).map_or(0, num_components)
}

/// Existing component `number` (1-based); never creates anything.
pub fn component(value: &Type, number: usize) -> Option<&Type> {
    if number == 0 {
        return None;
    }
    match value {
        Type::Varies(varies) => component(varies.data(), number),
        Type::Primitive(_) if number == 1 => Some(value),
        Type::Composite(composite) if number <= composite.len() || composite.is_generic() => {
            composite.component(number - 1)
        }
        other => other
            .extra_components()
            .get(number - num_standard_components(other) - 1)
            .map(|varies| varies.data()),
    }
}

/// Component `number` (1-based), creating it as needed.
///
/// A `Varies` still holding a generic primitive becomes a generic composite
/// when a component past the first is requested.
pub fn component_mut(value: &mut Type, number: usize) -> Result<&mut Type> {
    if number == 0 {
        return Err(Hl7Error::data_type("Component numbers start at 1"));
    }
    if number == 1 && matches!(value, Type::Primitive(_)) {
        return Ok(value);
    }
    if let Type::Varies(varies) = value {
        if number > 1 && varies.data().is_generic_primitive() {
            varies.rebind(Type::Composite(Composite::generic()))?;
        }
        return component_mut(varies.data_mut(), number);
    }
    let in_shape = matches!(
        value,
        Type::Composite(composite) if number <= composite.len() || composite.is_generic()
    );
    if in_shape {
        if let Type::Composite(composite) = value {
            return composite.component_mut(number - 1);
        }
    }
    let index = number - num_standard_components(value) - 1;
    Ok(value.extra_components_mut().component_at(index).data_mut())
}

fn first_primitive(value: &Type) -> Option<&Primitive> {
    match value {
        Type::Primitive(primitive) => Some(primitive),
        Type::Composite(composite) => first_primitive(composite.component(0)?),
        Type::Varies(varies) => first_primitive(varies.data()),
    }
}

fn first_primitive_mut(value: &mut Type) -> Result<&mut Primitive> {
    match value {
        Type::Primitive(primitive) => Ok(primitive),
        Type::Composite(composite) => first_primitive_mut(composite.component_mut(0)?),
        Type::Varies(varies) => first_primitive_mut(varies.data_mut()),
    }
}

pub fn primitive(value: &Type, component_number: usize, sub_component: usize) -> Option<&Primitive> {
    let outer = component(value, component_number)?;
    first_primitive(component(outer, sub_component)?)
}

pub fn primitive_mut(
    value: &mut Type,
    component_number: usize,
    sub_component: usize,
) -> Result<&mut Primitive> {
    let outer = component_mut(value, component_number)?;
    if sub_component > 1 {
        if let Type::Varies(varies) = outer {
            if varies.data().is_generic_primitive() {
                varies.rebind(Type::Composite(Composite::generic()))?;
            }
        }
    }
    first_primitive_mut(component_mut(outer, sub_component)?)
}
