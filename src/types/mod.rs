pub mod composite;
pub mod datatype;
pub mod deep_copy;
pub mod extra_components;
pub mod primitive;
pub mod temporal;
pub mod varies;

pub use composite::Composite;
pub use datatype::{
    ConstructorArg, DatatypeDefinition, DatatypeShape, PrimitiveKind, Type, UNKNOWN_TYPE_NAME,
};
pub use extra_components::ExtraComponents;
pub use primitive::Primitive;
pub use temporal::{CommonDt, CommonTm, CommonTs};
pub use varies::{Varies, resolve_typed_field};
