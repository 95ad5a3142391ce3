//! # OctoFHIR HL7v2
//!
//! The object model of HL7 version 2.x messages: a tree of repeatable,
//! optionally required groups and segments holding typed fields, plus the
//! mechanisms that let a rigid, version-specific schema cope with real-world
//! messages.
//!
//! ## Features
//!
//! - **Structure tree**: arena-backed groups and segments with lazy
//!   repetitions and fetch-or-create access
//! - **Dynamic extension**: unknown segments (Z-segments) and groups become
//!   first-class slots at runtime, backed by generic structures
//! - **Runtime-typed fields**: `Varies` fields bound to a concrete datatype
//!   once a sibling type code is known, without losing earlier content
//! - **Extra components**: vendor-specific trailing components are kept
//! - **Temporal literals**: precision-aware TM, DT and TS parsing and
//!   formatting with timezone offsets and `chrono` conversion
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use octofhir_hl7v2::*;
//!
//! # fn example() -> Result<()> {
//! let factory: Arc<dyn ModelClassFactory> = Arc::new(SchemaRegistry::with_builtin_datatypes());
//! let table = GenericMessageTable::new();
//! let mut message = GenericMessage::create(&table, "2.5", factory)?;
//!
//! let root = message.root();
//! let name = message.extend_with_unplanned_segment(root, "ZPI")?;
//! let zpi = message.get(root, &name)?;
//! message
//!     .segment_mut(zpi)?
//!     .field_mut(3, 0)?
//!     .set_first_value(Some("local value"))?;
//!
//! let time = CommonTm::parse("235959+1100")?;
//! assert_eq!(time.value().as_deref(), Some("235959+1100"));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod provider;
pub mod structure;
pub mod types;

pub use crate::core::{Hl7Version, ModelConfig};
pub use error::{ErrorCode, Hl7Error, Result};
pub use provider::{CompositeFactory, ModelClassFactory, SchemaRegistry};
pub use structure::*;
pub use types::*;
