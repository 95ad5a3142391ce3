//! The message tree: groups and segments stored in a per-message arena.

pub mod generic;
pub mod group;
pub mod kind;
pub mod message;
pub mod segment;
pub mod summary;

pub use generic::{GENERIC_MESSAGE_NAME, GenericMessage, GenericMessageTable, GenericMessageVersion};
pub use group::{Group, GroupItem};
pub use kind::{
    ChildDecl, DefaultConstructor, FactoryConstructor, FieldDecl, StructureCategory, StructureKind,
};
pub use message::{Message, Structure, StructureBody, StructureId, StructureScope};
pub use segment::{Segment, SegmentItem};
pub use summary::{FieldSummary, SlotSummary, StructureSummary};
