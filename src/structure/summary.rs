use serde::{Deserialize, Serialize};

use super::{SegmentItem, StructureCategory};

/// Snapshot of a structure subtree, for inspection and tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureSummary {
    pub name: String,
    pub category: StructureCategory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub name: String,
    pub kind: String,
    pub required: bool,
    pub repeating: bool,
    pub repetitions: Vec<StructureSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub number: usize,
    pub type_name: String,
    pub required: bool,
    /// `None` when unbounded.
    pub max_reps: Option<u32>,
    pub length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// First primitive value of each repetition.
    pub values: Vec<Option<String>>,
}

impl FieldSummary {
    pub fn from_item(number: usize, item: &SegmentItem) -> Self {
        Self {
            number,
            type_name: item.type_name().to_string(),
            required: item.is_required(),
            max_reps: (!item.is_unbounded()).then_some(item.max_reps()),
            length: item.length(),
            description: item.description().map(str::to_string),
            values: item
                .fields()
                .iter()
                .map(|field| field.first_value().map(str::to_string))
                .collect(),
        }
    }
}
