use serde::{Deserialize, Serialize};

use super::header::PropertyType;

/// One unit of paginated server row data: a group identity plus the member
/// rows belonging to it. Pagination counts these units, not member rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedRowGroup {
    pub group_id: String,
    pub group_name: String,
    pub job_no: String,
    pub function_group: String,
    #[serde(default)]
    pub members: Vec<MemberRow>,
}

/// One member row inside a group, before flattening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRow {
    pub member_id: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deliverables: Vec<DeliverableValues>,
    #[serde(default)]
    pub task_tracking: Vec<TaskTracking>,
}

/// The property values a member carries for one deliverable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableValues {
    pub deliverable_id: String,
    /// The owning task, needed to reconstruct the column binding key
    pub task_id: String,
    #[serde(default)]
    pub properties: Vec<PropertyValue>,
}

/// A single property value, optionally carrying child-property values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyValue {
    pub property_id: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub children: Vec<PropertyValue>,
}

/// A tracked task date on a member row (separate key namespace from
/// deliverable properties)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTracking {
    pub task_id: String,
    pub date_type: String,
    #[serde(default)]
    pub date: Option<String>,
}
