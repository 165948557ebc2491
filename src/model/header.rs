use serde::{Deserialize, Serialize};

/// Primitive type tag carried by every deliverable property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    Int,
    Float,
    Text,
    Unit,
    Date,
    DateTime,
}

impl PropertyType {
    /// The wire spelling, used as the type segment inside binding keys
    pub fn code(self) -> &'static str {
        match self {
            PropertyType::Int => "INT",
            PropertyType::Float => "FLOAT",
            PropertyType::Text => "TEXT",
            PropertyType::Unit => "UNIT",
            PropertyType::Date => "DATE",
            PropertyType::DateTime => "DATETIME",
        }
    }

    /// Whether values of this type are numbers after flattening
    pub fn is_numeric(self) -> bool {
        matches!(self, PropertyType::Int | PropertyType::Float)
    }

    /// Whether this type denotes a calendar value
    pub fn is_date(self) -> bool {
        matches!(self, PropertyType::Date | PropertyType::DateTime)
    }
}

/// The server-supplied column hierarchy for one dataset version.
///
/// The wire shape is a plain JSON array of milestones; everything below a
/// milestone is nested inside it. Child properties nest exactly one level:
/// the `children` of a child property are never populated by the server and
/// are ignored if present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderDescription {
    pub milestones: Vec<Milestone>,
}

/// Top-level grouping of the header hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub tasks: Vec<Task>,
}

/// A task under a milestone: tracked dates plus deliverables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date_categories: Vec<DateCategory>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
}

/// One tracked date column under a task (e.g. planned/forecast/actual)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateCategory {
    /// Column label shown in the header
    pub category: String,
    /// Date-type code, the second half of the column's binding key
    pub date_type: String,
}

/// A deliverable under a task, carrying the properties that become leaf columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// A deliverable property. With `children` present it compiles to a group
/// of child leaves instead of a single leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default)]
    pub children: Vec<Property>,
}
