use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Binding keys of the fixed identity columns emitted before the dynamic tree
pub const KEY_GROUP_ID: &str = "GroupId";
pub const KEY_GROUP_NAME: &str = "GroupName";
pub const KEY_JOB_NO: &str = "JobNo";
pub const KEY_FUNCTION_GROUP: &str = "FunctionGroup";
pub const KEY_MEMBER_ID: &str = "MemberId";
pub const KEY_VENDOR: &str = "Vendor";
pub const KEY_COUNTRY: &str = "Country";
pub const KEY_STATUS: &str = "Status";

/// A scalar cell value. Absence is modeled by the key being absent from the
/// record, never by a sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Date and datetime values are carried as the raw server string
    Date(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::Date(s) => Some(s),
            CellValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True for blank text; numbers and dates are never empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

/// The identity of one row group, as exposed to group-row action handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupIdentity {
    pub group_id: String,
    pub group_name: String,
    pub job_no: String,
    pub function_group: String,
}

/// One flattened member row.
///
/// Identity fields are copied from the owning group at flatten time; dynamic
/// values live in `values`, keyed by the binding keys the schema compiler
/// produced. A record is only meaningful against its compiled column tree: a
/// value whose key has no leaf is never rendered, and a leaf with no value
/// renders empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    /// Stable per-row identity (`groupId:memberId`), for key-diffing renderers
    pub row_key: String,
    pub group_id: String,
    pub group_name: String,
    pub job_no: String,
    pub function_group: String,
    pub member_id: String,
    pub vendor: Option<String>,
    pub country: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub values: IndexMap<String, CellValue>,
}

impl RowRecord {
    /// Read a cell through one surface, whether the key names an identity
    /// field or a dynamic binding key. Returns `None` for absent values.
    pub fn get(&self, binding_key: &str) -> Option<CellValue> {
        match binding_key {
            KEY_GROUP_ID => Some(CellValue::Text(self.group_id.clone())),
            KEY_GROUP_NAME => Some(CellValue::Text(self.group_name.clone())),
            KEY_JOB_NO => Some(CellValue::Text(self.job_no.clone())),
            KEY_FUNCTION_GROUP => Some(CellValue::Text(self.function_group.clone())),
            KEY_MEMBER_ID => Some(CellValue::Text(self.member_id.clone())),
            KEY_VENDOR => self.vendor.clone().map(CellValue::Text),
            KEY_COUNTRY => self.country.clone().map(CellValue::Text),
            KEY_STATUS => self.status.clone().map(CellValue::Text),
            _ => self.values.get(binding_key).cloned(),
        }
    }

    /// The group identity this row belongs to
    pub fn group_identity(&self) -> GroupIdentity {
        GroupIdentity {
            group_id: self.group_id.clone(),
            group_name: self.group_name.clone(),
            job_no: self.job_no.clone(),
            function_group: self.function_group.clone(),
        }
    }
}
