use serde::{Deserialize, Serialize};

use super::record::{
    KEY_COUNTRY, KEY_FUNCTION_GROUP, KEY_GROUP_ID, KEY_GROUP_NAME, KEY_JOB_NO, KEY_MEMBER_ID,
    KEY_VENDOR,
};

/// Grid engine configuration, supplied by the host at construction time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Group units requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Rows of lookahead before the end of loaded data that trigger a load
    #[serde(default = "default_lookahead")]
    pub lookahead_rows: usize,
    /// Binding keys whose cells must be non-empty to pass validation
    #[serde(default)]
    pub required_keys: Vec<String>,
    /// Identity keys rendered read-only
    #[serde(default = "default_readonly_keys")]
    pub readonly_keys: Vec<String>,
    /// The identity key carried on every record but never rendered per row
    /// (its value is shown on the group header instead)
    #[serde(default = "default_hidden_key")]
    pub hidden_key: String,
    #[serde(default)]
    pub status_table: StatusTable,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            page_size: default_page_size(),
            lookahead_rows: default_lookahead(),
            required_keys: Vec::new(),
            readonly_keys: default_readonly_keys(),
            hidden_key: default_hidden_key(),
            status_table: StatusTable::default(),
        }
    }
}

fn default_page_size() -> usize {
    50
}

fn default_lookahead() -> usize {
    10
}

fn default_readonly_keys() -> Vec<String> {
    [
        KEY_GROUP_NAME,
        KEY_JOB_NO,
        KEY_FUNCTION_GROUP,
        KEY_MEMBER_ID,
        KEY_VENDOR,
        KEY_COUNTRY,
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_hidden_key() -> String {
    KEY_GROUP_ID.to_string()
}

/// One entry of the enumerated status set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub code: String,
    pub label: String,
}

/// The fixed status code→label table. Pill colors are assigned by list
/// position modulo the palette length, so the table and palette can evolve
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTable {
    pub entries: Vec<StatusEntry>,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl Default for StatusTable {
    fn default() -> Self {
        let entries = [
            ("OPEN", "Open"),
            ("INQ", "Inquiry Sent"),
            ("PO", "PO Issued"),
            ("MFG", "In Manufacturing"),
            ("DLV", "Delivered"),
            ("CLO", "Closed"),
        ]
        .iter()
        .map(|(code, label)| StatusEntry {
            code: code.to_string(),
            label: label.to_string(),
        })
        .collect();
        StatusTable {
            entries,
            palette: default_palette(),
        }
    }
}

fn default_palette() -> Vec<String> {
    ["#4C78A8", "#F58518", "#54A24B", "#E45756", "#72B7B2"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Label and color for rendering one status pill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPill<'a> {
    pub label: &'a str,
    pub color: &'a str,
}

impl StatusTable {
    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    pub fn label(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.label.as_str())
    }

    /// The pill for a status code, or `None` for codes outside the table
    pub fn pill(&self, code: &str) -> Option<StatusPill<'_>> {
        let position = self.entries.iter().position(|e| e.code == code)?;
        if self.palette.is_empty() {
            return None;
        }
        Some(StatusPill {
            label: &self.entries[position].label,
            color: &self.palette[position % self.palette.len()],
        })
    }
}
