use chrono::NaiveDate;

use crate::model::column::{CellKind, LeafColumn};
use crate::model::config::{GridConfig, StatusEntry};
use crate::model::record::{CellValue, KEY_COUNTRY, KEY_STATUS};
use crate::ops::store::{CommitError, GroupStore};
use crate::schema::keys::KEY_DELIMITER;

/// Date format committed by the date editor
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve the cell behavior for a binding key from its naming conventions.
///
/// Rule order: country flag, date marker, status, read-only identity set,
/// hidden group field, plain text. The compiler runs this once per leaf and
/// stores the result on the column; renderers should switch on that stored
/// tag rather than calling this per cell.
pub fn resolve_cell_kind(binding_key: &str, config: &GridConfig) -> CellKind {
    if binding_key == KEY_COUNTRY {
        return CellKind::CountryFlag;
    }
    if has_date_marker(binding_key) {
        return CellKind::DateEditor;
    }
    if binding_key == KEY_STATUS {
        return CellKind::StatusEditor;
    }
    if config.readonly_keys.iter().any(|k| k == binding_key) {
        return CellKind::ReadOnly;
    }
    if binding_key == config.hidden_key {
        return CellKind::Hidden;
    }
    CellKind::PlainText
}

fn has_date_marker(binding_key: &str) -> bool {
    binding_key
        .split(KEY_DELIMITER)
        .any(|segment| segment == "DATE" || segment == "DATETIME")
}

/// The kind to render for one concrete cell. Header cells are always plain
/// centered labels; editors degrade to read-only on group rows.
pub fn effective_cell_kind(leaf: &LeafColumn, is_header_cell: bool, is_group_row: bool) -> CellKind {
    if is_header_cell {
        return CellKind::ReadOnly;
    }
    if is_group_row
        && matches!(leaf.kind, CellKind::DateEditor | CellKind::StatusEditor)
    {
        return CellKind::ReadOnly;
    }
    leaf.kind
}

/// A country cell split into its ISO code prefix and display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagCell {
    /// Two-letter code, uppercased, keys the flag image
    pub code: String,
    /// Trailing country name, shown as the tooltip
    pub name: String,
}

impl FlagCell {
    /// Split a raw country value into code and name. Values shorter than the
    /// two-character code are unrenderable and yield `None`.
    pub fn from_value(value: &str) -> Option<FlagCell> {
        let trimmed = value.trim();
        if trimmed.len() < 2 || !trimmed.is_char_boundary(2) {
            return None;
        }
        let (code, rest) = trimmed.split_at(2);
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(FlagCell {
            code: code.to_ascii_uppercase(),
            name: rest.trim().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Editor sessions
// ---------------------------------------------------------------------------

/// One open date-picker. Selecting commits through the store and consumes the
/// session; dropping it (clicking outside) leaves the cell unchanged.
#[derive(Debug, Clone)]
pub struct DateEditSession {
    row_index: usize,
    binding_key: String,
    current: Option<NaiveDate>,
}

impl DateEditSession {
    pub fn open(
        store: &GroupStore,
        row_index: usize,
        binding_key: &str,
    ) -> Result<Self, CommitError> {
        let Some(row) = store.rows().get(row_index) else {
            return Err(CommitError::RowOutOfRange(row_index));
        };
        let current = row.get(binding_key).and_then(|value| {
            let text = value.as_text()?.to_string();
            NaiveDate::parse_from_str(&text, DATE_FORMAT).ok()
        });
        Ok(DateEditSession {
            row_index,
            binding_key: binding_key.to_string(),
            current,
        })
    }

    /// The value shown when the picker opens; `None` renders blank
    pub fn current(&self) -> Option<NaiveDate> {
        self.current
    }

    pub fn binding_key(&self) -> &str {
        &self.binding_key
    }

    /// Commit the picked date and close the session
    pub fn select(self, store: &mut GroupStore, date: NaiveDate) -> Result<(), CommitError> {
        store.commit_edit(
            self.row_index,
            &self.binding_key,
            CellValue::Date(date.format(DATE_FORMAT).to_string()),
        )
    }

    /// Close without committing
    pub fn cancel(self) {}
}

/// One open status dropdown, bound to the fixed status table
#[derive(Debug, Clone)]
pub struct StatusEditSession {
    row_index: usize,
    current: Option<String>,
    options: Vec<StatusEntry>,
}

impl StatusEditSession {
    pub fn open(store: &GroupStore, row_index: usize) -> Result<Self, CommitError> {
        let Some(row) = store.rows().get(row_index) else {
            return Err(CommitError::RowOutOfRange(row_index));
        };
        Ok(StatusEditSession {
            row_index,
            current: row.status.clone(),
            options: store.config().status_table.entries.clone(),
        })
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The selectable entries, in table order
    pub fn options(&self) -> &[StatusEntry] {
        &self.options
    }

    /// Commit the chosen code. Codes outside the status table are rejected by
    /// the store and the record stays unchanged.
    pub fn select(self, store: &mut GroupStore, code: &str) -> Result<(), CommitError> {
        store.commit_edit(self.row_index, KEY_STATUS, CellValue::Text(code.to_string()))
    }

    pub fn cancel(self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::header::PropertyType;
    use crate::model::rows::{DeliverableValues, MemberRow, NestedRowGroup, PropertyValue, TaskTracking};
    use crate::ops::store::{PageResponse, PageSource, PageRequest, TransportError};

    fn resolve(key: &str) -> CellKind {
        resolve_cell_kind(key, &GridConfig::default())
    }

    #[test]
    fn resolution_rule_order() {
        assert_eq!(resolve("Country"), CellKind::CountryFlag);
        assert_eq!(resolve("Status"), CellKind::StatusEditor);
        assert_eq!(resolve("Vendor"), CellKind::ReadOnly);
        assert_eq!(resolve("GroupId"), CellKind::Hidden);
        assert_eq!(resolve("D1_T1_DATE_P3"), CellKind::DateEditor);
        assert_eq!(resolve("D1_T1_DATETIME_P4"), CellKind::DateEditor);
        assert_eq!(resolve("D1_T1_INT_P1"), CellKind::PlainText);
        assert_eq!(resolve("Anything"), CellKind::PlainText);
    }

    #[test]
    fn date_marker_must_be_a_whole_segment() {
        // "DATEx" and "UPDATED" must not read as date columns
        assert_eq!(resolve("D1_T1_DATEX_P1"), CellKind::PlainText);
        assert_eq!(resolve("D1_UPDATED_P1"), CellKind::PlainText);
    }

    #[test]
    fn header_and_group_row_overrides() {
        let leaf = LeafColumn {
            header: "Planned".into(),
            binding_key: "T1_PLANNED".into(),
            width: 110,
            kind: CellKind::DateEditor,
            value_type: None,
        };
        assert_eq!(effective_cell_kind(&leaf, true, false), CellKind::ReadOnly);
        assert_eq!(effective_cell_kind(&leaf, false, true), CellKind::ReadOnly);
        assert_eq!(effective_cell_kind(&leaf, false, false), CellKind::DateEditor);
    }

    #[test]
    fn flag_cell_splits_code_and_name() {
        let flag = FlagCell::from_value("DE Germany").unwrap();
        assert_eq!(flag.code, "DE");
        assert_eq!(flag.name, "Germany");

        let bare = FlagCell::from_value("fr").unwrap();
        assert_eq!(bare.code, "FR");
        assert_eq!(bare.name, "");

        assert!(FlagCell::from_value("X").is_none());
        assert!(FlagCell::from_value("12 Nowhere").is_none());
    }

    /// One page with a single member row carrying a planned date
    struct OnePage;

    impl PageSource for OnePage {
        fn fetch_page(&mut self, _request: &PageRequest) -> Result<PageResponse, TransportError> {
            Ok(PageResponse {
                rows: vec![NestedRowGroup {
                    group_id: "PIP-1".into(),
                    group_name: "Package".into(),
                    job_no: "J-100".into(),
                    function_group: "FG-A".into(),
                    members: vec![MemberRow {
                        member_id: "AIP-1".into(),
                        vendor: None,
                        country: None,
                        status: Some("OPEN".into()),
                        deliverables: vec![DeliverableValues {
                            deliverable_id: "D1".into(),
                            task_id: "T1".into(),
                            properties: vec![PropertyValue {
                                property_id: "P1".into(),
                                kind: PropertyType::Int,
                                value: Some("5".into()),
                                children: Vec::new(),
                            }],
                        }],
                        task_tracking: vec![TaskTracking {
                            task_id: "T1".into(),
                            date_type: "PLANNED".into(),
                            date: Some("2025-06-01".into()),
                        }],
                    }],
                }],
                is_last: true,
            })
        }
    }

    fn loaded_store() -> GroupStore {
        let mut store = GroupStore::new("ds-1", GridConfig::default());
        store.load_more(&mut OnePage).unwrap();
        store
    }

    #[test]
    fn date_session_shows_current_and_commits_selection() {
        let mut store = loaded_store();
        let session = DateEditSession::open(&store, 0, "T1_PLANNED").unwrap();
        assert_eq!(
            session.current(),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );

        let picked = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        session.select(&mut store, picked).unwrap();
        assert_eq!(
            store.rows()[0].values.get("T1_PLANNED"),
            Some(&CellValue::Date("2025-07-15".into()))
        );
        assert!(store.has_edits());
    }

    #[test]
    fn date_session_opens_blank_on_empty_cell_and_cancel_changes_nothing() {
        let store = loaded_store();
        let session = DateEditSession::open(&store, 0, "T1_ACTUAL").unwrap();
        assert_eq!(session.current(), None);
        session.cancel();

        assert!(store.rows()[0].values.get("T1_ACTUAL").is_none());
        assert!(!store.has_edits());
    }

    #[test]
    fn status_session_lists_table_and_rejects_foreign_codes() {
        let mut store = loaded_store();
        let session = StatusEditSession::open(&store, 0).unwrap();
        assert_eq!(session.current(), Some("OPEN"));
        assert_eq!(session.options().len(), 6);
        assert_eq!(session.options()[0].code, "OPEN");

        let err = session
            .clone()
            .select(&mut store, "BOGUS")
            .unwrap_err();
        assert_eq!(err, CommitError::UnknownStatus("BOGUS".into()));
        assert_eq!(store.rows()[0].status.as_deref(), Some("OPEN"));

        session.select(&mut store, "MFG").unwrap();
        assert_eq!(store.rows()[0].status.as_deref(), Some("MFG"));
        assert!(store.has_edits());
    }

    #[test]
    fn sessions_on_missing_rows_fail_to_open() {
        let store = GroupStore::new("ds-1", GridConfig::default());
        assert!(DateEditSession::open(&store, 0, "T1_PLANNED").is_err());
        assert!(StatusEditSession::open(&store, 0).is_err());
    }
}
