use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::column::{self, ColumnNode, LeafColumn};
use crate::model::config::GridConfig;
use crate::model::record::CellValue;
use crate::ops::store::GroupStore;

/// Why a cell failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    MissingRequired,
    NotNumeric,
}

impl IssueReason {
    pub fn message(self) -> &'static str {
        match self {
            IssueReason::MissingRequired => "a value is required",
            IssueReason::NotNumeric => "value must be numeric",
        }
    }
}

/// One cell currently in error, suitable for rendering a highlight and
/// a user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellIssue {
    pub row_index: usize,
    pub binding_key: String,
    pub reason: IssueReason,
    pub message: String,
}

/// Full error-set snapshot produced by one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub invalid: Vec<CellIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Maintains the sparse set of (row, column) cells currently in error.
///
/// The tracker only flags and unflags; it never mutates row data, and
/// whether a non-empty error set blocks a save is the caller's policy.
#[derive(Debug, Default)]
pub struct ValidationTracker {
    errors: BTreeMap<(usize, String), IssueReason>,
}

impl ValidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every edited row against the required and numeric columns of
    /// the compiled tree. Newly invalid cells join the error set, cells that
    /// now pass leave it, and errors for rows that no longer exist are
    /// dropped. Running twice on unchanged data yields the same set.
    pub fn run(&mut self, store: &GroupStore, columns: &[ColumnNode]) -> ValidationReport {
        let config = store.config();
        let checked: Vec<&LeafColumn> = column::leaves(columns)
            .into_iter()
            .filter(|leaf| is_required(leaf, config) || is_numeric(leaf))
            .collect();

        self.errors.retain(|(row, _), _| *row < store.len());

        for (row_index, row) in store.edited_rows() {
            for leaf in &checked {
                let value = row.get(&leaf.binding_key);
                let verdict = check_cell(leaf, value.as_ref(), is_required(leaf, config));
                let key = (row_index, leaf.binding_key.clone());
                match verdict {
                    Some(reason) => {
                        self.errors.insert(key, reason);
                    }
                    None => {
                        self.errors.remove(&key);
                    }
                }
            }
        }

        self.report()
    }

    /// Snapshot of the current error set without re-validating
    pub fn report(&self) -> ValidationReport {
        let invalid = self
            .errors
            .iter()
            .map(|((row_index, binding_key), reason)| CellIssue {
                row_index: *row_index,
                binding_key: binding_key.clone(),
                reason: *reason,
                message: reason.message().to_string(),
            })
            .collect();
        ValidationReport { invalid }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render hint for one cell
    pub fn has_error(&self, row_index: usize, binding_key: &str) -> bool {
        self.errors
            .contains_key(&(row_index, binding_key.to_string()))
    }

    /// Drop all tracked errors, e.g. on dataset reset
    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

fn is_required(leaf: &LeafColumn, config: &GridConfig) -> bool {
    config.required_keys.iter().any(|k| k == &leaf.binding_key)
}

fn is_numeric(leaf: &LeafColumn) -> bool {
    leaf.value_type.is_some_and(|t| t.is_numeric())
}

fn check_cell(
    leaf: &LeafColumn,
    value: Option<&CellValue>,
    required: bool,
) -> Option<IssueReason> {
    let numeric = is_numeric(leaf);
    match value {
        None => required.then_some(IssueReason::MissingRequired),
        Some(v) if v.is_empty() => {
            if required {
                Some(IssueReason::MissingRequired)
            } else if numeric {
                Some(IssueReason::NotNumeric)
            } else {
                None
            }
        }
        Some(v) if numeric && !numeric_ok(v) => Some(IssueReason::NotNumeric),
        Some(_) => None,
    }
}

fn numeric_ok(value: &CellValue) -> bool {
    match value {
        CellValue::Number(n) => !n.is_nan(),
        CellValue::Text(s) => s.trim().parse::<f64>().is_ok(),
        CellValue::Date(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
