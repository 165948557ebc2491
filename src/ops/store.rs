use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;

use crate::model::column::ColumnNode;
use crate::model::config::GridConfig;
use crate::model::cursor::{DatasetVersion, PageCursor};
use crate::model::header::HeaderDescription;
use crate::model::record::{CellValue, GroupIdentity, RowRecord, KEY_STATUS};
use crate::model::rows::NestedRowGroup;
use crate::ops::flatten::flatten_groups;
use crate::schema::compiler::{compile, SchemaError};

// ---------------------------------------------------------------------------
// Transport boundary
// ---------------------------------------------------------------------------

/// Which collaborator call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOp {
    Header,
    Page,
    Submit,
}

impl fmt::Display for TransportOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportOp::Header => write!(f, "header fetch"),
            TransportOp::Page => write!(f, "page fetch"),
            TransportOp::Submit => write!(f, "submit"),
        }
    }
}

/// A failed collaborator call. Recoverable: the store is always left in a
/// state where the caller may simply retry.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct TransportError {
    pub operation: TransportOp,
    pub message: String,
}

impl TransportError {
    pub fn header(message: impl Into<String>) -> Self {
        TransportError {
            operation: TransportOp::Header,
            message: message.into(),
        }
    }

    pub fn page(message: impl Into<String>) -> Self {
        TransportError {
            operation: TransportOp::Page,
            message: message.into(),
        }
    }

    pub fn submit(message: impl Into<String>) -> Self {
        TransportError {
            operation: TransportOp::Submit,
            message: message.into(),
        }
    }
}

/// One-shot header source for a dataset
pub trait HeaderSource {
    fn fetch_header(&mut self, dataset_id: &str) -> Result<HeaderDescription, TransportError>;
}

/// Paginated row source. An empty `rows` array signals end-of-data even when
/// `is_last` was not set.
pub trait PageSource {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResponse, TransportError>;
}

/// Save target for edited rows
pub trait SubmitSink {
    fn submit_edits(&mut self, rows: &[RowRecord]) -> Result<SubmitReceipt, TransportError>;
}

/// A load the store has begun; hand it back to `complete_load` together with
/// the transport result. Carries the dataset version so late completions for
/// a superseded dataset can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub dataset_id: String,
    pub version: DatasetVersion,
    pub offset: usize,
    pub page_size: usize,
}

/// One fetched page of nested row groups
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub rows: Vec<NestedRowGroup>,
    pub is_last: bool,
}

/// Server acknowledgement for a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub message: String,
}

/// What a completed `load_more`/`complete_load` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was applied: `groups` units advanced the cursor and flattened
    /// into `rows` member records
    Loaded { groups: usize, rows: usize },
    /// Nothing to do: a load was in flight or the dataset is exhausted
    Skipped,
    /// The page belonged to a superseded dataset version and was dropped
    Stale,
}

/// A rejected cell-edit commit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("row index {0} is out of range")]
    RowOutOfRange(usize),
    #[error("column {0:?} is read-only")]
    ReadOnlyColumn(String),
    #[error("status code {0:?} is not in the status table")]
    UnknownStatus(String),
}

/// Header-fetch-and-compile failure
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Fetch and compile the column tree for one dataset version
pub fn fetch_columns(
    source: &mut dyn HeaderSource,
    dataset_id: &str,
    config: &GridConfig,
) -> Result<Vec<ColumnNode>, GridError> {
    let header = source.fetch_header(dataset_id)?;
    Ok(compile(&header, config)?)
}

// ---------------------------------------------------------------------------
// Group store
// ---------------------------------------------------------------------------

/// One cluster of member rows sharing a group id, in loaded-row order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    pub identity: GroupIdentity,
    /// Indices into the store's row list, in first-appearance order
    pub row_indices: Vec<usize>,
}

/// The single owner of all flattened row records for one dataset version.
///
/// Loading is cooperative and two-phase: `begin_load` claims the cursor and
/// yields a request, the host performs the fetch however it likes, and
/// `complete_load` applies the result. A request whose version token no
/// longer matches (the dataset was reset in between) is dropped. `load_more`
/// wraps both phases around a synchronous `PageSource`.
///
/// Renderers never mutate records; every edit goes through `commit_edit`,
/// which is what keeps the edited-row accounting correct for `submit`.
#[derive(Debug, Clone)]
pub struct GroupStore {
    dataset_id: String,
    config: GridConfig,
    version: DatasetVersion,
    cursor: PageCursor,
    rows: Vec<RowRecord>,
    edited: BTreeSet<usize>,
}

impl GroupStore {
    pub fn new(dataset_id: impl Into<String>, config: GridConfig) -> Self {
        let cursor = PageCursor::new(config.page_size);
        GroupStore {
            dataset_id: dataset_id.into(),
            config,
            version: DatasetVersion::initial(),
            cursor,
            rows: Vec::new(),
            edited: BTreeSet::new(),
        }
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn version(&self) -> DatasetVersion {
        self.version
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Claim the cursor for a load. `None` while a load is in flight or the
    /// dataset is exhausted; that second trigger is dropped, never queued.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.cursor.is_loading || !self.cursor.has_more {
            return None;
        }
        self.cursor.is_loading = true;
        Some(PageRequest {
            dataset_id: self.dataset_id.clone(),
            version: self.version,
            offset: self.cursor.offset,
            page_size: self.cursor.page_size,
        })
    }

    /// Apply the result of a load begun with `begin_load`.
    ///
    /// On transport failure the cursor is left retryable: `is_loading` is
    /// cleared, `has_more` untouched, and the error is returned to the
    /// caller. Already-loaded rows are never corrupted.
    pub fn complete_load(
        &mut self,
        request: PageRequest,
        result: Result<PageResponse, TransportError>,
    ) -> Result<LoadOutcome, TransportError> {
        if request.version != self.version {
            tracing::debug!(
                dataset = %request.dataset_id,
                offset = request.offset,
                "dropping stale page for superseded dataset"
            );
            return Ok(LoadOutcome::Stale);
        }

        self.cursor.is_loading = false;
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(offset = request.offset, error = %e, "page load failed");
                return Err(e);
            }
        };

        let groups = page.rows.len().min(self.cursor.page_size);
        let mut appended = flatten_groups(&page.rows);
        let appended_rows = appended.len();
        self.cursor.offset += groups;
        self.cursor.has_more = !page.is_last && !page.rows.is_empty();
        self.rows.append(&mut appended);

        tracing::debug!(
            offset = self.cursor.offset,
            rows = appended_rows,
            has_more = self.cursor.has_more,
            "page applied"
        );
        Ok(LoadOutcome::Loaded {
            groups,
            rows: appended_rows,
        })
    }

    /// Begin, fetch, and complete one load against a synchronous source
    pub fn load_more(&mut self, source: &mut dyn PageSource) -> Result<LoadOutcome, TransportError> {
        let Some(request) = self.begin_load() else {
            return Ok(LoadOutcome::Skipped);
        };
        let result = source.fetch_page(&request);
        self.complete_load(request, result)
    }

    /// Switch to a new dataset: rows, edits, and the cursor are discarded and
    /// the version token advances so in-flight loads complete as stale.
    pub fn reset(&mut self, dataset_id: impl Into<String>) {
        self.dataset_id = dataset_id.into();
        self.version = self.version.next();
        self.cursor = PageCursor::new(self.config.page_size);
        self.rows.clear();
        self.edited.clear();
        tracing::debug!(dataset = %self.dataset_id, "dataset reset");
    }

    /// Cluster loaded rows by group id, in first-appearance order. Member
    /// indices are listed per group, so rows of one group always render
    /// contiguously under its header even when later pages appended members
    /// to a group loaded earlier.
    pub fn grouped(&self) -> Vec<RowGroup> {
        let mut groups: IndexMap<String, RowGroup> = IndexMap::new();
        for (index, row) in self.rows.iter().enumerate() {
            groups
                .entry(row.group_id.clone())
                .or_insert_with(|| RowGroup {
                    identity: row.group_identity(),
                    row_indices: Vec::new(),
                })
                .row_indices
                .push(index);
        }
        groups.into_values().collect()
    }

    /// Generic partition of loaded rows by an arbitrary grouping key,
    /// preserving first-appearance order of the key
    pub fn grouped_by<K, F>(&self, key_fn: F) -> IndexMap<K, Vec<usize>>
    where
        K: std::hash::Hash + Eq,
        F: Fn(&RowRecord) -> K,
    {
        let mut groups: IndexMap<K, Vec<usize>> = IndexMap::new();
        for (index, row) in self.rows.iter().enumerate() {
            groups.entry(key_fn(row)).or_default().push(index);
        }
        groups
    }

    /// The only mutation path for cell values. Status commits are checked
    /// against the status table; identity columns reject edits outright.
    pub fn commit_edit(
        &mut self,
        row_index: usize,
        binding_key: &str,
        value: CellValue,
    ) -> Result<(), CommitError> {
        if row_index >= self.rows.len() {
            return Err(CommitError::RowOutOfRange(row_index));
        }
        if binding_key == self.config.hidden_key
            || self.config.readonly_keys.iter().any(|k| k == binding_key)
        {
            return Err(CommitError::ReadOnlyColumn(binding_key.to_string()));
        }

        if binding_key == KEY_STATUS {
            let Some(code) = value.as_text() else {
                return Err(CommitError::UnknownStatus(format!("{value:?}")));
            };
            if !self.config.status_table.contains(code) {
                return Err(CommitError::UnknownStatus(code.to_string()));
            }
            self.rows[row_index].status = Some(code.to_string());
        } else {
            self.rows[row_index]
                .values
                .insert(binding_key.to_string(), value);
        }

        self.edited.insert(row_index);
        Ok(())
    }

    /// Indices and records of rows edited since the last successful submit
    pub fn edited_rows(&self) -> Vec<(usize, &RowRecord)> {
        self.edited.iter().map(|&i| (i, &self.rows[i])).collect()
    }

    pub fn has_edits(&self) -> bool {
        !self.edited.is_empty()
    }

    /// Clones of all edited rows, in row order
    pub fn edited_snapshot(&self) -> Vec<RowRecord> {
        self.edited.iter().map(|&i| self.rows[i].clone()).collect()
    }

    /// Send every edited row to the sink. Success clears the edited set;
    /// failure leaves it intact so the save can be retried.
    pub fn submit(&mut self, sink: &mut dyn SubmitSink) -> Result<SubmitReceipt, TransportError> {
        let snapshot = self.edited_snapshot();
        let receipt = match sink.submit_edits(&snapshot) {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(rows = snapshot.len(), error = %e, "submit failed, edits retained");
                return Err(e);
            }
        };
        self.edited.clear();
        tracing::debug!(rows = snapshot.len(), "edits submitted");
        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
