use serde::{Deserialize, Serialize};

/// Offset-based "loaded so far" cursor.
///
/// `offset` only moves forward, by the number of group units received per
/// successful load (capped at `page_size`; short only on the final page).
/// `is_loading` is exclusive: no second load may begin while it is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub offset: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub is_loading: bool,
}

impl PageCursor {
    pub fn new(page_size: usize) -> Self {
        PageCursor {
            offset: 0,
            page_size,
            has_more: true,
            is_loading: false,
        }
    }
}

/// Stale-response token for one (header, row-source) pairing.
///
/// Every dataset reset mints the next version; a load completion carrying an
/// older token is dropped instead of being applied to the new dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetVersion(u64);

impl DatasetVersion {
    pub fn initial() -> Self {
        DatasetVersion(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        DatasetVersion(self.0 + 1)
    }
}
