use crate::model::config::GridConfig;

/// Turns viewport notifications into load triggers.
///
/// Fires when the bottom visible row comes within `lookahead` rows of the end
/// of loaded data and no load is in flight. Repeated notifications for an
/// unchanged viewport (same bottom row over the same loaded total) are
/// deduplicated here, not in the store, so two rapid scroll events before the
/// first request resolves produce a single trigger.
#[derive(Debug, Clone, Default)]
pub struct ScrollController {
    lookahead: usize,
    last_seen: Option<(usize, usize)>,
}

impl ScrollController {
    pub fn new(lookahead: usize) -> Self {
        ScrollController {
            lookahead,
            last_seen: None,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.lookahead_rows)
    }

    /// Report the renderer's current viewport. Returns `true` when the host
    /// should call `load_more` on the store.
    pub fn on_viewport_change(
        &mut self,
        bottom_visible_row: usize,
        total_loaded_rows: usize,
        load_in_flight: bool,
    ) -> bool {
        let seen = (bottom_visible_row, total_loaded_rows);
        if self.last_seen == Some(seen) {
            return false;
        }
        self.last_seen = Some(seen);

        if load_in_flight {
            return false;
        }
        total_loaded_rows.saturating_sub(bottom_visible_row) <= self.lookahead
    }

    /// Forget the last viewport, e.g. after a dataset reset
    pub fn reset(&mut self) {
        self.last_seen = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
