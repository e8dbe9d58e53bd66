//! Reindex Trigger
//!
//! Detects a committed order key whose fractional part shows that repeated
//! midpoints have nearly used up the precision between two neighbors.

/// Default minimum fractional gap before a renumbering is requested
pub const DEFAULT_MIN_GAP: f64 = 0.0001;

/// Decides when a goal's task list needs a server-side renumbering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReindexTrigger {
    min_gap: f64,
}

impl Default for ReindexTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAP)
    }
}

impl ReindexTrigger {
    pub fn new(min_gap: f64) -> Self {
        Self { min_gap }
    }

    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// True if the key's nonzero fractional remainder is below the minimum gap
    pub fn should_reindex(&self, committed_order: f64) -> bool {
        if !committed_order.is_finite() {
            return true;
        }
        let fraction = committed_order.fract().abs();
        fraction > 0.0 && fraction < self.min_gap
    }
}
