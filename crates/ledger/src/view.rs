//! Derived view of a visible entry set: one chart slice per entry plus the
//! running total.
//!
//! The series is always rebuilt from, or patched against, the entries it
//! mirrors. Slices carry the id of their entry so that two entries with the
//! same name never get confused.

use serde::Serialize;

use crate::{EntryId, ExpenseEntry, Price};

/// One entry's contribution to the pie breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub entry_id: EntryId,
    pub label: String,
    pub value: Price,
}

impl ChartSlice {
    /// Percentage of `total` this slice represents.
    ///
    /// Returns `None` when `total` is zero.
    pub fn share(&self, total: Price) -> Option<f64> {
        if total.is_zero() {
            return None;
        }
        Some(self.value.as_f64() / total.as_f64() * 100.0)
    }
}

impl From<&ExpenseEntry> for ChartSlice {
    fn from(entry: &ExpenseEntry) -> Self {
        Self {
            entry_id: entry.id,
            label: entry.item_name.clone(),
            value: entry.item_price,
        }
    }
}

/// Build the slices and total for `visible`.
///
/// Same entries in, same pair out. The total does not depend on the order of
/// `visible`.
pub fn recompute(visible: &[ExpenseEntry]) -> (Vec<ChartSlice>, Price) {
    let slices: Vec<ChartSlice> = visible.iter().map(ChartSlice::from).collect();
    let total = total_of(&slices);
    (slices, total)
}

fn total_of(slices: &[ChartSlice]) -> Price {
    match Price::checked_sum(slices.iter().map(|slice| slice.value)) {
        Some(total) => total,
        None => {
            tracing::warn!(slices = slices.len(), "total overflowed, resetting to zero");
            Price::ZERO
        }
    }
}

/// Slices and total kept aligned with a list of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    slices: Vec<ChartSlice>,
    total: Price,
}

impl ChartSeries {
    pub fn new(visible: &[ExpenseEntry]) -> Self {
        let (slices, total) = recompute(visible);
        Self { slices, total }
    }

    pub fn slices(&self) -> &[ChartSlice] {
        &self.slices
    }

    pub fn total(&self) -> Price {
        self.total
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Drop every slice and rebuild from `visible`.
    pub fn replace(&mut self, visible: &[ExpenseEntry]) {
        let (slices, total) = recompute(visible);
        self.slices = slices;
        self.total = total;
    }

    pub fn push(&mut self, entry: &ExpenseEntry) {
        self.slices.push(ChartSlice::from(entry));
        self.total = total_of(&self.slices);
    }

    /// Overwrite the slice at `position` with `entry`'s current name and price.
    ///
    /// Returns `false` when there is no slice at that position.
    pub fn set_at(&mut self, position: usize, entry: &ExpenseEntry) -> bool {
        let Some(slice) = self.slices.get_mut(position) else {
            return false;
        };
        *slice = ChartSlice::from(entry);
        self.total = total_of(&self.slices);
        true
    }

    /// Remove the slice belonging to entry `id`.
    pub fn remove_entry(&mut self, id: EntryId) -> Option<ChartSlice> {
        let position = self.slices.iter().position(|slice| slice.entry_id == id)?;
        let removed = self.slices.remove(position);
        self.total = total_of(&self.slices);
        Some(removed)
    }
}
