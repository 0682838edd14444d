//! In-memory mirror of the store's rows.
//!
//! Only the service mutates it, and only after the matching store write
//! succeeded.

use crate::{EntryId, ExpenseEntry};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerRepository {
    entries: Vec<ExpenseEntry>,
}

impl LedgerRepository {
    pub fn new(entries: Vec<ExpenseEntry>) -> Self {
        Self { entries }
    }

    /// Entries in store order.
    pub fn entries(&self) -> &[ExpenseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn get(&self, id: EntryId) -> Option<&ExpenseEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub(crate) fn replace_all(&mut self, entries: Vec<ExpenseEntry>) {
        self.entries = entries;
    }

    pub(crate) fn push(&mut self, entry: ExpenseEntry) {
        self.entries.push(entry);
    }

    /// Copy date, name and price from `entry` onto the stored entry with the
    /// same id. Returns the position that changed.
    pub(crate) fn update_fields(&mut self, entry: &ExpenseEntry) -> Option<usize> {
        let position = self.position(entry.id)?;
        let stored = &mut self.entries[position];
        stored.entry_date = entry.entry_date;
        stored.item_name.clone_from(&entry.item_name);
        stored.item_price = entry.item_price;
        Some(position)
    }

    pub(crate) fn remove(&mut self, id: EntryId) -> Option<ExpenseEntry> {
        let position = self.position(id)?;
        Some(self.entries.remove(position))
    }
}
