//! Editable draft of an expense, validated before it reaches the service.
//!
//! The form keeps the last committed values so unsaved edits can be rolled
//! back once. There is no deeper history.

use chrono::NaiveDate;

use crate::{EntryId, ExpenseEntry, LedgerError, NewExpense, Price, ResultLedger};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormValues {
    pub entry_date: Option<NaiveDate>,
    pub item_name: String,
    pub item_price: Option<Price>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub values: FormValues,
    committed: FormValues,
    editing: Option<EntryId>,
}

impl ExpenseForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing entry. Rolling back returns to these values.
    pub fn edit(entry: &ExpenseEntry) -> Self {
        let values = FormValues {
            entry_date: Some(entry.entry_date),
            item_name: entry.item_name.clone(),
            item_price: Some(entry.item_price),
        };
        Self {
            committed: values.clone(),
            values,
            editing: Some(entry.id),
        }
    }

    /// Id of the entry being edited, `None` for a new expense.
    pub fn editing(&self) -> Option<EntryId> {
        self.editing
    }

    pub fn set_date(&mut self, date: NaiveDate) -> &mut Self {
        self.values.entry_date = Some(date);
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.values.item_name = name.into();
        self
    }

    pub fn set_price(&mut self, price: Price) -> &mut Self {
        self.values.item_price = Some(price);
        self
    }

    /// `true` when the current values differ from the last committed ones.
    pub fn is_dirty(&self) -> bool {
        self.values != self.committed
    }

    /// Check the fields in display order and report the first problem.
    ///
    /// Name lengths are counted after trimming, the same text
    /// [`commit`](Self::commit) hands to the store.
    pub fn validate(&self) -> ResultLedger<()> {
        if self.values.entry_date.is_none() {
            return Err(invalid("The date entry cannot be blank"));
        }
        let name_len = self.values.item_name.trim().chars().count();
        if name_len == 0 {
            return Err(invalid("Field cannot be empty"));
        }
        if name_len < NAME_MIN_CHARS {
            return Err(invalid("Too short"));
        }
        if name_len > NAME_MAX_CHARS {
            return Err(invalid("Too long"));
        }
        match self.values.item_price {
            None => Err(invalid("Price cannot be blank")),
            Some(price) => price.storable().map(|_| ()),
        }
    }

    /// Validate and accept the current values.
    pub fn commit(&mut self) -> ResultLedger<NewExpense> {
        let expense = self.to_new_expense()?;
        self.committed = self.values.clone();
        Ok(expense)
    }

    /// Like [`commit`](Self::commit) but keeps the id of the edited entry.
    pub fn commit_update(&mut self) -> ResultLedger<ExpenseEntry> {
        let id = self
            .editing
            .ok_or_else(|| invalid("no entry is being edited"))?;
        Ok(self.commit()?.into_entry(id))
    }

    /// Discard unsaved edits.
    pub fn rollback(&mut self) {
        self.values = self.committed.clone();
    }

    /// Blank form, ready for the next expense.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_new_expense(&self) -> ResultLedger<NewExpense> {
        self.validate()?;
        match (self.values.entry_date, self.values.item_price) {
            (Some(entry_date), Some(item_price)) => Ok(NewExpense::new(
                entry_date,
                self.values.item_name.trim(),
                item_price,
            )),
            _ => Err(invalid("incomplete form")),
        }
    }
}

fn invalid(message: &str) -> LedgerError {
    LedgerError::Validation(message.to_string())
}
