//! The module contains the `ExpenseEntry` type, one row of the ledger.
//!
//! `Model` is the `expenses_entry` table as seen by sea-orm; `ExpenseEntry` is
//! the domain value handed to callers.
use core::fmt;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;

use crate::Price;

/// Identifier generated by the store on insert. Never reused.
pub type EntryId = i32;

/// A single expense in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseEntry {
    pub id: EntryId,
    pub entry_date: NaiveDate,
    pub item_name: String,
    pub item_price: Price,
}

impl fmt::Display for ExpenseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} {}",
            self.id, self.entry_date, self.item_name, self.item_price
        )
    }
}

/// An expense that has not been written to the store yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpense {
    pub entry_date: NaiveDate,
    pub item_name: String,
    pub item_price: Price,
}

impl NewExpense {
    pub fn new(entry_date: NaiveDate, item_name: impl Into<String>, item_price: Price) -> Self {
        Self {
            entry_date,
            item_name: item_name.into(),
            item_price,
        }
    }

    /// Attach the id generated by the store.
    pub fn into_entry(self, id: EntryId) -> ExpenseEntry {
        ExpenseEntry {
            id,
            entry_date: self.entry_date,
            item_name: self.item_name,
            item_price: self.item_price,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entry_date: Date,
    pub name: String,
    /// Cents.
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ExpenseEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            entry_date: model.entry_date,
            item_name: model.name,
            item_price: Price::new(model.price),
        }
    }
}

impl From<&NewExpense> for ActiveModel {
    fn from(entry: &NewExpense) -> Self {
        Self {
            id: ActiveValue::NotSet,
            entry_date: ActiveValue::Set(entry.entry_date),
            name: ActiveValue::Set(entry.item_name.clone()),
            price: ActiveValue::Set(entry.item_price.cents()),
        }
    }
}
