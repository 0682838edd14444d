//! Expense ledger: persistence, filtering and the derived chart view.
//!
//! [`ExpenseService`] is the entry point. It owns a [`LedgerStore`] (usually
//! a [`SqlStore`]), the in-memory [`LedgerRepository`] and the
//! [`ChartSeries`] of all entries. [`ReportView`] shows a named [`Window`]
//! of the ledger with its own chart.

pub use entry::{EntryId, ExpenseEntry, NewExpense};
pub use error::LedgerError;
pub use filter::{DateRange, Window};
pub use form::{ExpenseForm, FormValues};
pub use price::Price;
pub use report::ReportView;
pub use repository::LedgerRepository;
pub use service::{ExpenseService, LedgerEvent};
pub use store::{EntryFilter, LedgerStore, SqlStore, SqlStoreBuilder, TxFuture};
pub use view::{ChartSeries, ChartSlice, recompute};

mod entry;
mod error;
pub mod filter;
pub mod form;
mod price;
mod report;
mod repository;
mod service;
mod store;
mod view;

pub type ResultLedger<T> = Result<T, LedgerError>;
