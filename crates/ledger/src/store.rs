//! Persistence boundary of the ledger.
//!
//! [`LedgerStore`] is the contract the service relies on; [`SqlStore`] fulfils
//! it with sea-orm. Every write goes through [`SqlStore::with_tx`], so a
//! failed write never leaves partial effects behind.

use std::{future::Future, pin::Pin};

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    Condition, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, IsolationLevel,
    QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{DateRange, EntryId, ExpenseEntry, LedgerError, NewExpense, ResultLedger, entry};

/// Predicate for [`LedgerStore::select_where`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryFilter {
    OnDate(NaiveDate),
    Between(DateRange),
}

impl EntryFilter {
    fn condition(self) -> Condition {
        match self {
            Self::OnDate(date) => Condition::all().add(entry::Column::EntryDate.eq(date)),
            Self::Between(range) => Condition::all()
                .add(entry::Column::EntryDate.gte(range.start()))
                .add(entry::Column::EntryDate.lte(range.end())),
        }
    }
}

/// Durable table of expense rows.
///
/// Rows come back ordered by id, which is insertion order.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a row and return the id the store generated for it.
    ///
    /// Prices past [`Price::MAX`](crate::Price::MAX) are refused with a
    /// validation error before anything is written.
    async fn insert(&self, row: &NewExpense) -> ResultLedger<EntryId>;

    /// Overwrite date, name and price of the row with `expense.id`.
    async fn update(&self, expense: &ExpenseEntry) -> ResultLedger<u64>;

    async fn delete(&self, id: EntryId) -> ResultLedger<u64>;

    async fn select_all(&self) -> ResultLedger<Vec<ExpenseEntry>>;

    async fn select_where(&self, filter: EntryFilter) -> ResultLedger<Vec<ExpenseEntry>>;
}

/// Future returned by a [`SqlStore::with_tx`] body.
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, DbErr>> + Send + 'c>>;

/// [`LedgerStore`] backed by a sea-orm connection.
#[derive(Clone, Debug)]
pub struct SqlStore {
    database: DatabaseConnection,
    isolation: Option<IsolationLevel>,
}

impl SqlStore {
    /// Return a builder for `SqlStore`. Help to build the struct.
    pub fn builder() -> SqlStoreBuilder {
        SqlStoreBuilder::default()
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Run `body` inside one database transaction.
    ///
    /// The transaction commits when `body` returns `Ok` and is rolled back
    /// when it returns `Err`. Any failure, including begin and commit, is
    /// reported as [`LedgerError::StoreWrite`].
    pub async fn with_tx<T, F>(&self, body: F) -> ResultLedger<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    {
        let db_tx = self
            .database
            .begin_with_config(self.isolation, None)
            .await
            .map_err(LedgerError::StoreWrite)?;

        match body(&db_tx).await {
            Ok(value) => {
                db_tx.commit().await.map_err(LedgerError::StoreWrite)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::warn!("rollback failed after write error: {rollback_err}");
                }
                Err(LedgerError::StoreWrite(err))
            }
        }
    }
}

#[async_trait]
impl LedgerStore for SqlStore {
    async fn insert(&self, row: &NewExpense) -> ResultLedger<EntryId> {
        row.item_price.storable()?;
        let model: entry::ActiveModel = row.into();
        let id = self
            .with_tx(move |db_tx| {
                Box::pin(async move {
                    let result = entry::Entity::insert(model).exec(db_tx).await?;
                    Ok(result.last_insert_id)
                })
            })
            .await?;
        tracing::debug!(id, name = %row.item_name, "inserted expense");
        Ok(id)
    }

    async fn update(&self, expense: &ExpenseEntry) -> ResultLedger<u64> {
        let id = expense.id;
        let entry_date = expense.entry_date;
        let name = expense.item_name.clone();
        let price = expense.item_price.storable()?.cents();
        let rows = self
            .with_tx(move |db_tx| {
                Box::pin(async move {
                    let result = entry::Entity::update_many()
                        .col_expr(entry::Column::EntryDate, Expr::value(entry_date))
                        .col_expr(entry::Column::Name, Expr::value(name))
                        .col_expr(entry::Column::Price, Expr::value(price))
                        .filter(entry::Column::Id.eq(id))
                        .exec(db_tx)
                        .await?;
                    Ok(result.rows_affected)
                })
            })
            .await?;
        tracing::debug!(id, rows, "updated expense");
        Ok(rows)
    }

    async fn delete(&self, id: EntryId) -> ResultLedger<u64> {
        let rows = self
            .with_tx(move |db_tx| {
                Box::pin(async move {
                    let result = entry::Entity::delete_by_id(id).exec(db_tx).await?;
                    Ok(result.rows_affected)
                })
            })
            .await?;
        tracing::debug!(id, rows, "deleted expense");
        Ok(rows)
    }

    async fn select_all(&self) -> ResultLedger<Vec<ExpenseEntry>> {
        let models = entry::Entity::find()
            .order_by_asc(entry::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(ExpenseEntry::from).collect())
    }

    async fn select_where(&self, filter: EntryFilter) -> ResultLedger<Vec<ExpenseEntry>> {
        let models = entry::Entity::find()
            .filter(filter.condition())
            .order_by_asc(entry::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(ExpenseEntry::from).collect())
    }
}

/// The builder for `SqlStore`
#[derive(Default)]
pub struct SqlStoreBuilder {
    database: Option<DatabaseConnection>,
    isolation: Option<IsolationLevel>,
}

impl SqlStoreBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> SqlStoreBuilder {
        self.database = Some(db);
        self
    }

    /// Override the isolation level requested for writes.
    pub fn isolation(mut self, level: IsolationLevel) -> SqlStoreBuilder {
        self.isolation = Some(level);
        self
    }

    /// Construct `SqlStore`
    ///
    /// Writes ask for `Serializable` unless told otherwise. SQLite transactions
    /// are already serializable and reject an explicit level, so none is sent
    /// there.
    pub fn build(self) -> ResultLedger<SqlStore> {
        let database = self.database.ok_or_else(|| {
            LedgerError::Database(DbErr::Custom("missing database connection".to_string()))
        })?;
        let isolation = match self.isolation {
            Some(level) => Some(level),
            None if database.get_database_backend() == DbBackend::Sqlite => None,
            None => Some(IsolationLevel::Serializable),
        };
        Ok(SqlStore {
            database,
            isolation,
        })
    }
}
