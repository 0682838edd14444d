//! CRUD façade over the store and its in-memory mirror.
//!
//! Writes always hit the store first. The repository and the chart are only
//! touched once the store reported success, so a failed write leaves the
//! in-memory view exactly as it was.

use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::{
    ChartSeries, DateRange, EntryFilter, EntryId, ExpenseEntry, ExpenseForm, LedgerRepository,
    LedgerStore, NewExpense, Price, ResultLedger, Window, filter,
};

const EVENT_CAPACITY: usize = 64;

/// Notification sent to subscribers after the ledger changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    Added(ExpenseEntry),
    Updated(ExpenseEntry),
    Deleted(EntryId),
    ChartSynced(EntryId),
    Reloaded,
}

#[derive(Debug)]
pub struct ExpenseService<S> {
    store: S,
    repository: LedgerRepository,
    chart: ChartSeries,
    events: broadcast::Sender<LedgerEvent>,
}

impl<S: LedgerStore> ExpenseService<S> {
    /// Load every row from `store` and build the view of all entries.
    pub async fn load(store: S) -> ResultLedger<Self> {
        let entries = store.select_all().await?;
        let chart = ChartSeries::new(&entries);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        tracing::info!(entries = entries.len(), total = %chart.total(), "ledger loaded");
        Ok(Self {
            store,
            repository: LedgerRepository::new(entries),
            chart,
            events,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entries(&self) -> &[ExpenseEntry] {
        self.repository.entries()
    }

    pub fn repository(&self) -> &LedgerRepository {
        &self.repository
    }

    pub fn chart(&self) -> &ChartSeries {
        &self.chart
    }

    pub fn total(&self) -> Price {
        self.chart.total()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Insert a new expense and mirror it in memory.
    pub async fn add(
        &mut self,
        entry_date: NaiveDate,
        item_name: impl Into<String>,
        item_price: Price,
    ) -> ResultLedger<ExpenseEntry> {
        self.add_expense(NewExpense::new(entry_date, item_name, item_price))
            .await
    }

    pub async fn add_expense(&mut self, expense: NewExpense) -> ResultLedger<ExpenseEntry> {
        let id = self.store.insert(&expense).await?;
        let entry = expense.into_entry(id);
        self.repository.push(entry.clone());
        self.chart.push(&entry);
        self.publish(LedgerEvent::Added(entry.clone()));
        Ok(entry)
    }

    /// Validate `form`, add its expense and clear it for the next one.
    ///
    /// On any error the form keeps its values.
    pub async fn submit(&mut self, form: &mut ExpenseForm) -> ResultLedger<ExpenseEntry> {
        let expense = form.commit()?;
        let entry = self.add_expense(expense).await?;
        form.clear();
        Ok(entry)
    }

    /// Write date, name and price of `entry` to its row.
    ///
    /// Returns the rows affected; `0` means no row has that id and nothing
    /// changed. The chart is left alone: call
    /// [`sync_chart_slice`](Self::sync_chart_slice) afterwards to refresh it.
    pub async fn update(&mut self, entry: &ExpenseEntry) -> ResultLedger<u64> {
        let rows = self.store.update(entry).await?;
        if rows == 0 {
            tracing::debug!(id = entry.id, "update matched no row");
            return Ok(0);
        }
        if self.repository.update_fields(entry).is_none() {
            tracing::warn!(id = entry.id, "updated row missing from memory, appending");
            self.repository.push(entry.clone());
        }
        self.publish(LedgerEvent::Updated(entry.clone()));
        Ok(rows)
    }

    /// Delete the row of `entry` and drop it from memory and the chart.
    ///
    /// Returns the rows affected; `0` is a silent no-op.
    pub async fn delete(&mut self, entry: &ExpenseEntry) -> ResultLedger<u64> {
        let rows = self.store.delete(entry.id).await?;
        if rows == 0 {
            tracing::debug!(id = entry.id, "delete matched no row");
            return Ok(0);
        }
        self.repository.remove(entry.id);
        self.chart.remove_entry(entry.id);
        self.publish(LedgerEvent::Deleted(entry.id));
        Ok(rows)
    }

    /// Refresh the chart slice of the repository entry with `entry.id`.
    ///
    /// The slice at the entry's position takes the name and price currently
    /// held by the repository. Unknown ids are ignored.
    pub fn sync_chart_slice(&mut self, entry: &ExpenseEntry) {
        let Some(position) = self.repository.position(entry.id) else {
            return;
        };
        let current = &self.repository.entries()[position];
        if !self.chart.set_at(position, current) {
            // Out of step with the repository: rebuild instead of guessing.
            self.chart.replace(self.repository.entries());
        }
        self.publish(LedgerEvent::ChartSynced(entry.id));
    }

    /// Entries dated `date`, read from the store.
    pub async fn filter_by_exact_date(&self, date: NaiveDate) -> ResultLedger<Vec<ExpenseEntry>> {
        self.store.select_where(EntryFilter::OnDate(date)).await
    }

    /// Entries of the in-memory snapshot dated within `[start, end]`.
    ///
    /// A reversed range matches nothing.
    pub fn filter_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<ExpenseEntry> {
        DateRange::new(start, end)
            .map(|range| filter::filter_by_date_range(self.entries(), range))
            .unwrap_or_default()
    }

    /// Fresh store snapshot of the entries inside `window`.
    ///
    /// The repository is not modified.
    pub async fn window_snapshot(
        &self,
        window: Window,
        today: NaiveDate,
    ) -> ResultLedger<Vec<ExpenseEntry>> {
        self.store
            .select_where(EntryFilter::Between(window.range(today)))
            .await
    }

    /// Reload every row from the store and rebuild the chart.
    pub async fn refresh(&mut self) -> ResultLedger<()> {
        let entries = self.store.select_all().await?;
        self.chart.replace(&entries);
        self.repository.replace_all(entries);
        self.publish(LedgerEvent::Reloaded);
        Ok(())
    }

    fn publish(&self, event: LedgerEvent) {
        // No subscriber is fine.
        let _ = self.events.send(event);
    }
}
