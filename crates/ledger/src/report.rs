//! Report over a named date window.
//!
//! The report owns its visible subset and its own chart series. Selecting a
//! window swaps all three wholesale and never touches the ledger itself.

use chrono::NaiveDate;

use crate::{ChartSeries, ExpenseEntry, ExpenseService, LedgerStore, Price, ResultLedger, Window};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportView {
    today: NaiveDate,
    window: Window,
    entries: Vec<ExpenseEntry>,
    chart: ChartSeries,
}

impl ReportView {
    /// Open the report on the [`Window::Today`] window.
    pub async fn open<S: LedgerStore>(
        service: &ExpenseService<S>,
        today: NaiveDate,
    ) -> ResultLedger<Self> {
        Self::open_on(service, today, Window::Today).await
    }

    /// Open the report directly on `window`, with a single store read.
    pub async fn open_on<S: LedgerStore>(
        service: &ExpenseService<S>,
        today: NaiveDate,
        window: Window,
    ) -> ResultLedger<Self> {
        let entries = service.window_snapshot(window, today).await?;
        Ok(Self {
            today,
            window,
            chart: ChartSeries::new(&entries),
            entries,
        })
    }

    /// Show `window`. On error the previous selection stays visible.
    pub async fn select<S: LedgerStore>(
        &mut self,
        service: &ExpenseService<S>,
        window: Window,
    ) -> ResultLedger<()> {
        let entries = service.window_snapshot(window, self.today).await?;
        self.chart.replace(&entries);
        self.entries = entries;
        self.window = window;
        tracing::debug!(
            window = %window,
            entries = self.entries.len(),
            total = %self.chart.total(),
            "report window selected"
        );
        Ok(())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn entries(&self) -> &[ExpenseEntry] {
        &self.entries
    }

    pub fn chart(&self) -> &ChartSeries {
        &self.chart
    }

    pub fn total(&self) -> Price {
        self.chart.total()
    }
}
