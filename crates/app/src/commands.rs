//! One handler per subcommand. Handlers return the text to print.

use chrono::NaiveDate;
use ledger::{
    ChartSeries, ExpenseEntry, ExpenseForm, ExpenseService, LedgerError, LedgerStore, ReportView,
};
use serde::Serialize;

use crate::{
    cli::{AddArgs, DeleteArgs, ListArgs, OnArgs, RangeArgs, ReportArgs, UpdateArgs},
    error::Result,
};

pub async fn add<S: LedgerStore>(service: &mut ExpenseService<S>, args: AddArgs) -> Result<String> {
    let mut form = ExpenseForm::new();
    form.set_date(args.date)
        .set_name(args.name)
        .set_price(args.price);
    let entry = service.submit(&mut form).await?;
    Ok(format!("added {entry}\n{}", total_line(service.chart())))
}

pub async fn update<S: LedgerStore>(
    service: &mut ExpenseService<S>,
    args: UpdateArgs,
) -> Result<String> {
    let current = service
        .repository()
        .get(args.id)
        .ok_or_else(|| LedgerError::NotFound(format!("expense #{}", args.id)))?;

    let mut form = ExpenseForm::edit(current);
    if let Some(date) = args.date {
        form.set_date(date);
    }
    if let Some(name) = args.name {
        form.set_name(name);
    }
    if let Some(price) = args.price {
        form.set_price(price);
    }
    if !form.is_dirty() {
        return Ok(format!("nothing to change for #{}", args.id));
    }

    let entry = form.commit_update()?;
    let rows = service.update(&entry).await?;
    if rows == 0 {
        return Ok(format!("expense #{} no longer exists", args.id));
    }
    service.sync_chart_slice(&entry);
    Ok(format!("updated {entry}\n{}", total_line(service.chart())))
}

pub async fn delete<S: LedgerStore>(
    service: &mut ExpenseService<S>,
    args: DeleteArgs,
) -> Result<String> {
    let entry = service
        .repository()
        .get(args.id)
        .cloned()
        .ok_or_else(|| LedgerError::NotFound(format!("expense #{}", args.id)))?;
    let rows = service.delete(&entry).await?;
    if rows == 0 {
        return Ok(format!("expense #{} was already gone", args.id));
    }
    Ok(format!("deleted {entry}\n{}", total_line(service.chart())))
}

#[derive(Serialize)]
struct Listing<'a> {
    entries: &'a [ExpenseEntry],
    chart: &'a ChartSeries,
}

pub fn list<S: LedgerStore>(service: &ExpenseService<S>, args: &ListArgs) -> Result<String> {
    if args.json {
        let listing = Listing {
            entries: service.entries(),
            chart: service.chart(),
        };
        return Ok(serde_json::to_string_pretty(&listing)?);
    }
    Ok(render("All expenses", service.entries(), service.chart()))
}

pub async fn report<S: LedgerStore>(
    service: &ExpenseService<S>,
    args: &ReportArgs,
    today: NaiveDate,
) -> Result<String> {
    let today = args.today.unwrap_or(today);
    let report = ReportView::open_on(service, today, args.window).await?;

    if args.csv {
        return to_csv(report.entries());
    }
    let title = format!(
        "{} ({})",
        report.window(),
        report.window().range(report.today())
    );
    Ok(render(&title, report.entries(), report.chart()))
}

pub fn range<S: LedgerStore>(service: &ExpenseService<S>, args: &RangeArgs) -> Result<String> {
    let entries = service.filter_by_date_range(args.from, args.to);
    let chart = ChartSeries::new(&entries);
    Ok(render(
        &format!("From {} to {}", args.from, args.to),
        &entries,
        &chart,
    ))
}

pub async fn on<S: LedgerStore>(service: &ExpenseService<S>, args: &OnArgs) -> Result<String> {
    let entries = service.filter_by_exact_date(args.date).await?;
    let chart = ChartSeries::new(&entries);
    Ok(render(&format!("On {}", args.date), &entries, &chart))
}

fn to_csv(entries: &[ExpenseEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    for entry in entries {
        writer.serialize(entry)?;
    }
    let data = writer
        .into_inner()
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn total_line(chart: &ChartSeries) -> String {
    format!("Total Expenses: $ {}", chart.total())
}

/// Table of entries followed by the pie breakdown and the total.
pub fn render(title: &str, entries: &[ExpenseEntry], chart: &ChartSeries) -> String {
    let mut lines = vec![title.to_string()];
    if entries.is_empty() {
        lines.push("  (no expenses)".to_string());
    }
    lines.extend(entries.iter().map(|entry| {
        format!(
            "  {:>5}  {}  {:<50}  {:>12}",
            entry.id,
            entry.entry_date,
            entry.item_name,
            entry.item_price.to_string()
        )
    }));
    lines.extend(
        chart
            .slices()
            .iter()
            .map(|slice| match slice.share(chart.total()) {
                Some(share) => format!("  {:<50}  {share:>6.2}%", slice.label),
                None => format!("  {:<50}  {:>7}", slice.label, "-"),
            }),
    );
    lines.push(total_line(chart));
    lines.join("\n")
}
