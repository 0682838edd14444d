use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ledger::{EntryId, Price, Window};

#[derive(Parser, Debug)]
#[command(name = "budget_tracker")]
#[command(about = "Keep track of expenses in a local ledger")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override the database file (`:memory:` for a throwaway ledger).
    #[arg(long)]
    pub database: Option<String>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,
    /// Log every SQL statement.
    #[arg(long)]
    pub log_sql: bool,
    /// Override timezone (IANA name) used to compute today.
    #[arg(long)]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the database schema.
    Migrate(MigrateArgs),
    #[command(flatten)]
    Ledger(LedgerCommand),
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Add an expense.
    Add(AddArgs),
    /// Change date, name or price of an expense.
    Update(UpdateArgs),
    /// Delete an expense.
    Delete(DeleteArgs),
    /// Show every expense with its chart and total.
    List(ListArgs),
    /// Show the expenses of a named window.
    Report(ReportArgs),
    /// Show the expenses between two dates (inclusive).
    Range(RangeArgs),
    /// Show the expenses of a single day.
    On(OnArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub name: String,
    #[arg(long, allow_hyphen_values = true)]
    pub price: Price,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[arg(long)]
    pub id: EntryId,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub price: Option<Price>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(long)]
    pub id: EntryId,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(long, default_value = "today")]
    pub window: Window,
    /// Reference date, defaults to the current day.
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Print the visible entries as CSV.
    #[arg(long)]
    pub csv: bool,
}

#[derive(Args, Debug)]
pub struct RangeArgs {
    #[arg(long)]
    pub from: NaiveDate,
    #[arg(long)]
    pub to: NaiveDate,
}

#[derive(Args, Debug)]
pub struct OnArgs {
    #[arg(long)]
    pub date: NaiveDate,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[arg(value_enum, default_value_t = MigrateAction::Up)]
    pub action: MigrateAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MigrateAction {
    Up,
    Down,
    Fresh,
    Status,
}
