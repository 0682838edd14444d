use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Parser;
use ledger::{ExpenseService, SqlStore};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};

use crate::{
    cli::{Cli, Command, LedgerCommand, MigrateAction},
    error::{AppError, Result},
    settings::Settings,
};

mod cli;
mod commands;
mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;

    let mut filter = format!(
        "budget_tracker={level},ledger={level}",
        level = settings.app.level
    );
    if settings.database.log_sql {
        filter.push_str(",sea_orm=debug,sqlx=info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let database = connect(&settings.database).await?;

    let command = match cli.command {
        Command::Migrate(args) => return migrate(&database, args.action).await,
        Command::Ledger(command) => command,
    };

    Migrator::up(&database, None).await?;
    let store = SqlStore::builder().database(database).build()?;
    let mut service = ExpenseService::load(store).await?;
    let mut events = service.subscribe();
    let today = today(settings.app.timezone.as_deref())?;

    let output = match command {
        LedgerCommand::Add(args) => commands::add(&mut service, args).await?,
        LedgerCommand::Update(args) => commands::update(&mut service, args).await?,
        LedgerCommand::Delete(args) => commands::delete(&mut service, args).await?,
        LedgerCommand::List(args) => commands::list(&service, &args)?,
        LedgerCommand::Report(args) => commands::report(&service, &args, today).await?,
        LedgerCommand::Range(args) => commands::range(&service, &args)?,
        LedgerCommand::On(args) => commands::on(&service, &args).await?,
    };

    while let Ok(event) = events.try_recv() {
        tracing::info!(?event, "ledger changed");
    }
    println!("{output}");

    Ok(())
}

/// Open the database described by `config`.
///
/// SQL statement logging is decided here, once, from the configuration.
async fn connect(config: &settings::Database) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url());
    options.sqlx_logging(config.log_sql);
    tracing::debug!(path = %config.path, "opening database");
    Ok(sea_orm::Database::connect(options).await?)
}

async fn migrate(database: &DatabaseConnection, action: MigrateAction) -> Result<()> {
    match action {
        MigrateAction::Up => Migrator::up(database, None).await?,
        MigrateAction::Down => Migrator::down(database, None).await?,
        MigrateAction::Fresh => Migrator::fresh(database).await?,
        MigrateAction::Status => Migrator::status(database).await?,
    }
    tracing::info!(?action, "migration done");
    Ok(())
}

fn today(timezone: Option<&str>) -> Result<NaiveDate> {
    match timezone {
        None => Ok(Local::now().date_naive()),
        Some(name) => {
            let tz: Tz = name
                .parse()
                .map_err(|_| AppError::Timezone(name.to_string()))?;
            Ok(Utc::now().with_timezone(&tz).date_naive())
        }
    }
}
