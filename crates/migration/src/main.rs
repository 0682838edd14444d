use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./app-budget-tracker.db?mode=rwc";
const USAGE: &str = "Usage: cargo run -p migration -- [up|down [steps]|fresh|status]";

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Up,
    /// Steps to roll back, one by default.
    Down(u32),
    Fresh,
    Status,
}

fn parse_action(mut args: impl Iterator<Item = String>) -> Option<Action> {
    let action = args.next();
    let steps = args.next();
    if args.next().is_some() {
        return None;
    }
    match (action.as_deref().unwrap_or("up"), steps) {
        ("up", None) => Some(Action::Up),
        ("down", None) => Some(Action::Down(1)),
        ("down", Some(steps)) => steps.parse().ok().map(Action::Down),
        ("fresh", None) => Some(Action::Fresh),
        ("status", None) => Some(Action::Status),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(action) = parse_action(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&url).await?;

    match action {
        Action::Up => migration::Migrator::up(&db, None).await?,
        Action::Down(steps) => migration::Migrator::down(&db, Some(steps)).await?,
        Action::Fresh => migration::Migrator::fresh(&db).await?,
        Action::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
