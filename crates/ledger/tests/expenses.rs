use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

use ledger::{
    EntryFilter, EntryId, ExpenseEntry, ExpenseForm, ExpenseService, LedgerError, LedgerEvent,
    LedgerStore, NewExpense, Price, ReportView, ResultLedger, SqlStore, Window,
};
use migration::MigratorTrait;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn price(value: &str) -> Price {
    value.parse().unwrap()
}

async fn service_with_db() -> (ExpenseService<SqlStore>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = SqlStore::builder().database(db.clone()).build().unwrap();
    let service = ExpenseService::load(store).await.unwrap();
    (service, db)
}

async fn service_with_file_db() -> (ExpenseService<SqlStore>, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = SqlStore::builder().database(db).build().unwrap();
    let service = ExpenseService::load(store).await.unwrap();

    (service, url, path)
}

async fn seed_scenario(service: &mut ExpenseService<SqlStore>) -> Vec<ExpenseEntry> {
    vec![
        service
            .add(date(2024, 1, 1), "Pants", price("253.45"))
            .await
            .unwrap(),
        service
            .add(date(2024, 1, 1), "Banana", price("23.45"))
            .await
            .unwrap(),
        service
            .add(date(2024, 6, 1), "Jewelry", price("29843.45"))
            .await
            .unwrap(),
    ]
}

async fn stored_rows(db: &DatabaseConnection) -> Vec<ExpenseEntry> {
    let store = SqlStore::builder().database(db.clone()).build().unwrap();
    store.select_all().await.unwrap()
}

#[tokio::test]
async fn add_assigns_unique_ids_and_reads_back() {
    let (mut service, db) = service_with_db().await;

    let entries = seed_scenario(&mut service).await;
    let ids: Vec<EntryId> = entries.iter().map(|entry| entry.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2]);

    let rows = stored_rows(&db).await;
    assert_eq!(rows, entries);
    assert_eq!(service.entries(), entries.as_slice());
    assert_eq!(service.chart().len(), 3);
    assert_eq!(service.total(), price("30120.35"));
}

#[tokio::test]
async fn prices_survive_the_store_exactly() {
    let (mut service, db) = service_with_db().await;
    service
        .add(date(2024, 1, 1), "Refund", price("-0.01"))
        .await
        .unwrap();
    service
        .add(date(2024, 1, 1), "Laptop", price("9999999.99"))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    let rows = db
        .query_all(Statement::from_string(
            backend,
            "SELECT price FROM expenses_entry ORDER BY id",
        ))
        .await
        .unwrap();
    let cents: Vec<i64> = rows
        .iter()
        .map(|row| row.try_get::<i64>("", "price").unwrap())
        .collect();
    assert_eq!(cents, vec![-1, 999_999_999]);
}

#[tokio::test]
async fn prices_wider_than_the_column_never_reach_it() {
    let (mut service, db) = service_with_db().await;
    let entries = seed_scenario(&mut service).await;
    let mut events = service.subscribe();

    assert!("12345678.99".parse::<Price>().is_err());
    let err = service
        .add(date(2024, 1, 1), "Yacht", Price::new(1_234_567_899))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::Validation("Price is too large".to_string()));

    let mut pants = entries[0].clone();
    pants.item_price = Price::new(-1_000_000_000);
    assert!(matches!(
        service.update(&pants).await,
        Err(LedgerError::Validation(_))
    ));

    assert_eq!(stored_rows(&db).await, entries);
    assert_eq!(service.entries(), entries.as_slice());
    assert_eq!(service.total(), price("30120.35"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn filters_total_a_day_and_a_range() {
    let (mut service, _db) = service_with_db().await;
    seed_scenario(&mut service).await;

    let today = date(2024, 1, 1);
    let on_day = service.filter_by_exact_date(today).await.unwrap();
    let names: Vec<&str> = on_day.iter().map(|e| e.item_name.as_str()).collect();
    assert_eq!(names, vec!["Pants", "Banana"]);
    let total = Price::checked_sum(on_day.iter().map(|e| e.item_price)).unwrap();
    assert_eq!(total, price("276.90"));
    assert_eq!(total.to_string(), "276.90");

    let ranged = service.filter_by_date_range(today, date(2024, 6, 1));
    assert_eq!(ranged.len(), 3);
    let total = Price::checked_sum(ranged.iter().map(|e| e.item_price)).unwrap();
    assert_eq!(total.to_string(), "30120.35");
}

#[tokio::test]
async fn reversed_range_matches_nothing() {
    let (mut service, _db) = service_with_db().await;
    seed_scenario(&mut service).await;

    assert!(
        service
            .filter_by_date_range(date(2024, 6, 1), date(2024, 1, 1))
            .is_empty()
    );
}

#[tokio::test]
async fn update_rewrites_the_row_and_the_mirror() {
    let (mut service, db) = service_with_db().await;
    let entries = seed_scenario(&mut service).await;

    let mut banana = entries[1].clone();
    banana.item_name = "Bananas".to_string();
    banana.item_price = price("30.00");
    let rows = service.update(&banana).await.unwrap();
    assert_eq!(rows, 1);

    let stored = stored_rows(&db).await;
    assert_eq!(stored[1], banana);
    assert_eq!(service.repository().get(banana.id), Some(&banana));

    // Chart untouched until the slice is synced.
    assert_eq!(service.total(), price("30120.35"));
    service.sync_chart_slice(&banana);
    assert_eq!(service.total(), price("30126.90"));
    assert_eq!(service.chart().slices()[1].label, "Bananas");
}

#[tokio::test]
async fn update_of_missing_row_is_a_no_op() {
    let (mut service, db) = service_with_db().await;
    let entries = seed_scenario(&mut service).await;

    let ghost = ExpenseEntry {
        id: 9_999,
        entry_date: date(2024, 1, 1),
        item_name: "Ghost".to_string(),
        item_price: price("1.00"),
    };
    assert_eq!(service.update(&ghost).await.unwrap(), 0);
    assert_eq!(stored_rows(&db).await, entries);
    assert_eq!(service.entries(), entries.as_slice());
}

#[tokio::test]
async fn sync_of_unknown_id_changes_nothing() {
    let (mut service, _db) = service_with_db().await;
    seed_scenario(&mut service).await;
    let before = service.chart().clone();
    let mut events = service.subscribe();

    let ghost = ExpenseEntry {
        id: 9_999,
        entry_date: date(2024, 1, 1),
        item_name: "Ghost".to_string(),
        item_price: price("1.00"),
    };
    service.sync_chart_slice(&ghost);

    assert_eq!(service.chart(), &before);
    assert_eq!(service.total(), price("30120.35"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn sync_rebuilds_chart_for_row_missing_from_memory() {
    let (mut service, db) = service_with_db().await;
    seed_scenario(&mut service).await;

    // A second writer adds a row the service has not loaded.
    let other = SqlStore::builder().database(db).build().unwrap();
    let id = other
        .insert(&NewExpense::new(date(2024, 1, 2), "Socks", price("5.00")))
        .await
        .unwrap();

    let socks = ExpenseEntry {
        id,
        entry_date: date(2024, 1, 2),
        item_name: "Wool socks".to_string(),
        item_price: price("6.00"),
    };
    assert_eq!(service.update(&socks).await.unwrap(), 1);
    assert_eq!(service.entries().len(), 4);
    assert_eq!(service.chart().len(), 3);

    service.sync_chart_slice(&socks);
    assert_eq!(service.chart().len(), service.entries().len());
    assert_eq!(service.chart().slices()[3].entry_id, id);
    assert_eq!(service.total(), price("30126.35"));
}

#[tokio::test]
async fn delete_removes_exactly_one_row_and_entry() {
    let (mut service, db) = service_with_db().await;
    let entries = seed_scenario(&mut service).await;

    let rows = service.delete(&entries[0]).await.unwrap();
    assert_eq!(rows, 1);

    let stored = stored_rows(&db).await;
    assert_eq!(stored, entries[1..].to_vec());
    assert_eq!(service.entries(), &entries[1..]);
    assert_eq!(service.total(), price("29866.90"));

    // Deleting again affects nothing.
    assert_eq!(service.delete(&entries[0]).await.unwrap(), 0);
    assert_eq!(service.entries().len(), 2);
}

#[tokio::test]
async fn delete_with_duplicate_names_keeps_the_other_slice() {
    let (mut service, _db) = service_with_db().await;
    let first = service
        .add(date(2024, 1, 1), "Coffee", price("3.00"))
        .await
        .unwrap();
    let second = service
        .add(date(2024, 1, 2), "Coffee", price("4.50"))
        .await
        .unwrap();

    service.delete(&second).await.unwrap();

    let slices = service.chart().slices();
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].entry_id, first.id);
    assert_eq!(service.total(), price("3.00"));
    assert_eq!(service.entries(), &[first]);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let (mut service, _db) = service_with_db().await;
    let entries = seed_scenario(&mut service).await;
    let last = entries[2].clone();

    service.delete(&last).await.unwrap();
    let next = service
        .add(date(2024, 7, 1), "Watch", price("99.99"))
        .await
        .unwrap();
    assert!(next.id > last.id);
}

#[tokio::test]
async fn window_selection_is_idempotent_and_read_only() {
    let (mut service, _db) = service_with_db().await;
    seed_scenario(&mut service).await;
    service
        .add(date(2023, 12, 28), "Gloves", price("15.00"))
        .await
        .unwrap();
    let before = service.entries().to_vec();

    let mut report = ReportView::open(&service, date(2024, 1, 1)).await.unwrap();
    assert_eq!(report.window(), Window::Today);
    assert_eq!(report.entries().len(), 2);
    assert_eq!(report.total(), price("276.90"));

    report.select(&service, Window::Week).await.unwrap();
    let first = report.clone();
    report.select(&service, Window::Week).await.unwrap();
    assert_eq!(report, first);
    assert_eq!(report.entries().len(), 3);
    assert_eq!(report.chart().len(), 3);
    assert_eq!(report.total(), price("291.90"));

    report.select(&service, Window::Yesterday).await.unwrap();
    assert!(report.entries().is_empty());
    assert_eq!(report.total(), Price::ZERO);

    assert_eq!(service.entries(), before.as_slice());

    let direct = ReportView::open_on(&service, date(2024, 1, 1), Window::Week)
        .await
        .unwrap();
    report.select(&service, Window::Week).await.unwrap();
    assert_eq!(direct, report);
}

#[tokio::test]
async fn window_reads_a_fresh_snapshot() {
    let (mut service, db) = service_with_db().await;
    seed_scenario(&mut service).await;

    // A second writer adds a row behind the service's back.
    let other = SqlStore::builder().database(db).build().unwrap();
    other
        .insert(&NewExpense::new(date(2024, 1, 1), "Socks", price("5.00")))
        .await
        .unwrap();

    let today = service
        .window_snapshot(Window::Today, date(2024, 1, 1))
        .await
        .unwrap();
    assert_eq!(today.len(), 3);
    assert_eq!(service.entries().len(), 3);

    service.refresh().await.unwrap();
    assert_eq!(service.entries().len(), 4);
    assert_eq!(service.total(), price("30125.35"));
}

#[tokio::test]
async fn submit_validates_before_writing() {
    let (mut service, db) = service_with_db().await;

    let mut form = ExpenseForm::new();
    form.set_date(date(2024, 1, 1))
        .set_name("ab")
        .set_price(price("1.00"));
    let err = service.submit(&mut form).await.unwrap_err();
    assert_eq!(err, LedgerError::Validation("Too short".to_string()));
    assert!(stored_rows(&db).await.is_empty());
    assert_eq!(form.values.item_name, "ab");

    form.set_name("  Lunch  ");
    let entry = service.submit(&mut form).await.unwrap();
    assert_eq!(entry.item_name, "Lunch");
    assert_eq!(stored_rows(&db).await, vec![entry]);
    assert!(form.values.entry_date.is_none());
}

#[tokio::test]
async fn subscribers_see_every_change() {
    let (mut service, _db) = service_with_db().await;
    let mut events = service.subscribe();

    let entry = service
        .add(date(2024, 1, 1), "Pants", price("253.45"))
        .await
        .unwrap();
    let mut changed = entry.clone();
    changed.item_price = price("200.00");
    service.update(&changed).await.unwrap();
    service.sync_chart_slice(&changed);
    service.delete(&changed).await.unwrap();
    service.refresh().await.unwrap();

    assert_eq!(events.recv().await.unwrap(), LedgerEvent::Added(entry));
    assert_eq!(
        events.recv().await.unwrap(),
        LedgerEvent::Updated(changed.clone())
    );
    assert_eq!(
        events.recv().await.unwrap(),
        LedgerEvent::ChartSynced(changed.id)
    );
    assert_eq!(events.recv().await.unwrap(), LedgerEvent::Deleted(changed.id));
    assert_eq!(events.recv().await.unwrap(), LedgerEvent::Reloaded);
}

#[tokio::test]
async fn file_database_persists_between_loads() {
    let (mut service, url, path) = service_with_file_db().await;
    let entries = seed_scenario(&mut service).await;
    drop(service);

    let db = Database::connect(&url).await.unwrap();
    let store = SqlStore::builder().database(db).build().unwrap();
    let reloaded = ExpenseService::load(store).await.unwrap();
    assert_eq!(reloaded.entries(), entries.as_slice());
    assert_eq!(reloaded.total(), price("30120.35"));

    drop(reloaded);
    let _ = std::fs::remove_file(path);
}

/// Store whose writes always fail and whose reads return a fixed snapshot.
struct FailingStore {
    rows: Vec<ExpenseEntry>,
}

#[async_trait]
impl LedgerStore for FailingStore {
    async fn insert(&self, _row: &NewExpense) -> ResultLedger<EntryId> {
        Err(LedgerError::StoreWrite(DbErr::Custom("disk full".into())))
    }

    async fn update(&self, _expense: &ExpenseEntry) -> ResultLedger<u64> {
        Err(LedgerError::StoreWrite(DbErr::Custom("disk full".into())))
    }

    async fn delete(&self, _id: EntryId) -> ResultLedger<u64> {
        Err(LedgerError::StoreWrite(DbErr::Custom("disk full".into())))
    }

    async fn select_all(&self) -> ResultLedger<Vec<ExpenseEntry>> {
        Ok(self.rows.clone())
    }

    async fn select_where(&self, _filter: EntryFilter) -> ResultLedger<Vec<ExpenseEntry>> {
        Err(LedgerError::Database(DbErr::Custom("offline".into())))
    }
}

#[tokio::test]
async fn failed_writes_leave_memory_untouched() {
    let pants = ExpenseEntry {
        id: 1,
        entry_date: date(2024, 1, 1),
        item_name: "Pants".to_string(),
        item_price: price("253.45"),
    };
    let mut service = ExpenseService::load(FailingStore {
        rows: vec![pants.clone()],
    })
    .await
    .unwrap();
    let mut events = service.subscribe();

    let err = service
        .add(date(2024, 1, 2), "Banana", price("23.45"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::StoreWrite(_)));

    let mut changed = pants.clone();
    changed.item_price = price("1.00");
    assert!(matches!(
        service.update(&changed).await,
        Err(LedgerError::StoreWrite(_))
    ));
    assert!(matches!(
        service.delete(&pants).await,
        Err(LedgerError::StoreWrite(_))
    ));

    assert_eq!(service.entries(), std::slice::from_ref(&pants));
    assert_eq!(service.total(), price("253.45"));
    assert_eq!(service.chart().len(), 1);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn failed_window_selection_keeps_previous_report() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = SqlStore::builder().database(db).build().unwrap();
    let mut service = ExpenseService::load(store).await.unwrap();
    service
        .add(date(2024, 1, 1), "Pants", price("253.45"))
        .await
        .unwrap();
    let mut report = ReportView::open(&service, date(2024, 1, 1)).await.unwrap();

    let broken = ExpenseService::load(FailingStore { rows: vec![] })
        .await
        .unwrap();
    assert!(report.select(&broken, Window::Year).await.is_err());
    assert_eq!(report.window(), Window::Today);
    assert_eq!(report.entries().len(), 1);
    assert_eq!(report.total(), price("253.45"));
}
