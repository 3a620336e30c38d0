//! Catch-up batch: stale-account selection and failure tolerance.

mod common;

use chrono::Duration as ChronoDuration;
use common::{day, record, StubSource};
use sectorpick::application::catch_up::CatchUpUseCase;
use sectorpick::application::ingest::IngestUseCase;
use sectorpick::domain::entities::account::Account;
use sectorpick::domain::ports::account_repository::AccountRepository;
use sectorpick::domain::values::day::Day;
use sectorpick::infrastructure::sqlite::account_repo::SqliteAccountRepo;
use sectorpick::infrastructure::sqlite::article_repo::SqliteArticleRepo;
use sectorpick::infrastructure::sqlite::open_in_memory;
use std::sync::Arc;
use std::time::Duration;

const TODAY: &str = "2026-01-20";

fn account_fetched_days_ago(name: &str, days_ago: i64, enabled: bool) -> Account {
    let today: Day = TODAY.parse().unwrap();
    let fetched_at = (today.date() - ChronoDuration::days(days_ago))
        .and_hms_opt(20, 0, 0)
        .unwrap()
        .and_utc();
    let mut account = Account::new(name.to_string());
    account.enabled = enabled;
    account.last_fetch_at = Some(fetched_at);
    account
}

struct Fixture {
    accounts: Arc<SqliteAccountRepo>,
    catch_up: CatchUpUseCase,
    source: Arc<StubSource>,
}

fn fixture(source: StubSource) -> Fixture {
    let conn = open_in_memory().unwrap();
    let accounts = Arc::new(SqliteAccountRepo::new(conn.clone()));
    let articles = Arc::new(SqliteArticleRepo::new(conn));
    let source = Arc::new(source);
    let ingest = Arc::new(IngestUseCase::new(
        accounts.clone(),
        articles,
        source.clone(),
    ));
    let catch_up = CatchUpUseCase::new(accounts.clone(), ingest);
    Fixture {
        accounts,
        catch_up,
        source,
    }
}

#[test]
fn test_only_one_and_two_day_stale_accounts_selected() {
    let f = fixture(StubSource::default());
    f.accounts.upsert(&account_fetched_days_ago("a-yesterday", 1, true)).unwrap();
    f.accounts.upsert(&account_fetched_days_ago("b-two-days", 2, true)).unwrap();
    f.accounts.upsert(&account_fetched_days_ago("c-today", 0, true)).unwrap();
    f.accounts.upsert(&account_fetched_days_ago("d-ancient", 3, true)).unwrap();
    f.accounts.upsert(&account_fetched_days_ago("e-disabled", 1, false)).unwrap();
    // Never fetched: needs an explicit fetch, not catch-up.
    f.accounts.upsert(&Account::new("f-never".into())).unwrap();

    let stale = f.accounts.stale_accounts(TODAY.parse().unwrap()).unwrap();
    let names: Vec<&str> = stale.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["a-yesterday", "b-two-days"]);
}

#[tokio::test]
async fn test_batch_tolerates_failures_and_stays_serial() {
    let d = day(TODAY);
    let mut source = StubSource::default();
    for name in ["a1", "a2", "a3", "a4", "a5"] {
        source.articles.insert(
            name.to_string(),
            vec![record(&format!("https://mp.example.com/{name}"), "文章", "", d)],
        );
    }
    source.failing.insert("a3".to_string());

    let f = fixture(source);
    for name in ["a1", "a2", "a3", "a4", "a5"] {
        f.accounts.upsert(&account_fetched_days_ago(name, 1, true)).unwrap();
    }

    let outcome = f
        .catch_up
        .execute(TODAY.parse().unwrap(), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(outcome.ok_count, 4);
    assert_eq!(outcome.fail_count, 1);
    assert!(outcome.first_error.as_deref().unwrap().starts_with("a3"));
    // Strictly serial, in repository order; the failure does not stop it.
    assert_eq!(f.source.fetched(), vec!["a1", "a2", "a3", "a4", "a5"]);
}

#[tokio::test]
async fn test_successful_catch_up_advances_last_fetch() {
    let d = day(TODAY);
    let mut source = StubSource::default();
    source.articles.insert(
        "a1".to_string(),
        vec![record("https://mp.example.com/x", "文章", "", d)],
    );

    let f = fixture(source);
    f.accounts.upsert(&account_fetched_days_ago("a1", 2, true)).unwrap();

    f.catch_up
        .execute(TODAY.parse().unwrap(), Duration::ZERO)
        .await
        .unwrap();

    let account = f.accounts.get_by_name("a1").unwrap().unwrap();
    let fetched = account.last_fetch_at.unwrap();
    // Touched to now, so it is no longer stale.
    assert!(fetched > account.created_at - ChronoDuration::minutes(1));
    assert!(f
        .accounts
        .stale_accounts(TODAY.parse().unwrap())
        .unwrap()
        .is_empty());
}
