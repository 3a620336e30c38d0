//! Article dedup: the same URL for the same account stays one row whose
//! last_seen_at advances.

mod common;

use common::post_time;
use sectorpick::domain::entities::article::ArticleSeed;
use sectorpick::domain::ports::article_repository::ArticleRepository;
use sectorpick::infrastructure::sqlite::article_repo::SqliteArticleRepo;
use sectorpick::infrastructure::sqlite::{open_database, open_in_memory};

fn seed(account_id: &str, url: &str, title: &str) -> ArticleSeed {
    ArticleSeed::new(
        account_id.to_string(),
        url.to_string(),
        title.to_string(),
        "digest".to_string(),
        post_time(common::day("2026-01-20")),
    )
}

#[test]
fn test_same_url_same_account_is_one_row() {
    let repo = SqliteArticleRepo::new(open_in_memory().unwrap());

    let first = seed("acc-1", "https://mp.example.com/a1", "原标题");
    assert!(repo.upsert(&first).unwrap());

    // Re-discovery with a fresh id and an edited title.
    let second = seed("acc-1", "https://mp.example.com/a1", "改过的标题");
    assert!(!repo.upsert(&second).unwrap());

    let stored = repo
        .get_by_url("acc-1", "https://mp.example.com/a1")
        .unwrap()
        .unwrap();
    // Identity and first_seen_at are preserved; mutable columns refreshed.
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.title, "改过的标题");
    assert_eq!(stored.first_seen_at, first.first_seen_at);
    assert!(stored.last_seen_at >= first.last_seen_at);

    let articles = repo.list_for_day(common::day("2026-01-20"), 100).unwrap();
    assert_eq!(articles.len(), 1);
}

#[test]
fn test_same_url_different_account_is_separate() {
    let repo = SqliteArticleRepo::new(open_in_memory().unwrap());

    assert!(repo
        .upsert(&seed("acc-1", "https://mp.example.com/a1", "t"))
        .unwrap());
    assert!(repo
        .upsert(&seed("acc-2", "https://mp.example.com/a1", "t"))
        .unwrap());

    assert_eq!(repo.count_for_day(common::day("2026-01-20")).unwrap(), 2);
}

#[test]
fn test_file_backed_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sectorpick.db");

    {
        let repo = SqliteArticleRepo::new(open_database(&path).unwrap());
        repo.upsert(&seed("acc-1", "https://mp.example.com/a1", "t"))
            .unwrap();
    }

    let repo = SqliteArticleRepo::new(open_database(&path).unwrap());
    assert_eq!(repo.count_for_day(common::day("2026-01-20")).unwrap(), 1);
    // Re-running migrations against the existing file is harmless.
    assert!(!repo
        .upsert(&seed("acc-1", "https://mp.example.com/a1", "t"))
        .unwrap());
}

#[test]
fn test_deleted_articles_are_hidden_from_day_list() {
    let repo = SqliteArticleRepo::new(open_in_memory().unwrap());

    let mut article = seed("acc-1", "https://mp.example.com/gone", "已删除");
    article.is_deleted = true;
    repo.upsert(&article).unwrap();

    assert!(repo.list_for_day(common::day("2026-01-20"), 100).unwrap().is_empty());
    assert_eq!(repo.count_for_day(common::day("2026-01-20")).unwrap(), 0);
}
