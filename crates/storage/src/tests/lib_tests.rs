use super::*;

fn woodstock() -> FestivalInput {
    FestivalInput {
        name: "Woodstock".to_string(),
        start: NaiveDate::from_ymd_opt(1969, 8, 15),
        end: NaiveDate::from_ymd_opt(1969, 8, 18),
        location: "Bethel, NY".to_string(),
    }
}

fn performer(name: &str, is_band: bool, festival: Option<FestivalId>) -> PerformerInput {
    PerformerInput {
        name: name.to_string(),
        is_band,
        festival,
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("festivals_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn created_festival_reads_back_identical() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let id = storage.create_festival(&woodstock()).await.expect("create");

    let stored = storage
        .get_festival(id)
        .await
        .expect("get")
        .expect("festival exists");
    assert_eq!(stored.id, id);
    assert_eq!(stored.input(), woodstock());
}

#[tokio::test]
async fn festival_without_dates_round_trips_nulls() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let id = storage
        .create_festival(&FestivalInput::default())
        .await
        .expect("create");
    let stored = storage.get_festival(id).await.expect("get").expect("some");
    assert_eq!(stored.name, "unknown");
    assert_eq!(stored.location, "location unknown");
    assert!(stored.start.is_none() && stored.end.is_none());
}

#[tokio::test]
async fn lists_and_counts_in_insertion_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.create_festival(&woodstock()).await.expect("first");
    let second = storage
        .create_festival(&FestivalInput {
            name: "Isle of Wight".to_string(),
            ..FestivalInput::default()
        })
        .await
        .expect("second");

    let festivals = storage.list_festivals().await.expect("list");
    assert_eq!(
        festivals.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![first, second]
    );
    assert_eq!(storage.count_festivals().await.expect("count"), 2);
    assert_eq!(storage.count_performers().await.expect("count"), 0);
}

#[tokio::test]
async fn updates_festival_fields() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let id = storage.create_festival(&woodstock()).await.expect("create");

    let changed = FestivalInput {
        location: "White Lake, NY".to_string(),
        end: None,
        ..woodstock()
    };
    assert!(storage.update_festival(id, &changed).await.expect("update"));

    let stored = storage.get_festival(id).await.expect("get").expect("some");
    assert_eq!(stored.location, "White Lake, NY");
    assert!(stored.end.is_none());
}

#[tokio::test]
async fn missing_ids_report_absence() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let festival = FestivalId(404);
    let performer_id = PerformerId(404);

    assert!(storage.get_festival(festival).await.expect("get").is_none());
    assert!(!storage
        .update_festival(festival, &woodstock())
        .await
        .expect("update"));
    assert!(!storage.delete_festival(festival).await.expect("delete"));

    assert!(storage
        .get_performer(performer_id)
        .await
        .expect("get")
        .is_none());
    assert!(!storage
        .update_performer(performer_id, &performer("Nobody", false, None))
        .await
        .expect("update"));
    assert!(!storage
        .delete_performer(performer_id)
        .await
        .expect("delete"));
}

#[tokio::test]
async fn deleting_festival_clears_performer_reference() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let festival = storage.create_festival(&woodstock()).await.expect("festival");
    let santana = storage
        .create_performer(&performer("Santana", true, Some(festival)))
        .await
        .expect("santana");
    let hendrix = storage
        .create_performer(&performer("Jimi Hendrix", false, Some(festival)))
        .await
        .expect("hendrix");

    assert!(storage.delete_festival(festival).await.expect("delete"));

    assert!(storage.get_festival(festival).await.expect("get").is_none());
    for id in [santana, hendrix] {
        let kept = storage
            .get_performer(id)
            .await
            .expect("get")
            .expect("performer survives");
        assert!(kept.festival.is_none());
    }
    assert_eq!(storage.count_performers().await.expect("count"), 2);
}

#[tokio::test]
async fn lists_performers_of_a_festival() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let woodstock_id = storage.create_festival(&woodstock()).await.expect("festival");
    let other = storage
        .create_festival(&FestivalInput::default())
        .await
        .expect("other");
    let santana = storage
        .create_performer(&performer("Santana", true, Some(woodstock_id)))
        .await
        .expect("santana");
    storage
        .create_performer(&performer("Arlo Guthrie", false, Some(other)))
        .await
        .expect("arlo");
    storage
        .create_performer(&performer("Unbooked", false, None))
        .await
        .expect("unbooked");

    let lineup = storage
        .list_performers_for_festival(woodstock_id)
        .await
        .expect("lineup");
    assert_eq!(lineup.len(), 1);
    assert_eq!(lineup[0].id, santana);
    assert!(lineup[0].is_band);
}

#[tokio::test]
async fn updates_and_deletes_performer() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let festival = storage.create_festival(&woodstock()).await.expect("festival");
    let id = storage
        .create_performer(&performer("Joan Baez", false, None))
        .await
        .expect("create");

    assert!(storage
        .update_performer(id, &performer("Joan Baez", false, Some(festival)))
        .await
        .expect("update"));
    let stored = storage.get_performer(id).await.expect("get").expect("some");
    assert_eq!(stored.festival, Some(festival));

    assert!(storage.delete_performer(id).await.expect("delete"));
    assert!(storage.list_performers().await.expect("list").is_empty());
    assert_eq!(storage.count_festivals().await.expect("count"), 1);
}

#[tokio::test]
async fn summary_counts_both_entities() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let festival = storage.create_festival(&woodstock()).await.expect("festival");
    storage
        .create_performer(&performer("The Who", true, Some(festival)))
        .await
        .expect("performer");

    let summary = storage.summary().await.expect("summary");
    assert_eq!(summary.festivals, 1);
    assert_eq!(summary.performers, 1);
}

#[tokio::test]
async fn writes_naming_a_deleted_festival_are_refused() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let festival = storage.create_festival(&woodstock()).await.expect("festival");
    let id = storage
        .create_performer(&performer("Melanie", false, None))
        .await
        .expect("performer");
    assert!(storage.delete_festival(festival).await.expect("delete"));

    let err = storage
        .create_performer(&performer("Sly Stone", true, Some(festival)))
        .await
        .expect_err("festival is gone");
    assert!(is_missing_festival(&err));

    let err = storage
        .update_performer(id, &performer("Melanie", false, Some(festival)))
        .await
        .expect_err("festival is gone");
    assert!(is_missing_festival(&err));
    assert_eq!(storage.count_performers().await.expect("count"), 1);

    let other = anyhow::anyhow!("unrelated failure");
    assert!(!is_missing_festival(&other));
}

#[test]
fn memory_urls_have_no_parent_dir() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert!(sqlite_path("postgres://localhost/db").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/festivals.db?mode=rwc"),
        Some(PathBuf::from("./data/festivals.db"))
    );
}
