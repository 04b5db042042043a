use super::*;
use crate::error::CatalogError;
use crate::types::IllustrationId;

fn item(id: &str, tags: &[&str]) -> Illustration {
    Illustration {
        id: IllustrationId::from(id),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        update_date: "2024-01-02T03:04:05+09:00".to_string(),
        ..Default::default()
    }
}

fn numbered(count: usize) -> Vec<Illustration> {
    (0..count)
        .map(|i| item(&i.to_string(), &[&format!("tag{i}")]))
        .collect()
}

/// Submit a query and resolve it with `items`, returning the effects of the resolution
fn start(orchestrator: &mut Orchestrator, items: Vec<Illustration>) -> (BatchId, Vec<Effect>) {
    let effects = orchestrator.submit("query", PathBuf::from("out"));
    let batch = match effects.as_slice() {
        [Effect::LookupCatalog { batch, .. }] => *batch,
        other => panic!("expected a single lookup, got {other:?}"),
    };
    (batch, orchestrator.catalog_resolved(batch, Ok(items)))
}

fn complete(
    orchestrator: &mut Orchestrator,
    effects: &[Effect],
    result: std::result::Result<u64, ItemError>,
) -> Vec<Effect> {
    match effects {
        [Effect::FetchItem { batch, index, .. }] => orchestrator.fetch_completed(FetchCompletion {
            batch: *batch,
            index: *index,
            result,
        }),
        other => panic!("expected a single fetch, got {other:?}"),
    }
}

// ── Names and destinations ──────────────────────────────────────────────

#[test]
fn display_name_joins_tags_with_plus() {
    assert_eq!(display_name(&item("1", &["a", "b"])), "a+b.jpg");
    assert_eq!(display_name(&item("2", &["c"])), "c.jpg");
    assert_eq!(display_name(&item("3", &[])), ".jpg");
}

#[test]
fn destination_uses_query_or_timestamp() {
    let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(7, 5, 1)
        .unwrap();

    assert_eq!(
        destination_for(Path::new("/data"), "cat", now),
        PathBuf::from("/data/cat")
    );
    assert_eq!(
        destination_for(Path::new("/data"), "", now),
        PathBuf::from("/data/2024-03-09 07:05:01")
    );
}

#[test]
fn destination_never_leaves_the_base_directory() {
    let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(7, 5, 1)
        .unwrap();
    let base = Path::new("/data");

    assert_eq!(destination_for(base, "/etc", now), PathBuf::from("/data/etc"));
    assert_eq!(
        destination_for(base, "../../home/cat", now),
        PathBuf::from("/data/home/cat")
    );
    assert_eq!(destination_for(base, "a/./b", now), PathBuf::from("/data/a/b"));
    assert_eq!(destination_for(base, "..", now), PathBuf::from("/data"));
}

// ── Transitions ─────────────────────────────────────────────────────────

#[test]
fn submit_moves_idle_to_awaiting_catalog() {
    let mut orchestrator = Orchestrator::default();
    assert_eq!(orchestrator.phase(), Phase::Idle);

    let effects = orchestrator.submit("", PathBuf::from("out/top"));

    assert_eq!(orchestrator.phase(), Phase::AwaitingCatalog);
    assert_eq!(orchestrator.pending_query(), Some(""));
    assert_eq!(
        effects,
        vec![Effect::LookupCatalog {
            batch: BatchId(1),
            query: String::new(),
            destination: PathBuf::from("out/top"),
        }]
    );
}

#[test]
fn submit_is_ignored_while_a_batch_is_active() {
    let mut orchestrator = Orchestrator::default();
    orchestrator.submit("first", PathBuf::from("out"));

    assert!(orchestrator.submit("second", PathBuf::from("out")).is_empty());
    assert_eq!(orchestrator.pending_query(), Some("first"));

    orchestrator.catalog_resolved(BatchId(1), Ok(numbered(2)));
    assert_eq!(orchestrator.phase(), Phase::Downloading);
    assert!(orchestrator.submit("third", PathBuf::from("out")).is_empty());
}

#[test]
fn resolved_catalog_requests_first_item() {
    let mut orchestrator = Orchestrator::default();
    let (batch, effects) = start(&mut orchestrator, numbered(3));

    assert_eq!(orchestrator.phase(), Phase::Downloading);
    assert_eq!(orchestrator.cursor(), 0);
    assert_eq!(orchestrator.progress(), 0.0);
    assert_eq!(orchestrator.current_name().as_deref(), Some("tag0.jpg"));
    assert_eq!(
        effects,
        vec![Effect::FetchItem {
            batch,
            index: 0,
            item: numbered(1).remove(0),
            destination: PathBuf::from("out/tag0.jpg"),
        }]
    );
}

#[test]
fn items_without_timestamp_never_enter_the_batch() {
    let mut orchestrator = Orchestrator::default();
    let mut items = numbered(3);
    items[1].update_date.clear();

    let (_, effects) = start(&mut orchestrator, items);
    let batch = orchestrator.batch().unwrap();

    assert_eq!(batch.total(), 2);
    assert!(batch.items().iter().all(Illustration::has_update_date));
    assert_eq!(
        batch.items().iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
        ["0", "2"]
    );

    let next = complete(&mut orchestrator, &effects, Ok(1));
    match next.as_slice() {
        [Effect::FetchItem { item, .. }] => assert_eq!(item.id.as_str(), "2"),
        other => panic!("expected fetch of item 2, got {other:?}"),
    }
}

#[test]
fn empty_catalog_finishes_without_fetching() {
    let mut orchestrator = Orchestrator::default();
    let (_, effects) = start(&mut orchestrator, Vec::new());

    assert!(effects.is_empty());
    assert_eq!(orchestrator.phase(), Phase::Finished);
    assert_eq!(orchestrator.finish_reason(), Some(&FinishReason::NoResults));
    assert_eq!(orchestrator.cursor(), 0);
}

#[test]
fn catalog_with_only_undated_items_finishes_without_fetching() {
    let mut orchestrator = Orchestrator::default();
    let mut items = numbered(2);
    for item in &mut items {
        item.update_date.clear();
    }

    let (_, effects) = start(&mut orchestrator, items);

    assert!(effects.is_empty());
    assert_eq!(orchestrator.finish_reason(), Some(&FinishReason::NoResults));
}

#[test]
fn catalog_failure_finishes_with_error() {
    let mut orchestrator = Orchestrator::default();
    let effects = orchestrator.submit("cat", PathBuf::from("out/cat"));
    let Effect::LookupCatalog { batch, .. } = &effects[0] else {
        panic!("expected lookup");
    };

    let effects = orchestrator.catalog_resolved(
        *batch,
        Err(Error::Catalog(CatalogError::Status {
            status: 503,
            url: "https://www.pixiv.net/ajax/search/artworks/cat".into(),
        })),
    );

    assert!(effects.is_empty());
    assert_eq!(orchestrator.phase(), Phase::Finished);
    match orchestrator.finish_reason() {
        Some(FinishReason::Failed(message)) => assert!(message.contains("503"), "{message}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(orchestrator.batch().is_none());
    assert_eq!(orchestrator.progress(), 0.0);
}

#[test]
fn destination_error_finishes_before_first_fetch() {
    let mut orchestrator = Orchestrator::default();
    orchestrator.submit("cat", PathBuf::from("/proc/forbidden"));

    let effects = orchestrator.catalog_resolved(
        BatchId(1),
        Err(Error::config("cannot create directory", "download.download_dir")),
    );

    assert!(effects.is_empty());
    assert!(matches!(
        orchestrator.finish_reason(),
        Some(FinishReason::Failed(_))
    ));
}

#[test]
fn two_item_scenario_ends_with_both_outcomes_logged() {
    let mut orchestrator = Orchestrator::default();
    let (_, effects) = start(
        &mut orchestrator,
        vec![item("1", &["a", "b"]), item("2", &["c"])],
    );

    let effects = complete(&mut orchestrator, &effects, Ok(512));
    assert_eq!(orchestrator.phase(), Phase::Downloading);
    assert_eq!(orchestrator.progress(), 0.5);

    let effects = complete(
        &mut orchestrator,
        &effects,
        Err(ItemError::Request("network timeout".into())),
    );

    assert!(effects.is_empty());
    assert_eq!(orchestrator.phase(), Phase::Finished);
    assert_eq!(orchestrator.finish_reason(), Some(&FinishReason::Completed));
    assert_eq!(orchestrator.cursor(), 2);
    assert_eq!(orchestrator.progress(), 1.0);

    let log: Vec<_> = orchestrator
        .log()
        .entries()
        .map(|(name, outcome)| (name.to_string(), outcome.clone()))
        .collect();
    assert_eq!(
        log,
        vec![
            ("a+b.jpg".to_string(), Outcome::Saved { bytes: 512 }),
            (
                "c.jpg".to_string(),
                Outcome::Failed {
                    error: "network timeout".to_string()
                }
            ),
        ]
    );

    let batch = orchestrator.batch().unwrap();
    assert_eq!((batch.saved(), batch.failed()), (1, 1));
}

#[test]
fn failed_fetch_advances_like_a_successful_one() {
    let mut orchestrator = Orchestrator::default();
    let (_, effects) = start(&mut orchestrator, numbered(4));

    let effects = complete(
        &mut orchestrator,
        &effects,
        Err(ItemError::Status {
            status: 404,
            url: "https://i.pximg.net/x.jpg".into(),
        }),
    );

    assert_eq!(orchestrator.cursor(), 1);
    assert_eq!(orchestrator.progress(), 0.25);
    match effects.as_slice() {
        [Effect::FetchItem { index: 1, .. }] => {}
        other => panic!("expected fetch of index 1, got {other:?}"),
    }
}

#[test]
fn progress_reaches_exactly_one_for_any_length() {
    for len in 1..=64 {
        let mut orchestrator = Orchestrator::default();
        let (_, mut effects) = start(&mut orchestrator, numbered(len));
        let mut previous = 0.0;

        for completed in 1..=len {
            effects = complete(&mut orchestrator, &effects, Ok(1));
            let progress = orchestrator.progress();
            assert!(progress > previous, "len {len}: progress must grow");
            assert!(progress <= 1.0, "len {len}: progress {progress} overshoots");
            assert_eq!(orchestrator.cursor(), completed);
            previous = progress;
        }

        assert!(effects.is_empty(), "len {len}: no fetch after the last item");
        assert_eq!(orchestrator.cursor(), len);
        assert_eq!(orchestrator.progress(), 1.0, "len {len}");
        assert!(orchestrator.is_finished());
    }
}

#[test]
fn log_holds_only_the_last_five_results() {
    let mut orchestrator = Orchestrator::default();
    let (_, mut effects) = start(&mut orchestrator, numbered(8));

    for _ in 0..6 {
        effects = complete(&mut orchestrator, &effects, Ok(1));
        assert!(orchestrator.log().len() <= 5);
    }

    assert_eq!(orchestrator.log().len(), 5);
    assert_eq!(orchestrator.log().outcome("tag0.jpg"), None);
    assert!(orchestrator.log().outcome("tag5.jpg").is_some());
}

#[test]
fn log_capacity_is_configurable() {
    let mut orchestrator = Orchestrator::new(2);
    let (_, mut effects) = start(&mut orchestrator, numbered(4));
    for _ in 0..3 {
        effects = complete(&mut orchestrator, &effects, Ok(1));
    }

    let names: Vec<_> = orchestrator.log().entries().map(|(n, _)| n).collect();
    assert_eq!(names, ["tag1.jpg", "tag2.jpg"]);
}

#[test]
fn stale_completions_are_ignored() {
    let mut orchestrator = Orchestrator::default();
    let (batch, _) = start(&mut orchestrator, numbered(3));

    let wrong_index = orchestrator.fetch_completed(FetchCompletion {
        batch,
        index: 2,
        result: Ok(1),
    });
    let wrong_batch = orchestrator.fetch_completed(FetchCompletion {
        batch: BatchId(batch.0 + 10),
        index: 0,
        result: Ok(1),
    });
    let stale_catalog = orchestrator.catalog_resolved(BatchId(99), Ok(numbered(1)));

    assert!(wrong_index.is_empty());
    assert!(wrong_batch.is_empty());
    assert!(stale_catalog.is_empty());
    assert_eq!(orchestrator.cursor(), 0);
    assert!(orchestrator.log().is_empty());
    assert_eq!(orchestrator.phase(), Phase::Downloading);
}

#[test]
fn fetch_result_while_idle_is_ignored() {
    let mut orchestrator = Orchestrator::default();
    let effects = orchestrator.fetch_completed(FetchCompletion {
        batch: BatchId(1),
        index: 0,
        result: Ok(1),
    });

    assert!(effects.is_empty());
    assert_eq!(orchestrator.phase(), Phase::Idle);
}

#[test]
fn finished_orchestrator_accepts_a_new_batch_with_fresh_state() {
    let mut orchestrator = Orchestrator::default();
    let (first, effects) = start(&mut orchestrator, numbered(1));
    complete(&mut orchestrator, &effects, Ok(1));
    assert!(orchestrator.is_finished());
    assert_eq!(orchestrator.log().len(), 1);

    let (second, effects) = start(&mut orchestrator, vec![item("9", &["z"])]);

    assert_ne!(first, second);
    assert_eq!(orchestrator.phase(), Phase::Downloading);
    assert_eq!(orchestrator.cursor(), 0);
    assert_eq!(orchestrator.progress(), 0.0);
    assert!(orchestrator.log().is_empty());
    assert_eq!(effects.len(), 1);
}

#[test]
fn resubmitting_clears_the_previous_log() {
    let mut orchestrator = Orchestrator::default();
    let (_, mut effects) = start(&mut orchestrator, numbered(2));
    for _ in 0..2 {
        effects = complete(&mut orchestrator, &effects, Ok(1));
    }
    assert_eq!(orchestrator.log().len(), 2);

    let effects = orchestrator.submit("again", PathBuf::from("out"));
    assert!(orchestrator.log().is_empty());

    let [Effect::LookupCatalog { batch, .. }] = effects.as_slice() else {
        panic!("expected a single lookup, got {effects:?}");
    };
    orchestrator.catalog_resolved(*batch, Ok(Vec::new()));

    assert_eq!(orchestrator.finish_reason(), Some(&FinishReason::NoResults));
    assert!(orchestrator.batch().is_none());
    assert!(orchestrator.log().is_empty());
}

#[test]
fn independent_orchestrators_do_not_share_state() {
    let mut left = Orchestrator::default();
    let mut right = Orchestrator::default();

    let (_, effects) = start(&mut left, numbered(2));
    complete(&mut left, &effects, Ok(1));

    assert_eq!(left.cursor(), 1);
    assert_eq!(right.phase(), Phase::Idle);
    assert!(right.log().is_empty());

    start(&mut right, numbered(5));
    assert_eq!(right.batch().unwrap().total(), 5);
    assert_eq!(left.batch().unwrap().total(), 2);
}
