mod common;

use docxide_numbering::{Error, NumberingManager, Restart, StartSettings};

/// Calculate and store one counter, returning the stored value.
fn next(mgr: &mut NumberingManager, num_id: &str, level: u32, pos: u64) -> i64 {
    let value = mgr.calculate_counter(num_id, level, pos, None).unwrap();
    mgr.set_counter(num_id, level, pos, value, None).unwrap();
    value
}

#[test]
fn counts_up_without_interruption() {
    common::init_logging();
    let mut mgr = NumberingManager::new();
    mgr.set_start_settings("1", 0, 1, Restart::AnyShallower).unwrap();

    let values: Vec<i64> = [10, 20, 30, 40]
        .iter()
        .map(|&pos| next(&mut mgr, "1", 0, pos))
        .collect();
    assert_eq!(values, vec![1, 2, 3, 4]);
}

#[test]
fn first_item_uses_configured_start() {
    let mut mgr = NumberingManager::new();
    mgr.set_start_settings("7", 0, 5, Restart::AnyShallower).unwrap();
    assert_eq!(mgr.calculate_counter("7", 0, 100, None).unwrap(), 5);
    // Unconfigured levels start at 1.
    assert_eq!(mgr.calculate_counter("7", 1, 100, None).unwrap(), 1);
}

#[test]
fn restarts_when_parent_level_used_in_between() {
    let mut mgr = NumberingManager::new();
    assert_eq!(next(&mut mgr, "1", 0, 10), 1);
    assert_eq!(next(&mut mgr, "1", 1, 20), 1);
    assert_eq!(next(&mut mgr, "1", 1, 30), 2);
    assert_eq!(next(&mut mgr, "1", 0, 40), 2);
    assert_eq!(next(&mut mgr, "1", 1, 50), 1);
    assert_eq!(next(&mut mgr, "1", 1, 60), 2);
}

#[test]
fn restart_never_keeps_counting_across_parents() {
    let mut mgr = NumberingManager::new();
    mgr.set_start_settings("1", 1, 1, Restart::from(Some(0))).unwrap();
    next(&mut mgr, "1", 0, 10);
    assert_eq!(next(&mut mgr, "1", 1, 20), 1);
    assert_eq!(next(&mut mgr, "1", 1, 30), 2);
    next(&mut mgr, "1", 0, 40);
    assert_eq!(next(&mut mgr, "1", 1, 50), 3);
}

#[test]
fn restart_threshold_only_reacts_to_levels_at_or_above_it() {
    let mut mgr = NumberingManager::new();
    mgr.set_start_settings("1", 3, 1, Restart::from(Some(1))).unwrap();

    next(&mut mgr, "1", 0, 10);
    next(&mut mgr, "1", 1, 20);
    next(&mut mgr, "1", 2, 30);
    assert_eq!(next(&mut mgr, "1", 3, 40), 1);
    assert_eq!(next(&mut mgr, "1", 3, 50), 2);

    // Level 2 is deeper than the threshold: no restart.
    next(&mut mgr, "1", 2, 60);
    assert_eq!(next(&mut mgr, "1", 3, 70), 3);

    // Level 1 is within it.
    next(&mut mgr, "1", 1, 80);
    assert_eq!(next(&mut mgr, "1", 3, 90), 1);
}

#[test]
fn restart_conversion_from_raw_values() {
    assert_eq!(Restart::from(None), Restart::AnyShallower);
    assert_eq!(Restart::from(Some(0)), Restart::Never);
    assert_eq!(Restart::from(Some(2)), Restart::UpToLevel(2));
}

#[test]
fn lists_sharing_an_abstract_definition_share_restarts() {
    let mut mgr = NumberingManager::new();
    mgr.set_counter("1", 0, 10, 1, Some("A")).unwrap();
    mgr.set_counter("2", 1, 20, 1, Some("A")).unwrap();
    mgr.set_counter("3", 1, 25, 1, Some("B")).unwrap();

    let v = mgr.calculate_counter("1", 0, 30, Some("A")).unwrap();
    assert_eq!(v, 2);
    mgr.set_counter("1", 0, 30, v, Some("A")).unwrap();

    // List 2 sees list 1's level-0 write through abstract A.
    assert_eq!(mgr.calculate_counter("2", 1, 40, Some("A")).unwrap(), 1);
    // List 3 belongs to B and keeps counting.
    assert_eq!(mgr.calculate_counter("3", 1, 40, Some("B")).unwrap(), 2);
    // The abstract id recorded on the first write is reused when omitted.
    assert_eq!(mgr.calculate_counter("2", 1, 40, None).unwrap(), 1);
}

#[test]
fn get_counter_is_an_exact_lookup() {
    let mut mgr = NumberingManager::new();
    mgr.set_counter("1", 0, 10, 4, None).unwrap();
    assert_eq!(mgr.get_counter("1", 0, 10).unwrap(), Some(4));
    assert_eq!(mgr.get_counter("1", 0, 11).unwrap(), None);
    assert_eq!(mgr.get_counter("1", 1, 10).unwrap(), None);
    assert_eq!(mgr.get_counter("2", 0, 10).unwrap(), None);
}

#[test]
fn last_write_at_a_position_wins() {
    let mut mgr = NumberingManager::new();
    mgr.set_counter("1", 0, 10, 1, None).unwrap();
    mgr.set_counter("1", 0, 10, 9, None).unwrap();
    assert_eq!(mgr.get_counter("1", 0, 10).unwrap(), Some(9));
    assert_eq!(mgr.calculate_counter("1", 0, 20, None).unwrap(), 10);
}

#[test]
fn ancestors_take_nearest_prior_value_or_start() {
    let mut mgr = NumberingManager::new();
    mgr.set_start_settings("1", 1, 3, Restart::AnyShallower).unwrap();
    assert_eq!(mgr.ancestors_path("1", 2, 5).unwrap(), vec![1, 3]);

    next(&mut mgr, "1", 0, 10);
    next(&mut mgr, "1", 0, 20);
    assert_eq!(mgr.ancestors_path("1", 1, 30).unwrap(), vec![2]);
    assert_eq!(mgr.ancestors_path("1", 1, 15).unwrap(), vec![1]);
    assert!(mgr.ancestors_path("1", 0, 30).unwrap().is_empty());
}

#[test]
fn calculate_path_appends_own_counter_when_stored() {
    let mut mgr = NumberingManager::new();
    next(&mut mgr, "1", 0, 10);
    next(&mut mgr, "1", 0, 20);
    assert_eq!(mgr.calculate_path("1", 1, 30).unwrap(), vec![2]);
    next(&mut mgr, "1", 1, 30);
    assert_eq!(mgr.calculate_path("1", 1, 30).unwrap(), vec![2, 1]);
}

#[test]
fn record_builds_outline_paths_in_document_order() {
    let mut mgr = NumberingManager::new();
    let outline: [(u32, u64); 6] = [(0, 1), (1, 2), (1, 3), (0, 4), (1, 5), (2, 6)];
    let paths: Vec<Vec<i64>> = outline
        .iter()
        .map(|&(level, pos)| mgr.record("1", level, pos, None).unwrap())
        .collect();
    assert_eq!(
        paths,
        vec![
            vec![1],
            vec![1, 1],
            vec![1, 2],
            vec![2],
            vec![2, 1],
            vec![2, 1, 1],
        ]
    );
}

#[test]
fn numeric_and_text_ids_name_the_same_list() {
    let mut mgr = NumberingManager::new();
    mgr.set_counter(5, 0, 10, 3, None).unwrap();
    assert_eq!(mgr.get_counter("5", 0, 10).unwrap(), Some(3));
    assert_eq!(mgr.get_counter(5.0, 0, 10).unwrap(), Some(3));
    assert_eq!(mgr.get_counter(5u32, 0, 10).unwrap(), Some(3));
}

#[test]
fn rejects_malformed_list_ids() {
    let mut mgr = NumberingManager::new();
    for bad in ["", "   ", "__proto__", "constructor", "prototype"] {
        let err = mgr.set_counter(bad, 0, 10, 1, None).unwrap_err();
        assert!(
            matches!(err, Error::InvalidArgument { argument: "num_id", .. }),
            "{bad:?} gave {err:?}"
        );
    }
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = mgr.calculate_counter(bad, 0, 10, None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { argument: "num_id", .. }));
    }
    let err = mgr.set_counter("1", 0, 10, 1, Some("")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { argument: "abstract_id", .. }));

    // Nothing was written by the failed calls.
    assert!(mgr.counters_map().is_empty());
}

#[test]
fn reports_overflow_instead_of_wrapping() {
    let mut mgr = NumberingManager::new();
    mgr.set_start_settings("1", 0, 1, Restart::Never).unwrap();
    mgr.set_counter("1", 0, 10, i64::MAX, None).unwrap();
    let err = mgr.calculate_counter("1", 0, 20, None).unwrap_err();
    assert_eq!(
        err,
        Error::Overflow {
            num_id: "1".to_string(),
            level: 0,
            pos: 20
        }
    );
    assert!(err.to_string().contains("overflow"));
}

#[test]
fn toggling_the_cache_resets_counters_but_keeps_settings() {
    let mut mgr = NumberingManager::new();
    mgr.set_start_settings("1", 0, 4, Restart::AnyShallower).unwrap();
    next(&mut mgr, "1", 0, 10);
    next(&mut mgr, "1", 0, 20);

    mgr.enable_cache();
    assert!(mgr.is_cache_enabled());
    assert_eq!(mgr.get_counter("1", 0, 10).unwrap(), None);
    assert!(mgr.counters_map().is_empty());
    assert_eq!(
        mgr.start_settings("1", 0).unwrap(),
        StartSettings {
            start: 4,
            restart: Restart::AnyShallower
        }
    );
    assert_eq!(mgr.calculate_counter("1", 0, 30, None).unwrap(), 4);

    next(&mut mgr, "1", 0, 30);
    mgr.disable_cache();
    assert!(!mgr.is_cache_enabled());
    assert_eq!(mgr.get_counter("1", 0, 30).unwrap(), None);

    next(&mut mgr, "1", 0, 40);
    mgr.clear_all_state();
    assert!(mgr.counters_map().is_empty());
}

/// One session's worth of list paragraphs: (list, level, position).
fn script() -> Vec<(&'static str, u32, u64)> {
    vec![
        ("1", 0, 1),
        ("1", 1, 2),
        ("1", 1, 3),
        ("2", 0, 4),
        ("1", 2, 5),
        ("1", 0, 6),
        ("1", 1, 7),
        ("2", 0, 8),
        ("2", 1, 9),
        ("1", 1, 10),
        ("1", 2, 11),
        ("1", 2, 12),
    ]
}

fn run_script(mgr: &mut NumberingManager) -> Vec<Vec<i64>> {
    mgr.set_start_settings("2", 0, 10, Restart::AnyShallower).unwrap();
    mgr.set_start_settings("1", 2, 1, Restart::Never).unwrap();
    let mut out: Vec<Vec<i64>> = script()
        .into_iter()
        .map(|(id, level, pos)| mgr.record(id, level, pos, None).unwrap())
        .collect();
    // Queries behind the last write must not use the shortcut.
    out.push(vec![mgr.calculate_counter("1", 1, 4, None).unwrap()]);
    out.push(mgr.ancestors_path("1", 2, 8).unwrap());

    // A start value changed after a path was computed shows up in it.
    out.push(mgr.ancestors_path("3", 2, 20).unwrap());
    mgr.set_start_settings("3", 0, 5, Restart::AnyShallower).unwrap();
    mgr.set_start_settings("3", 1, 2, Restart::AnyShallower).unwrap();
    out.push(mgr.ancestors_path("3", 2, 20).unwrap());
    out.push(mgr.calculate_path("3", 1, 20).unwrap());
    out
}

#[test]
fn cached_and_uncached_managers_agree() {
    common::init_logging();
    let mut plain = NumberingManager::new();
    let mut cached = NumberingManager::with_cache(true);
    assert_eq!(run_script(&mut plain), run_script(&mut cached));
}

#[test]
fn memoized_paths_follow_start_changes() {
    for cache in [false, true] {
        let mut mgr = NumberingManager::with_cache(cache);
        assert_eq!(mgr.ancestors_path("1", 1, 10).unwrap(), vec![1]);
        mgr.set_start_settings("1", 0, 5, Restart::AnyShallower).unwrap();
        assert_eq!(mgr.ancestors_path("1", 1, 10).unwrap(), vec![5], "cache={cache}");
    }
}

#[test]
fn list_moved_to_another_abstract_group_leaves_the_old_one() {
    let mut mgr = NumberingManager::new();
    mgr.set_counter("1", 1, 10, 1, Some("A")).unwrap();
    mgr.set_counter("2", 0, 20, 1, Some("A")).unwrap();
    mgr.set_counter("2", 0, 20, 1, Some("B")).unwrap();

    // List 2's level-0 item now belongs to B only, so A sees no parent
    // between 10 and 30 and list 1 keeps counting.
    assert_eq!(mgr.calculate_counter("1", 1, 30, Some("A")).unwrap(), 2);
    assert_eq!(mgr.get_counter("2", 0, 20).unwrap(), Some(1));
    assert_eq!(mgr.calculate_counter("2", 0, 40, None).unwrap(), 2);
}

#[test]
fn memoized_paths_follow_later_writes_before_them() {
    let mut mgr = NumberingManager::with_cache(true);
    mgr.set_counter("1", 0, 10, 1, None).unwrap();
    assert_eq!(mgr.ancestors_path("1", 1, 30).unwrap(), vec![1]);
    mgr.set_counter("1", 0, 20, 2, None).unwrap();
    assert_eq!(mgr.ancestors_path("1", 1, 30).unwrap(), vec![2]);
}

#[test]
fn counters_snapshot_serializes_as_nested_maps() {
    let mut mgr = NumberingManager::new();
    next(&mut mgr, "1", 0, 10);
    next(&mut mgr, "1", 1, 20);
    next(&mut mgr, "9", 0, 30);

    let snapshot = mgr.counters_map();
    assert_eq!(snapshot["1"][&1][&20], 1);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["1"]["0"]["10"], 1);
    assert_eq!(json["9"]["0"]["30"], 1);
}
