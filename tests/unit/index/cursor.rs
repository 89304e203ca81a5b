use super::*;
use crate::index::timeline::tests::{random_index, Rng};

#[test]
fn sequential_cursor_matches_direct_query() {
    let index = random_index(42, 90.0, 200);
    let mut cursor = TimelineCursor::new(1.0);
    let mut t = 0.0;
    while t <= 90.0 {
        let (via_cursor, strategy) = cursor.query_with_strategy(&index, t);
        assert_eq!(via_cursor, index.query_direct(t), "mismatch at t={t}");
        assert_eq!(via_cursor, index.query_linear(t), "mismatch at t={t}");
        if t > 0.0 {
            assert_eq!(strategy, QueryStrategy::Advance);
        }
        t += 0.033;
    }
    assert_eq!(cursor.stats().relocated, 1);
}

#[test]
fn random_seeks_match_linear_scan() {
    let index = random_index(9, 90.0, 150);
    let mut cursor = TimelineCursor::new(0.5);
    let mut rng = Rng::new(1234);
    for _ in 0..2_000 {
        let t = (rng.next_f64() * 90.0 * 100.0).round() / 100.0;
        assert_eq!(cursor.query(&index, t), index.query_linear(t), "mismatch at t={t}");
    }
    assert!(cursor.stats().relocated > 0);
}

#[test]
fn backwards_and_large_jumps_relocate() {
    let index = random_index(3, 60.0, 50);
    let mut cursor = TimelineCursor::new(1.0);

    assert_eq!(cursor.query_with_strategy(&index, 10.0).1, QueryStrategy::Relocate);
    assert_eq!(cursor.query_with_strategy(&index, 10.5).1, QueryStrategy::Advance);
    assert_eq!(cursor.query_with_strategy(&index, 9.0).1, QueryStrategy::Relocate);
    assert_eq!(cursor.query_with_strategy(&index, 30.0).1, QueryStrategy::Relocate);
    assert_eq!(cursor.last_time(), Some(30.0));

    cursor.reset();
    assert_eq!(cursor.query_with_strategy(&index, 30.1).1, QueryStrategy::Relocate);
}

#[test]
fn seek_away_and_back_is_idempotent() {
    let index = random_index(11, 60.0, 80);
    let mut cursor = TimelineCursor::new(1.0);
    let first = cursor.query(&index, 21.3);
    let _ = cursor.query(&index, 47.0);
    let _ = cursor.query(&index, 2.0);
    let back = cursor.query(&index, 21.3);
    assert_eq!(first, back);
    assert_eq!(back, index.query_direct(21.3));
}

#[test]
fn new_index_forces_relocation() {
    let index = random_index(5, 60.0, 20);
    let mut cursor = TimelineCursor::new(1.0);
    let _ = cursor.query(&index, 5.0);

    let next = index.with_overlay(crate::index::timeline::tests::overlay("new", 5.0, 6.0));
    let (set, strategy) = cursor.query_with_strategy(&next, 5.1);
    assert_eq!(strategy, QueryStrategy::Relocate);
    assert!(set.overlay_ids().contains(&"new"));
}

#[test]
fn long_overlay_keeps_advances_cheap() {
    let index = crate::index::timeline::tests::long_tail_index();
    let mut cursor = TimelineCursor::new(1.0);
    let mut t = 2990.0;
    let mut queries = 0u64;
    while t <= 3010.0 {
        assert_eq!(cursor.query(&index, t), index.query_linear(t), "t={t}");
        t += 0.05;
        queries += 1;
    }
    assert_eq!(cursor.stats().relocated, 1);
    assert!(
        cursor.stats().candidates <= queries * 8,
        "{} candidates over {queries} queries",
        cursor.stats().candidates
    );
}
