//! Tests for the ancestor-preserving search filter

use std::borrow::Cow;

use rstest::rstest;

use fleettree::domain::{
    build_forest, filter_forest, filter_records, preorder, EntityKind, EntityRecord, TreeNode,
};
use fleettree::util::testing::{group, init_test_setup, north_fleet};

fn regions() -> Vec<TreeNode> {
    build_forest(&[
        group("1", "#", "North"),
        group("2", "1", "Fleet A"),
        group("3", "1", "Fleet B"),
        group("4", "2", "Night shift"),
        group("5", "2", "Day shift"),
        group("6", "#", "South"),
        group("7", "6", "Harbour"),
        group("8", "7", "Night crew"),
    ])
}

fn flatten(forest: &[TreeNode]) -> Vec<(usize, String)> {
    preorder(forest)
        .map(|(depth, n)| (depth, n.text().to_string()))
        .collect()
}

#[test]
fn given_fleet_b_query_when_filtering_then_keeps_north_with_only_fleet_b() {
    init_test_setup();
    let forest = build_forest(&north_fleet());

    let filtered = filter_forest(&forest, "fleet b");

    assert_eq!(
        flatten(&filtered),
        vec![(0, "North".to_string()), (1, "Fleet B".to_string())]
    );
}

#[rstest]
#[case::empty("")]
#[case::spaces("   ")]
#[case::tabs("\t\n")]
fn given_blank_query_when_filtering_then_returns_forest_unchanged(#[case] query: &str) {
    let forest = regions();

    let filtered = filter_forest(&forest, query);

    assert!(matches!(filtered, Cow::Borrowed(_)));
    assert_eq!(filtered.as_ref(), forest.as_slice());
}

#[test]
fn given_match_in_two_subtrees_when_filtering_then_keeps_both_ancestor_chains() {
    let forest = regions();

    let filtered = filter_forest(&forest, "NIGHT");

    assert_eq!(
        flatten(&filtered),
        vec![
            (0, "North".to_string()),
            (1, "Fleet A".to_string()),
            (2, "Night shift".to_string()),
            (0, "South".to_string()),
            (1, "Harbour".to_string()),
            (2, "Night crew".to_string()),
        ]
    );
}

#[test]
fn given_matching_parent_when_filtering_then_non_matching_children_are_dropped() {
    let forest = regions();

    let filtered = filter_forest(&forest, "fleet a");

    assert_eq!(filtered.len(), 1);
    let fleet_a = &filtered[0].children[0];
    assert_eq!(fleet_a.text(), "Fleet A");
    assert!(fleet_a.is_leaf());
}

#[test]
fn given_no_match_when_filtering_then_result_is_empty() {
    let forest = regions();

    assert!(filter_forest(&forest, "x").is_empty());
}

#[test]
fn given_filtered_copy_when_filtering_then_input_forest_is_untouched() {
    let forest = regions();
    let before = forest.clone();

    let _ = filter_forest(&forest, "shift");

    assert_eq!(forest, before);
}

#[rstest]
#[case("night")]
#[case("fleet")]
#[case("h")]
#[case("nothing")]
#[case("")]
fn given_query_when_filtering_twice_then_result_is_idempotent(#[case] query: &str) {
    let forest = regions();

    let once = filter_forest(&forest, query).into_owned();
    let twice = filter_forest(&once, query).into_owned();

    assert_eq!(once, twice);
}

// ============================================================
// Flat lists for vehicles and drivers
// ============================================================

fn mixed() -> Vec<EntityRecord> {
    let mut no_id = EntityRecord::vehicle("x", "Ghost truck");
    no_id.id = None;
    vec![
        EntityRecord::vehicle("v2", "truck 7"),
        EntityRecord::vehicle("v1", "Truck 12"),
        EntityRecord::vehicle("v3", "Van 3"),
        EntityRecord::driver("d1", "Trudy"),
        no_id,
        group("1", "#", "Trucks"),
    ]
}

#[test]
fn given_vehicle_kind_when_filtering_records_then_returns_only_matching_vehicles_sorted() {
    let records = mixed();

    let hits = filter_records(&records, EntityKind::Vehicle, "TRUCK");

    let texts: Vec<&str> = hits.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Truck 12", "truck 7"]);
}

#[test]
fn given_blank_query_when_filtering_records_then_returns_all_of_kind_with_ids() {
    let records = mixed();

    let hits = filter_records(&records, EntityKind::Vehicle, " ");

    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|r| r.id.is_some()));
}

#[test]
fn given_kind_without_records_when_filtering_records_then_is_empty() {
    let records = vec![EntityRecord::vehicle("v1", "Truck")];

    assert!(filter_records(&records, EntityKind::Driver, "").is_empty());
}

#[test]
fn given_query_with_surrounding_space_when_filtering_then_space_is_ignored() {
    let forest = regions();

    let padded = filter_forest(&forest, " A ");

    assert_eq!(padded.as_ref(), filter_forest(&forest, "a").as_ref());
    assert_eq!(
        flatten(&padded),
        vec![
            (0, "North".to_string()),
            (1, "Fleet A".to_string()),
            (2, "Day shift".to_string()),
            (0, "South".to_string()),
            (1, "Harbour".to_string()),
        ]
    );
}
