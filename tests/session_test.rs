//! Tests for the picker session state machine

use fleettree::application::{PickerAction, PickerEvent, PickerSession, RejectReason};
use fleettree::domain::{EntityId, EntityKind, EntityRecord};
use fleettree::util::testing::{group, init_test_setup, north_fleet};

fn id(s: &str) -> EntityId {
    EntityId::from(s)
}

fn fetching(kind: EntityKind) -> PickerSession {
    PickerSession::new(EntityKind::Group)
        .apply(PickerAction::BeginFetch(kind))
        .0
}

fn loaded_groups() -> PickerSession {
    let (session, _) = fetching(EntityKind::Group).apply(PickerAction::CompleteFetch {
        kind: EntityKind::Group,
        records: north_fleet(),
    });
    session
}

fn vehicles() -> Vec<EntityRecord> {
    vec![
        EntityRecord::vehicle("v2", "Van 3"),
        EntityRecord::vehicle("v1", "Truck 12"),
    ]
}

fn loaded_vehicles() -> PickerSession {
    let (session, _) = fetching(EntityKind::Vehicle).apply(PickerAction::CompleteFetch {
        kind: EntityKind::Vehicle,
        records: vehicles(),
    });
    session
}

// ============================================================
// Loading
// ============================================================

#[test]
fn given_fetch_in_flight_when_interacting_then_actions_are_rejected() {
    init_test_setup();
    let session = fetching(EntityKind::Group);
    assert!(session.is_loading());

    for action in [
        PickerAction::SetQuery("north".into()),
        PickerAction::Toggle(id("1")),
        PickerAction::Select(id("1")),
        PickerAction::Commit,
    ] {
        let name = action.name();
        let (next, events) = session.clone().apply(action);
        assert_eq!(
            events,
            vec![PickerEvent::Rejected {
                action: name,
                reason: RejectReason::Loading,
            }]
        );
        assert_eq!(next.query(), "");
    }
}

#[test]
fn given_fetch_completes_when_loaded_then_reports_and_builds_forest() {
    let session = fetching(EntityKind::Group);

    let (session, events) = session.apply(PickerAction::CompleteFetch {
        kind: EntityKind::Group,
        records: north_fleet(),
    });

    assert!(!session.is_loading());
    assert_eq!(session.forest().len(), 1);
    assert!(matches!(
        events.as_slice(),
        [PickerEvent::RecordsLoaded { kind: EntityKind::Group, report }] if report.built == 3
    ));
    assert!(session.expansion().is_expanded(&id("1")));
}

#[test]
fn given_kind_switched_during_fetch_when_stale_result_arrives_then_it_is_discarded() {
    let session = fetching(EntityKind::Group);
    let (session, _) = session.apply(PickerAction::BeginFetch(EntityKind::Vehicle));
    assert_eq!(session.active_kind(), EntityKind::Vehicle);

    let (session, events) = session.apply(PickerAction::CompleteFetch {
        kind: EntityKind::Group,
        records: north_fleet(),
    });

    assert_eq!(
        events,
        vec![PickerEvent::FetchDiscarded {
            kind: EntityKind::Group
        }]
    );
    assert!(session.is_loading());
    assert!(session.records().is_empty());

    let (session, _) = session.apply(PickerAction::CompleteFetch {
        kind: EntityKind::Vehicle,
        records: vehicles(),
    });
    assert!(!session.is_loading());
    assert_eq!(session.records().len(), 2);
}

// ============================================================
// Context resets
// ============================================================

#[test]
fn given_query_and_selection_when_kind_switched_then_context_and_expansion_reset() {
    let session = loaded_groups();
    let (session, _) = session.apply(PickerAction::Toggle(id("1")));
    let (session, _) = session.apply(PickerAction::SetQuery("fleet".into()));
    let (session, _) = session.apply(PickerAction::Select(id("2")));

    let (session, events) = session.apply(PickerAction::SwitchKind(EntityKind::Driver));

    assert_eq!(events, vec![PickerEvent::QueryChanged(String::new())]);
    assert_eq!(session.query(), "");
    assert!(session.selection().selected().is_none());
    assert!(session.expansion().is_empty());
    assert!(session.records().is_empty());
    assert!(session.forest().is_empty());
}

#[test]
fn given_switch_back_to_groups_when_refetched_then_root_defaults_are_seeded_again() {
    let session = loaded_groups();
    let (session, _) = session.apply(PickerAction::Toggle(id("1")));
    let (session, _) = session.apply(PickerAction::SwitchKind(EntityKind::Vehicle));

    let (session, _) = session.apply(PickerAction::BeginFetch(EntityKind::Group));
    let (session, _) = session.apply(PickerAction::CompleteFetch {
        kind: EntityKind::Group,
        records: north_fleet(),
    });

    assert!(session.expansion().is_expanded(&id("1")));
}

#[test]
fn given_same_kind_when_switching_then_nothing_changes() {
    let session = loaded_groups();
    let (session, _) = session.apply(PickerAction::SetQuery("fleet".into()));

    let (session, events) = session.apply(PickerAction::SwitchKind(EntityKind::Group));

    assert!(events.is_empty());
    assert_eq!(session.query(), "fleet");
}

#[test]
fn given_collapsed_root_when_reopened_then_expansion_survives_but_query_clears() {
    let session = loaded_groups();
    let (session, _) = session.apply(PickerAction::Toggle(id("1")));
    let (session, _) = session.apply(PickerAction::SetQuery("fleet".into()));
    let (session, _) = session.apply(PickerAction::Select(id("3")));

    let (session, events) = session.apply(PickerAction::Reopen);

    assert_eq!(events, vec![PickerEvent::QueryChanged(String::new())]);
    assert!(!session.expansion().is_expanded(&id("1")));
    assert!(session.selection().commit().is_empty());
}

// ============================================================
// Query, toggle, selection
// ============================================================

#[test]
fn given_new_query_when_set_then_emits_query_changed_once() {
    let session = loaded_groups();

    let (session, first) = session.apply(PickerAction::SetQuery("fleet b".into()));
    let (session, second) = session.apply(PickerAction::SetQuery("fleet b".into()));

    assert_eq!(first, vec![PickerEvent::QueryChanged("fleet b".into())]);
    assert!(second.is_empty());
    let texts: Vec<_> = session.visible_rows().into_iter().map(|r| r.text).collect();
    assert_eq!(texts, vec!["North", "Fleet B"]);
}

#[test]
fn given_group_when_toggled_then_emits_new_state() {
    let session = loaded_groups();

    let (_, events) = session.apply(PickerAction::Toggle(id("1")));

    assert_eq!(
        events,
        vec![PickerEvent::ExpandToggled {
            id: id("1"),
            expanded: false
        }]
    );
}

#[test]
fn given_unknown_id_when_toggled_then_rejected() {
    let session = loaded_groups();

    let (_, events) = session.apply(PickerAction::Toggle(id("42")));

    assert_eq!(
        events,
        vec![PickerEvent::Rejected {
            action: "toggle",
            reason: RejectReason::UnknownId(id("42")),
        }]
    );
}

#[test]
fn given_flat_kind_when_toggled_then_rejected() {
    let session = loaded_vehicles();

    let (_, events) = session.apply(PickerAction::Toggle(id("v1")));

    assert_eq!(
        events,
        vec![PickerEvent::Rejected {
            action: "toggle",
            reason: RejectReason::FlatKind(EntityKind::Vehicle),
        }]
    );
}

#[test]
fn given_selected_group_when_committing_then_emits_selection_with_one_record() {
    let session = loaded_groups();
    let (session, _) = session.apply(PickerAction::Select(id("2")));

    let (_, events) = session.apply(PickerAction::Commit);

    match events.as_slice() {
        [PickerEvent::SelectionChanged(records)] => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].text, "Fleet A");
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn given_nothing_selected_when_committing_then_emits_empty_selection() {
    let session = loaded_groups();

    let (_, events) = session.apply(PickerAction::Commit);

    assert_eq!(events, vec![PickerEvent::SelectionChanged(vec![])]);
}

#[test]
fn given_orphan_group_when_selecting_then_rejected_and_commit_is_empty() {
    let session = loaded(vec![group("1", "#", "North"), group("5", "99", "Orphan")]);
    assert_eq!(session.records().len(), 2);

    let (session, events) = session.apply(PickerAction::Select(id("5")));
    let (_, committed) = session.apply(PickerAction::Commit);

    assert_eq!(
        events,
        vec![PickerEvent::Rejected {
            action: "select",
            reason: RejectReason::UnknownId(id("5")),
        }]
    );
    assert_eq!(committed, vec![PickerEvent::SelectionChanged(vec![])]);
}

#[test]
fn given_cycle_members_when_selecting_then_rejected() {
    let session = loaded(vec![
        group("1", "#", "North"),
        group("a", "b", "Loop A"),
        group("b", "a", "Loop B"),
    ]);

    let (session, events) = session.apply(PickerAction::Select(id("a")));

    assert!(matches!(
        events.as_slice(),
        [PickerEvent::Rejected {
            reason: RejectReason::UnknownId(_),
            ..
        }]
    ));
    assert!(session.selection().selected().is_none());
}

#[test]
fn given_id_of_other_kind_when_selecting_then_rejected() {
    let session = loaded_vehicles();

    let (session, events) = session.apply(PickerAction::Select(id("1")));

    assert!(matches!(
        events.as_slice(),
        [PickerEvent::Rejected {
            reason: RejectReason::UnknownId(_),
            ..
        }]
    ));
    assert!(session.selection().selected().is_none());
}

fn loaded(records: Vec<EntityRecord>) -> PickerSession {
    PickerSession::new(EntityKind::Group)
        .apply(PickerAction::CompleteFetch {
            kind: EntityKind::Group,
            records,
        })
        .0
}

// ============================================================
// Visible rows
// ============================================================

#[test]
fn given_default_expansion_when_flattening_groups_then_shows_roots_and_their_children() {
    let records = vec![
        group("1", "#", "North"),
        group("2", "1", "Fleet A"),
        group("4", "2", "Night shift"),
        group("3", "1", "Fleet B"),
    ];
    let session = loaded(records);
    let (session, _) = session.apply(PickerAction::Select(id("3")));

    let rows = session.visible_rows();

    let shape: Vec<_> = rows
        .iter()
        .map(|r| (r.depth, r.text.as_str(), r.has_children, r.expanded, r.selected))
        .collect();
    assert_eq!(
        shape,
        vec![
            (0, "North", true, true, false),
            (1, "Fleet A", true, false, false),
            (1, "Fleet B", false, false, true),
        ]
    );
}

#[test]
fn given_query_when_flattening_then_forced_ancestors_open_without_storing() {
    let records = vec![
        group("1", "#", "North"),
        group("2", "1", "Fleet A"),
        group("4", "2", "Night shift"),
    ];
    let session = loaded(records);
    let (session, _) = session.apply(PickerAction::SetQuery("night".into()));

    let depths: Vec<_> = session.visible_rows().iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);
    assert_eq!(session.expansion().stored(&id("2")), None);

    let (session, _) = session.apply(PickerAction::SetQuery(String::new()));
    assert_eq!(session.visible_rows().len(), 2);
}

#[test]
fn given_vehicles_when_flattening_then_rows_are_flat_and_sorted() {
    let session = loaded_vehicles();
    let (session, _) = session.apply(PickerAction::Select(id("v2")));

    let rows = session.visible_rows();

    let shape: Vec<_> = rows
        .iter()
        .map(|r| (r.depth, r.text.as_str(), r.has_children, r.selected))
        .collect();
    assert_eq!(
        shape,
        vec![(0, "Truck 12", false, false), (0, "Van 3", false, true)]
    );
}

#[test]
fn given_expand_all_when_flattening_then_every_group_is_visible() {
    let records = vec![
        group("1", "#", "North"),
        group("2", "1", "Fleet A"),
        group("4", "2", "Night shift"),
    ];
    let session = loaded(records);

    let (session, events) = session.apply(PickerAction::ExpandAll);

    assert!(events.is_empty());
    assert_eq!(session.visible_rows().len(), 3);
}
