mod common;

use std::time::Duration;

use common::{collection_with, names, paths, MemStore, SAVE_DELAY, SAVE_PATH};
use radio_core::{markup, CollectionEvent, Station, StationCollection, DEFAULT_STATIONS};

#[test]
fn test_load_uses_first_readable_candidate() {
    let store = MemStore::default();
    store.put("/mem/broken", "<Stations><Station><uri>http://x</uri>");
    store.put(
        "/mem/good",
        "<Stations><Station><name>Good</name><uri>http://good</uri></Station></Stations>",
    );
    store.put(
        "/mem/later",
        "<Stations><Station><name>Later</name><uri>http://later</uri></Station></Stations>",
    );

    let mut collection = StationCollection::new(
        paths(&["/mem/missing", "/mem/broken", "/mem/good", "/mem/later"]),
        SAVE_DELAY,
        store.clone(),
    );
    let mut events = collection.subscribe();
    collection.load().unwrap();

    assert_eq!(names(&collection), ["Good"]);
    assert_eq!(events.try_recv().unwrap(), CollectionEvent::Loaded);
    assert!(!collection.has_pending_save());
}

#[test]
fn test_load_falls_back_to_defaults() {
    let store = MemStore::default();
    store.put("/mem/garbage", "<Stations><Station></Stations>");

    let mut collection =
        StationCollection::new(paths(&["/mem/garbage", "/mem/missing"]), SAVE_DELAY, store);
    collection.load().unwrap();

    let defaults = markup::decode_str(DEFAULT_STATIONS).unwrap();
    assert_eq!(collection.len(), defaults.len());
    assert_eq!(collection.first().unwrap().name(), Some("FIP Paris"));
    assert_eq!(collection.last().unwrap().name(), Some("Radio Grenouille"));
}

#[test]
fn test_load_twice_keeps_first_result() {
    let store = MemStore::default();
    let mut collection = collection_with(&store, &[("a", "http://a")]);
    store.put(
        "/mem/seed",
        "<Stations><Station><name>b</name><uri>http://b</uri></Station></Stations>",
    );
    collection.load().unwrap();
    assert_eq!(names(&collection), ["a"]);
}

#[test]
fn test_duplicates_leave_collection_unchanged() {
    let store = MemStore::default();
    let mut collection = collection_with(&store, &[("a", "http://a"), ("b", "http://b")]);
    let mut events = collection.subscribe();

    collection.append(Station::new(Some("a".into()), "http://elsewhere"));
    collection.append(Station::new(Some("new".into()), "http://b"));
    let existing = collection.first().unwrap().clone();
    collection.prepend(existing);

    assert_eq!(names(&collection), ["a", "b"]);
    assert!(events.try_recv().is_err());
    assert!(!collection.has_pending_save());
}

#[test]
fn test_change_events() {
    let store = MemStore::default();
    let mut collection = collection_with(&store, &[("a", "http://a")]);
    let mut events = collection.subscribe();

    let b = Station::new(Some("b".into()), "http://b");
    let b_uid = b.uid().to_owned();
    collection.append(b);
    collection.move_first(&b_uid);
    collection.set_name(&b_uid, Some("bee".into()));
    let removed = collection.remove(&b_uid).unwrap();

    match events.try_recv().unwrap() {
        CollectionEvent::StationAdded(s) => assert_eq!(s.uid(), b_uid),
        other => panic!("unexpected event: {other:?}"),
    }
    match events.try_recv().unwrap() {
        CollectionEvent::StationMoved(s) => assert_eq!(s.uid(), b_uid),
        other => panic!("unexpected event: {other:?}"),
    }
    match events.try_recv().unwrap() {
        CollectionEvent::StationModified(s) => assert_eq!(s.name(), Some("bee")),
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(events.try_recv().unwrap(), CollectionEvent::StationRemoved(removed));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_lookup_and_membership() {
    let store = MemStore::default();
    let collection = collection_with(&store, &[("Nova", "http://nova"), ("FIP", "https://fip")]);

    let fip = collection.find_by_name("FIP").unwrap();
    assert_eq!(collection.position(fip.uid()), Some(1));
    assert!(collection.contains(fip.uid()));
    assert_eq!(collection.get(1), Some(fip));
    assert_eq!(collection.find_by_guessing("https://fip"), Some(fip));
    assert_eq!(collection.find_by_guessing("FIP"), Some(fip));
    assert!(collection.find_by_guessing("https://unknown").is_none());
    assert!(collection.find_by_name("").is_none());
}

#[test]
fn test_navigation_boundaries() {
    let store = MemStore::default();
    let mut collection = collection_with(&store, &[("a", "http://a"), ("b", "http://b")]);
    let last = collection.last().unwrap().uid().to_owned();
    let first = collection.first().unwrap().uid().to_owned();

    assert!(collection.next(Some(&last), false, false).is_none());
    assert_eq!(collection.next(Some(&last), true, false).unwrap().uid(), first);
    assert!(collection.prev(Some(&first), false, false).is_none());
    assert_eq!(collection.prev(Some(&first), true, false).unwrap().uid(), last);
}

#[test]
fn test_shuffle_order_is_a_permutation() {
    let store = MemStore::default();
    let mut collection = collection_with(
        &store,
        &[
            ("a", "http://a"),
            ("b", "http://b"),
            ("c", "http://c"),
            ("d", "http://d"),
        ],
    );

    let mut walked = Vec::new();
    let mut current = collection.prev(None, false, true).map(|s| s.uid().to_owned());
    while let Some(uid) = current {
        walked.push(uid.clone());
        current = collection.prev(Some(&uid), false, true).map(|s| s.uid().to_owned());
    }

    let mut members: Vec<String> = collection.iter().map(|s| s.uid().to_owned()).collect();
    walked.sort();
    members.sort();
    assert_eq!(walked, members);
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_changes_is_saved_once() {
    let store = MemStore::default();
    let mut collection = collection_with(&store, &[]);

    for i in 0..5 {
        collection.append(Station::new(Some(format!("s{i}")), format!("http://s{i}")));
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    assert!(!collection.run_pending_save());
    assert_eq!(store.writes(), 0);

    collection.save_due().await;
    assert!(collection.run_pending_save());
    assert_eq!(store.writes(), 1);

    let saved = markup::decode_str(&store.get(SAVE_PATH).unwrap()).unwrap();
    assert_eq!(saved.len(), 5);

    let idle = tokio::time::timeout(Duration::from_secs(10), collection.save_due()).await;
    assert!(idle.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_user_agent_edit_does_not_schedule_save() {
    let store = MemStore::default();
    let mut collection = collection_with(&store, &[("a", "http://a")]);
    let uid = collection.first().unwrap().uid().to_owned();

    collection.set_user_agent(&uid, Some("VLC/3.0".into()));
    assert!(!collection.has_pending_save());

    collection.set_uri(&uid, "http://a2".into());
    collection.save_due().await;
    collection.run_pending_save();

    let saved = store.get(SAVE_PATH).unwrap();
    assert!(saved.contains("<user-agent>VLC/3.0</user-agent>"));
    assert!(saved.contains("<uri>http://a2</uri>"));
}

#[test]
fn test_drop_flushes_pending_save() {
    let store = MemStore::default();
    let mut collection = collection_with(&store, &[("a", "http://a")]);
    let uid = collection.first().unwrap().uid().to_owned();
    collection.remove(&uid);
    assert_eq!(store.writes(), 0);

    drop(collection);
    assert_eq!(store.writes(), 1);
    assert!(markup::decode_str(&store.get(SAVE_PATH).unwrap())
        .unwrap()
        .is_empty());
}

#[test]
fn test_save_failure_is_reported() {
    let store = MemStore::read_only();
    let mut collection = collection_with(&store, &[("a", "http://a")]);
    let mut events = collection.subscribe();

    assert!(collection.save().is_err());
    match events.try_recv().unwrap() {
        CollectionEvent::Error(message) => assert!(message.contains("stations")),
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(collection.len(), 1);
}
