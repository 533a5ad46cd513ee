mod common;

use chrono::{Duration, NaiveDate};
use common::{at, pct, Fixture};
use rentshare_core::storage::NewSnapshot;
use rentshare_core::{OwnershipLedger, RecordStore, RentshareError};
use uuid::Uuid;

#[test]
fn test_replace_single_changes_only_target_pair() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let casa = f.property("Casa 2");
    let ana = f.owner("Ana", "Souza");
    let bruno = f.owner("Bruno", "Lima");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    ledger
        .replace_full(&[
            NewSnapshot::new(loja, ana, pct("60")),
            NewSnapshot::new(loja, bruno, pct("40")),
            NewSnapshot::new(casa, ana, pct("100")),
        ])
        .unwrap();
    let before = ledger.latest_version().unwrap().unwrap();

    f.clock.advance(Duration::days(1));
    let after = ledger.replace_single(loja, ana, pct("70"), None).unwrap();

    assert!(after.stamp > before.stamp);
    assert_eq!(after.snapshots.len(), before.snapshots.len());
    for snapshot in &before.snapshots {
        let carried = after
            .find(&snapshot.property_id, &snapshot.owner_id)
            .expect("pair carried forward");
        if snapshot.property_id == loja && snapshot.owner_id == ana {
            assert_eq!(carried.percentage, pct("70"));
        } else {
            assert_eq!(carried.percentage, snapshot.percentage);
        }
        assert_eq!(carried.version, after.stamp);
    }

    // The old version is untouched
    let old = f.store.snapshots_at(&before.stamp).unwrap();
    assert_eq!(old, before.snapshots);
}

#[test]
fn test_replace_single_adds_new_owner_without_sum_check() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    let b = f.owner("Bruno", "Lima");
    let c = f.owner("Carla", "Dias");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    ledger
        .replace_full(&[
            NewSnapshot::new(loja, a, pct("60")),
            NewSnapshot::new(loja, b, pct("40")),
        ])
        .unwrap();
    f.clock.advance(Duration::hours(1));
    let version = ledger
        .replace_single(loja, c, pct("25"), Some("new partner".to_string()))
        .unwrap();

    assert_eq!(version.snapshots.len(), 3);
    assert!(version.snapshots.iter().all(|s| s.version == version.stamp));
    assert_eq!(version.percentage_of(&loja, &a), Some(pct("60")));
    assert_eq!(version.percentage_of(&loja, &b), Some(pct("40")));
    assert_eq!(version.percentage_of(&loja, &c), Some(pct("25")));
    assert_eq!(
        version.find(&loja, &c).unwrap().note.as_deref(),
        Some("new partner")
    );

    let unbalanced = ledger.unbalanced_properties(&version);
    assert_eq!(unbalanced.len(), 1);
    assert_eq!(unbalanced[0].total_label(), "125");
}

#[test]
fn test_replace_single_rejects_unknown_references() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    let err = ledger
        .replace_single(Uuid::new_v4(), ana, pct("10"), None)
        .unwrap_err();
    assert!(matches!(err, RentshareError::NotFound(_)));

    let err = ledger
        .replace_single(loja, Uuid::new_v4(), pct("10"), None)
        .unwrap_err();
    assert!(matches!(err, RentshareError::NotFound(_)));
    assert!(ledger.latest_version().unwrap().is_none());
}

#[test]
fn test_replace_full_is_all_or_nothing() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    let first = ledger
        .replace_full(&[NewSnapshot::new(loja, ana, pct("100"))])
        .unwrap();

    f.clock.advance(Duration::days(1));
    let err = ledger
        .replace_full(&[
            NewSnapshot::new(loja, ana, pct("50")),
            NewSnapshot::new(loja, Uuid::new_v4(), pct("50")),
        ])
        .unwrap_err();
    assert!(matches!(err, RentshareError::NotFound(_)));

    let latest = ledger.latest_version().unwrap().unwrap();
    assert_eq!(latest.stamp, first.stamp);
    assert_eq!(f.store.version_stamps().unwrap().len(), 1);

    let err = ledger.replace_full(&[]).unwrap_err();
    assert!(matches!(err, RentshareError::InvalidArgument(_)));
}

#[test]
fn test_replace_full_does_not_carry_forward() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let casa = f.property("Casa 2");
    let ana = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    ledger
        .replace_full(&[
            NewSnapshot::new(loja, ana, pct("100")),
            NewSnapshot::new(casa, ana, pct("100")),
        ])
        .unwrap();
    f.clock.advance(Duration::days(1));
    let version = ledger
        .replace_full(&[NewSnapshot::new(casa, ana, pct("50"))])
        .unwrap();

    assert_eq!(version.snapshots.len(), 1);
    assert!(version.find(&loja, &ana).is_none());
}

#[test]
fn test_replace_full_nudges_colliding_stamp() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    let first = ledger
        .replace_full(&[NewSnapshot::new(loja, ana, pct("100"))])
        .unwrap();
    // Clock goes backwards
    f.clock.set(at(2024, 6, 1));
    let second = ledger
        .replace_full(&[NewSnapshot::new(loja, ana, pct("90"))])
        .unwrap();

    assert_eq!(second.stamp, first.stamp.next());
}

#[test]
fn test_get_version_by_day_returns_every_snapshot_of_that_day() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let bruno = f.owner("Bruno", "Lima");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    f.clock.set(at(2025, 1, 1));
    let first = ledger.replace_single(loja, ana, pct("60"), None).unwrap();
    f.clock.advance(Duration::hours(2));
    let second = ledger.replace_single(loja, bruno, pct("40"), None).unwrap();

    let day = ledger
        .get_version(Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        .unwrap();
    assert_eq!(day.len(), 3);
    assert_eq!(day.iter().filter(|s| s.version == first.stamp).count(), 1);
    assert_eq!(day.iter().filter(|s| s.version == second.stamp).count(), 2);
    assert_eq!(ledger.list_versions().unwrap().len(), 1);
}

#[test]
fn test_get_version_latest_and_by_day() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    assert!(ledger.get_version(None).unwrap().is_empty());

    f.clock.set(at(2025, 1, 10));
    ledger.replace_single(loja, ana, pct("10"), None).unwrap();
    f.clock.set(at(2025, 2, 10));
    ledger.replace_single(loja, ana, pct("20"), None).unwrap();
    f.clock.set(at(2025, 3, 10));
    let latest = ledger.replace_single(loja, ana, pct("30"), None).unwrap();

    let current = ledger.get_version(None).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].version, latest.stamp);
    assert_eq!(current[0].percentage, pct("30"));

    let feb = ledger
        .get_version(Some(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()))
        .unwrap();
    assert_eq!(feb.len(), 1);
    assert_eq!(feb[0].percentage, pct("20"));

    // Exact day, not "on or before"
    let err = ledger
        .get_version(Some(NaiveDate::from_ymd_opt(2025, 2, 11).unwrap()))
        .unwrap_err();
    assert!(matches!(err, RentshareError::NotFound(_)));

    assert_eq!(
        ledger.list_versions().unwrap(),
        vec![
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        ]
    );
}

#[test]
fn test_list_versions_collapses_same_day() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    ledger.replace_single(loja, ana, pct("10"), None).unwrap();
    f.clock.advance(Duration::minutes(5));
    ledger.replace_single(loja, ana, pct("20"), None).unwrap();

    assert_eq!(ledger.list_versions().unwrap().len(), 1);
    assert_eq!(f.store.version_stamps().unwrap().len(), 2);
}

#[test]
fn test_version_as_of() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    f.clock.set(at(2025, 1, 10));
    let january = ledger.replace_single(loja, ana, pct("10"), None).unwrap();
    f.clock.set(at(2025, 4, 10));
    ledger.replace_single(loja, ana, pct("40"), None).unwrap();

    let march = ledger.version_as_of(at(2025, 3, 31)).unwrap();
    assert_eq!(march.stamp, january.stamp);
    assert_eq!(
        ledger
            .percentage_for(&loja, &ana, Some(at(2025, 3, 31)))
            .unwrap(),
        Some(pct("10"))
    );
    assert_eq!(
        ledger.percentage_for(&loja, &ana, None).unwrap(),
        Some(pct("40"))
    );

    let err = ledger.version_as_of(at(2024, 12, 31)).unwrap_err();
    assert!(matches!(err, RentshareError::NotFound(_)));
}

#[test]
fn test_delete_snapshot() {
    let f = Fixture::new();
    let loja = f.property("Loja 1");
    let ana = f.owner("Ana", "Souza");
    let bruno = f.owner("Bruno", "Lima");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    let version = ledger
        .replace_full(&[
            NewSnapshot::new(loja, ana, pct("50")),
            NewSnapshot::new(loja, bruno, pct("50")),
        ])
        .unwrap();
    let target = version.find(&loja, &bruno).unwrap().id;

    ledger.delete_snapshot(&target).unwrap();
    let latest = ledger.latest_version().unwrap().unwrap();
    assert_eq!(latest.snapshots.len(), 1);
    assert!(f.store.get_snapshot(&target).unwrap().is_none());

    let err = ledger.delete_snapshot(&target).unwrap_err();
    assert!(matches!(err, RentshareError::NotFound(_)));
}
