mod common;

use chrono::Duration;
use common::{at, money, pct, period, Fixture};
use rentshare_core::storage::{NewRentRecord, NewSnapshot, RentRecordUpdate};
use rentshare_core::{
    FeeAllocator, Money, OwnershipBinding, OwnershipLedger, RecordStore, RentshareError,
};

#[test]
fn test_fee_split_by_latest_percentages() {
    let f = Fixture::new();
    let p = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    let b = f.owner("Bruno", "Lima");
    OwnershipLedger::new(&f.store, &f.clock)
        .replace_full(&[
            NewSnapshot::new(p, a, pct("60")),
            NewSnapshot::new(p, b, pct("40")),
        ])
        .unwrap();

    let march = period(2025, 3);
    let ra = f.rent(
        NewRentRecord::new(p, a, march)
            .with_gross(money("3000"))
            .with_admin_fee(money("1000.00")),
    );
    let rb = f.rent(
        NewRentRecord::new(p, b, march)
            .with_gross(money("2000"))
            .with_admin_fee(money("1000.00")),
    );

    let report = FeeAllocator::new(&f.store, &f.clock)
        .recalculate_all()
        .unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.updated, 2);
    assert_eq!(report.skipped, 0);
    assert!(report.is_clean());

    let ra = f.store.get_rent_record(&ra.id).unwrap().unwrap();
    let rb = f.store.get_rent_record(&rb.id).unwrap().unwrap();
    assert_eq!(ra.fee_share, money("600.00"));
    assert_eq!(rb.fee_share, money("400.00"));
    assert_eq!(ra.net_amount, money("2400.00"));
    assert_eq!(rb.net_amount, money("1600.00"));
}

#[test]
fn test_recalculation_is_idempotent() {
    let f = Fixture::new();
    let p = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    OwnershipLedger::new(&f.store, &f.clock)
        .replace_single(p, a, pct("33.333333"), None)
        .unwrap();
    for month in 1..=3 {
        f.rent(
            NewRentRecord::new(p, a, period(2025, month))
                .with_gross(money("1000"))
                .with_admin_fee(money("100.00")),
        );
    }

    let allocator = FeeAllocator::new(&f.store, &f.clock);
    let first = allocator.recalculate_all().unwrap();
    assert_eq!(first.updated, 3);
    let snapshot = f.store.list_rent_records(&Default::default()).unwrap();

    let second = allocator.recalculate_all().unwrap();
    assert_eq!(second.processed, 3);
    assert_eq!(second.updated, 0);
    assert_eq!(
        f.store.list_rent_records(&Default::default()).unwrap(),
        snapshot
    );
    assert!(snapshot.iter().all(|r| r.fee_share == money("33.33")));
}

#[test]
fn test_missing_percentage_is_skipped_not_fatal() {
    let f = Fixture::new();
    let p = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    let stranger = f.owner("Zeca", "Reis");
    OwnershipLedger::new(&f.store, &f.clock)
        .replace_single(p, a, pct("100"), None)
        .unwrap();

    let march = period(2025, 3);
    let good = f.rent(
        NewRentRecord::new(p, a, march)
            .with_gross(money("500"))
            .with_admin_fee(money("50")),
    );
    let orphan = f.rent(
        NewRentRecord::new(p, stranger, march)
            .with_gross(money("500"))
            .with_admin_fee(money("50")),
    );

    let report = FeeAllocator::new(&f.store, &f.clock)
        .recalculate_all()
        .unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].record_id, orphan.id);
    assert!(report.errors[0]
        .reason
        .contains("no ownership percentage found"));

    let good = f.store.get_rent_record(&good.id).unwrap().unwrap();
    assert_eq!(good.fee_share, money("50"));
    let orphan = f.store.get_rent_record(&orphan.id).unwrap().unwrap();
    assert_eq!(orphan.fee_share, Money::zero());

    assert!(matches!(
        report.into_result(),
        Err(RentshareError::PartialFailure { skipped: 1, .. })
    ));
}

#[test]
fn test_negative_fee_is_skipped() {
    let f = Fixture::new();
    let p = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    OwnershipLedger::new(&f.store, &f.clock)
        .replace_single(p, a, pct("100"), None)
        .unwrap();
    f.rent(
        NewRentRecord::new(p, a, period(2025, 3))
            .with_gross(money("500"))
            .with_admin_fee(money("-10")),
    );

    let report = FeeAllocator::new(&f.store, &f.clock)
        .recalculate_all()
        .unwrap();
    assert_eq!(report.skipped, 1);
    assert!(report.errors[0].reason.contains("negative"));
}

#[test]
fn test_without_gross_only_fee_share_is_derived() {
    let f = Fixture::new();
    let p = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    OwnershipLedger::new(&f.store, &f.clock)
        .replace_single(p, a, pct("50"), None)
        .unwrap();
    let record = f.rent(
        NewRentRecord::new(p, a, period(2025, 3))
            .with_admin_fee(money("200"))
            .with_net(money("1234.56")),
    );

    FeeAllocator::new(&f.store, &f.clock)
        .recalculate_all()
        .unwrap();
    let record = f.store.get_rent_record(&record.id).unwrap().unwrap();
    assert_eq!(record.fee_share, money("100"));
    assert_eq!(record.net_amount, money("1234.56"));
}

#[test]
fn test_edit_then_recalculate() {
    let f = Fixture::new();
    let p = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    OwnershipLedger::new(&f.store, &f.clock)
        .replace_single(p, a, pct("50"), None)
        .unwrap();
    let record = f.rent(
        NewRentRecord::new(p, a, period(2025, 3))
            .with_gross(money("1000"))
            .with_admin_fee(money("100")),
    );
    let allocator = FeeAllocator::new(&f.store, &f.clock);
    allocator.recalculate_all().unwrap();

    f.store
        .update_rent_record(
            &record.id,
            &RentRecordUpdate {
                total_admin_fee: Some(money("300")),
                ..Default::default()
            },
        )
        .unwrap();
    let report = allocator.recalculate_all().unwrap();
    assert_eq!(report.updated, 1);

    let record = f.store.get_rent_record(&record.id).unwrap().unwrap();
    assert_eq!(record.fee_share, money("150"));
    assert_eq!(record.net_amount, money("850"));
}

#[test]
fn test_period_end_binding_uses_version_in_force() {
    let f = Fixture::new();
    let p = f.property("Loja 1");
    let a = f.owner("Ana", "Souza");
    let ledger = OwnershipLedger::new(&f.store, &f.clock);

    f.clock.set(at(2025, 1, 15));
    ledger.replace_single(p, a, pct("50"), None).unwrap();
    f.clock.set(at(2025, 4, 15));
    ledger.replace_single(p, a, pct("80"), None).unwrap();

    let early = f.rent(
        NewRentRecord::new(p, a, period(2024, 12))
            .with_gross(money("1000"))
            .with_admin_fee(money("100")),
    );
    let march = f.rent(
        NewRentRecord::new(p, a, period(2025, 3))
            .with_gross(money("1000"))
            .with_admin_fee(money("100")),
    );
    let may = f.rent(
        NewRentRecord::new(p, a, period(2025, 5))
            .with_gross(money("1000"))
            .with_admin_fee(money("100")),
    );

    let report = FeeAllocator::new(&f.store, &f.clock)
        .with_binding(OwnershipBinding::PeriodEnd)
        .recalculate_all()
        .unwrap();
    assert_eq!(report.binding, OwnershipBinding::PeriodEnd);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors[0].record_id, early.id);

    let march_fee = f.store.get_rent_record(&march.id).unwrap().unwrap().fee_share;
    let may_fee = f.store.get_rent_record(&may.id).unwrap().unwrap().fee_share;
    assert_eq!(march_fee, money("50"));
    assert_eq!(may_fee, money("80"));

    // Latest binding puts everything on 80%
    f.clock.advance(Duration::days(1));
    let report = FeeAllocator::new(&f.store, &f.clock)
        .recalculate_all()
        .unwrap();
    assert!(report.is_clean());
    let march_fee = f.store.get_rent_record(&march.id).unwrap().unwrap().fee_share;
    assert_eq!(march_fee, money("80"));
}
