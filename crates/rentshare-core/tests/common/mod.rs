#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rentshare_core::storage::{NewOwner, NewRentRecord, RentRecord};
use rentshare_core::{ManualClock, Money, Percentage, Period, RecordStore, SqliteStore};
use uuid::Uuid;

pub struct Fixture {
    pub store: SqliteStore,
    pub clock: ManualClock,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: SqliteStore::open_in_memory().expect("in-memory store"),
            clock: ManualClock::new(at(2025, 1, 1)),
        }
    }

    pub fn property(&self, name: &str) -> Uuid {
        self.store.insert_property(name).expect("insert property").id
    }

    pub fn owner(&self, first: &str, last: &str) -> Uuid {
        self.store
            .insert_owner(&NewOwner::new(first).with_last_name(last))
            .expect("insert owner")
            .id
    }

    pub fn rent(&self, record: NewRentRecord) -> RentRecord {
        self.store.insert_rent_record(&record).expect("insert rent record")
    }
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid date")
}

pub fn pct(value: &str) -> Percentage {
    Percentage::parse(value).expect("valid percentage")
}

pub fn money(value: &str) -> Money {
    Money::parse(value).expect("valid amount")
}

pub fn period(year: i32, month: u32) -> Period {
    Period::new(year, month).expect("valid period")
}
