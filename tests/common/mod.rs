#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use nightly_close::{
    core::ClosureCalculator,
    domain::{ClosureRecord, InputField, RawInputs},
    storage::JsonLedgerStore,
};
use tempfile::TempDir;

/// A store backed by `closures.json` inside a fresh temporary directory.
pub fn temp_store() -> (JsonLedgerStore, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let store = JsonLedgerStore::new(temp.path().join("data").join("closures.json"))
        .expect("create ledger store");
    (store, temp)
}

/// The worked example: 155 revenue, 358 costs, 158 owed to the partner.
pub fn reference_inputs() -> RawInputs {
    let mut raw = RawInputs::zeroed();
    raw.set(InputField::ReservedCash, "50")
        .set(InputField::WalkInCash, "30")
        .set(InputField::EntryCard, "20")
        .set(InputField::BarCash, "40")
        .set(InputField::BarCard, "10")
        .set(InputField::CloakroomCash, "5")
        .set(InputField::Bartender, "80")
        .set(InputField::Cashier, "60")
        .set(InputField::SecurityLead, "40")
        .set(InputField::Cleaning, "20")
        .set(InputField::Vat, "8.00")
        .set(InputField::Rent, "100.00")
        .set_consumption("Drink", "5.00", "10");
    raw
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, day, hour, 15, 0)
        .single()
        .expect("valid timestamp")
}

/// A saved closure whose bar cash equals `bar_cash`, stamped at `timestamp`.
pub fn record_with_bar_cash(bar_cash: u32, timestamp: DateTime<Utc>) -> ClosureRecord {
    let mut raw = RawInputs::zeroed();
    raw.set(InputField::BarCash, bar_cash.to_string());
    ClosureCalculator::compute(&raw)
        .expect("valid inputs")
        .finalize(timestamp)
}
