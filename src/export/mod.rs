//! Flattened delimited export and raw ledger export.

use std::{fs, io::Write, path::Path};

use chrono::SecondsFormat;
use csv::{Terminator, WriterBuilder};

use crate::{
    domain::{Amount, ClosureRecord, MoneyFormat, VenueCosts, CONSUMPTION_CATALOG},
    errors::Result,
    storage::LedgerStore,
};

/// Delimiter and decimal mark for the table export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub decimal_separator: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            decimal_separator: ',',
        }
    }
}

/// Column names, one per flattened record field.
pub fn csv_header() -> Vec<String> {
    let mut header: Vec<String> = [
        "timestamp",
        "totalRevenue",
        "totalCosts",
        "totalOwedToPartner",
        "totalConsumption",
        "revenue.entry.reservedCash",
        "revenue.entry.walkInCash",
        "revenue.entry.cashTotal",
        "revenue.entry.cardTotal",
        "revenue.entry.total",
        "revenue.bar.cash",
        "revenue.bar.card",
        "revenue.bar.total",
        "revenue.cloakroom.cash",
        "revenue.cloakroom.total",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    for (name, _) in VenueCosts::default().line_items() {
        header.push(format!("venueCosts.{name}"));
    }
    header.push("venueCosts.total".into());
    for item in CONSUMPTION_CATALOG {
        for part in ["unitPrice", "quantity", "lineTotal"] {
            header.push(format!("consumptionItems.{item}.{part}"));
        }
    }
    header.extend(["extraCosts.vat", "extraCosts.rent", "notes"].map(String::from));
    header
}

fn csv_row(record: &ClosureRecord, money: &MoneyFormat) -> Vec<String> {
    let amount = |value: Amount| money.plain(value);
    let revenue = &record.revenue;
    let mut row = vec![
        record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        amount(record.total_revenue),
        amount(record.total_costs),
        amount(record.total_owed_to_partner),
        amount(record.total_consumption),
        amount(revenue.entry.reserved_cash),
        amount(revenue.entry.walk_in_cash),
        amount(revenue.entry.cash_total),
        amount(revenue.entry.card_total),
        amount(revenue.entry.total),
        amount(revenue.bar.cash),
        amount(revenue.bar.card),
        amount(revenue.bar.total),
        amount(revenue.cloakroom.cash),
        amount(revenue.cloakroom.total),
    ];
    for (_, value) in record.venue_costs.line_items() {
        row.push(amount(value));
    }
    row.push(amount(record.venue_costs.total));
    for item in CONSUMPTION_CATALOG {
        match record.consumption_line(item) {
            Some(line) => {
                row.push(amount(line.unit_price));
                row.push(line.quantity.to_string());
                row.push(amount(line.line_total));
            }
            None => row.extend([amount(Amount::ZERO), "0".into(), amount(Amount::ZERO)]),
        }
    }
    for line in &record.consumption_items {
        if !CONSUMPTION_CATALOG.contains(&line.name.as_str()) {
            tracing::warn!(
                timestamp = %record.timestamp,
                item = %line.name,
                "consumption line outside the catalog has no table column; use the raw export"
            );
        }
    }
    row.push(amount(record.extra_costs.vat));
    row.push(amount(record.extra_costs.rent));
    row.push(record.notes.clone());
    row
}

/// Writes a header row and one row per record, in stored order.
pub fn write_csv<W: Write>(writer: W, records: &[ClosureRecord], options: &CsvOptions) -> Result<()> {
    let money = MoneyFormat {
        symbol: String::new(),
        decimal_separator: options.decimal_separator,
        grouping_separator: None,
    };
    let mut wtr = WriterBuilder::new()
        .delimiter(options.delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(csv_header())?;
    for record in records {
        wtr.write_record(csv_row(record, &money))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv(records: &[ClosureRecord], options: &CsvOptions) -> Result<String> {
    let mut out = Vec::new();
    write_csv(&mut out, records, options)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// The ledger exactly as persisted.
pub fn raw_json(store: &dyn LedgerStore) -> Result<Vec<u8>> {
    store.raw_bytes()
}

/// Writes export bytes to `path`, creating parent directories.
pub fn write_export(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, data)?;
    tracing::info!(path = %path.display(), bytes = data.len(), "export written");
    Ok(())
}
