use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::money::{checked_total, overflow, Amount};
use crate::errors::Result;

/// Bar products counted at closing, in display order.
pub const CONSUMPTION_CATALOG: [&str; 5] = ["Drink", "Beer", "Soft drink", "Water", "Snacks"];

/// Door takings: reserved and walk-in guests paying cash, plus card payments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryTakings {
    pub reserved_cash: Amount,
    pub walk_in_cash: Amount,
    pub cash_total: Amount,
    pub card_total: Amount,
    pub total: Amount,
}

impl EntryTakings {
    pub fn recompute(&mut self) -> Result<()> {
        self.cash_total =
            checked_total("revenue.entry.cashTotal", [self.reserved_cash, self.walk_in_cash])?;
        self.total = checked_total("revenue.entry.total", [self.cash_total, self.card_total])?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarTakings {
    pub cash: Amount,
    pub card: Amount,
    pub total: Amount,
}

impl BarTakings {
    pub fn recompute(&mut self) -> Result<()> {
        self.total = checked_total("revenue.bar.total", [self.cash, self.card])?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloakroomTakings {
    pub cash: Amount,
    pub total: Amount,
}

impl CloakroomTakings {
    pub fn recompute(&mut self) -> Result<()> {
        self.total = self.cash;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Revenue {
    pub entry: EntryTakings,
    pub bar: BarTakings,
    pub cloakroom: CloakroomTakings,
}

impl Revenue {
    pub fn recompute(&mut self) -> Result<()> {
        self.entry.recompute()?;
        self.bar.recompute()?;
        self.cloakroom.recompute()
    }

    pub fn total(&self) -> Result<Amount> {
        checked_total(
            "totalRevenue",
            [self.entry.total, self.bar.total, self.cloakroom.total],
        )
    }
}

/// Staffing and fixed costs borne by the venue for the night.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VenueCosts {
    pub bartender: Amount,
    pub bar_back: Amount,
    pub cashier: Amount,
    pub cashier_extra: Amount,
    pub security_lead: Amount,
    pub royalty_fee: Amount,
    pub av_technician: Amount,
    pub cleaning: Amount,
    pub total: Amount,
}

impl VenueCosts {
    /// Line items in their fixed order, paired with their serialized names.
    pub fn line_items(&self) -> [(&'static str, Amount); 8] {
        [
            ("bartender", self.bartender),
            ("barBack", self.bar_back),
            ("cashier", self.cashier),
            ("cashierExtra", self.cashier_extra),
            ("securityLead", self.security_lead),
            ("royaltyFee", self.royalty_fee),
            ("avTechnician", self.av_technician),
            ("cleaning", self.cleaning),
        ]
    }

    pub fn recompute(&mut self) -> Result<()> {
        self.total = checked_total(
            "venueCosts.total",
            self.line_items().iter().map(|(_, amount)| *amount),
        )?;
        Ok(())
    }
}

/// One counted bar product: `line_total = unit_price * quantity`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsumptionLine {
    pub name: String,
    pub unit_price: Amount,
    pub quantity: u32,
    pub line_total: Amount,
}

impl ConsumptionLine {
    pub fn new(name: impl Into<String>, unit_price: Amount, quantity: u32) -> Result<Self> {
        let mut line = Self {
            name: name.into(),
            unit_price,
            quantity,
            line_total: Amount::ZERO,
        };
        line.recompute()?;
        Ok(line)
    }

    pub fn recompute(&mut self) -> Result<()> {
        self.line_total = self
            .unit_price
            .checked_mul(Amount::from(self.quantity))
            .ok_or_else(|| overflow(&format!("{}.lineTotal", self.name)))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtraCosts {
    pub vat: Amount,
    pub rent: Amount,
}

/// Headline and derived totals of a closure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClosureTotals {
    pub total_revenue: Amount,
    pub total_costs: Amount,
    pub total_owed_to_partner: Amount,
    pub total_consumption: Amount,
}

/// One saved end-of-night closure.
///
/// Derived fields (group totals and the `total*` fields) are always produced by
/// [`ClosureRecord::recompute_totals`]; they are persisted for readability but
/// never trusted on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub total_revenue: Amount,
    #[serde(default)]
    pub total_costs: Amount,
    #[serde(default)]
    pub total_owed_to_partner: Amount,
    #[serde(default)]
    pub total_consumption: Amount,
    #[serde(default)]
    pub revenue: Revenue,
    #[serde(default)]
    pub venue_costs: VenueCosts,
    #[serde(default)]
    pub consumption_items: Vec<ConsumptionLine>,
    #[serde(default)]
    pub extra_costs: ExtraCosts,
    #[serde(default)]
    pub notes: String,
}

impl ClosureRecord {
    /// Re-derives every computed field from the entered ones and reports
    /// whether any stored value differed. Fails if a total overflows.
    pub fn recompute_totals(&mut self) -> Result<bool> {
        let before = self.clone();

        self.revenue.recompute()?;
        self.venue_costs.recompute()?;
        for line in &mut self.consumption_items {
            line.recompute()?;
        }
        let totals = derive_totals(
            &self.revenue,
            &self.venue_costs,
            &self.consumption_items,
            &self.extra_costs,
        )?;
        self.total_revenue = totals.total_revenue;
        self.total_costs = totals.total_costs;
        self.total_owed_to_partner = totals.total_owed_to_partner;
        self.total_consumption = totals.total_consumption;

        Ok(before != *self)
    }

    pub fn totals(&self) -> ClosureTotals {
        ClosureTotals {
            total_revenue: self.total_revenue,
            total_costs: self.total_costs,
            total_owed_to_partner: self.total_owed_to_partner,
            total_consumption: self.total_consumption,
        }
    }

    pub fn consumption_line(&self, name: &str) -> Option<&ConsumptionLine> {
        self.consumption_items.iter().find(|line| line.name == name)
    }
}

/// Aggregates already-recomputed groups into the closure totals.
pub(crate) fn derive_totals(
    revenue: &Revenue,
    venue_costs: &VenueCosts,
    consumption: &[ConsumptionLine],
    extra: &ExtraCosts,
) -> Result<ClosureTotals> {
    let total_consumption = checked_total(
        "totalConsumption",
        consumption.iter().map(|line| line.line_total),
    )?;
    let partner_share = checked_total(
        "totalOwedToPartner",
        [total_consumption, extra.vat, extra.rent],
    )?;
    Ok(ClosureTotals {
        total_revenue: revenue.total()?,
        total_costs: checked_total("totalCosts", [venue_costs.total, partner_share])?,
        total_owed_to_partner: partner_share,
        total_consumption,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn record_without_optional_groups_loads_as_zero() {
        let json = r#"{ "timestamp": "2025-03-01T23:30:00Z" }"#;
        let mut record: ClosureRecord = serde_json::from_str(json).unwrap();
        assert!(!record.recompute_totals().unwrap());
        assert_eq!(record.total_revenue, Decimal::ZERO);
        assert!(record.consumption_items.is_empty());
        assert!(record.notes.is_empty());
    }

    #[test]
    fn amounts_accept_numbers_and_strings() {
        let json = r#"{
            "timestamp": "2025-03-01T23:30:00Z",
            "revenue": { "bar": { "cash": 12.5, "card": "7.50" } }
        }"#;
        let mut record: ClosureRecord = serde_json::from_str(json).unwrap();
        record.recompute_totals().unwrap();
        assert_eq!(record.revenue.bar.total, Decimal::new(2000, 2));
        assert_eq!(record.total_revenue, Decimal::new(2000, 2));
    }

    #[test]
    fn recompute_detects_tampered_totals() {
        let json = r#"{
            "timestamp": "2025-03-01T23:30:00Z",
            "totalRevenue": "999",
            "revenue": { "cloakroom": { "cash": "5" } }
        }"#;
        let mut record: ClosureRecord = serde_json::from_str(json).unwrap();
        assert!(record.recompute_totals().unwrap());
        assert_eq!(record.total_revenue, Decimal::from(5));
    }

    #[test]
    fn overflowing_totals_are_an_error_not_a_panic() {
        let json = r#"{
            "timestamp": "2025-01-01T00:00:00Z",
            "revenue": { "bar": {
                "cash": "79228162514264337593543950335",
                "card": "79228162514264337593543950335"
            } }
        }"#;
        let mut record: ClosureRecord = serde_json::from_str(json).unwrap();
        let err = record.recompute_totals().unwrap_err();
        assert!(
            matches!(err, crate::errors::CloseError::Validation { ref field, .. } if field == "revenue.bar.total")
        );

        let mut line = ConsumptionLine {
            name: "Drink".into(),
            unit_price: Decimal::MAX,
            quantity: 2,
            line_total: Decimal::ZERO,
        };
        assert!(line.recompute().is_err());
    }
}
