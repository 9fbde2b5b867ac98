use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;

use crate::domain::closure::derive_totals;
use crate::domain::money::{parse_decimal, round_money, MAX_AMOUNT, MONEY_SCALE};
use crate::domain::{
    Amount, BarTakings, CloakroomTakings, ClosureRecord, ClosureTotals, ConsumptionLine,
    EntryTakings, ExtraCosts, InputField, RawInputs, Revenue, VenueCosts, CONSUMPTION_CATALOG,
};
use crate::errors::{CloseError, Result};

/// A negative entry that was counted as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub original: Amount,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` was negative ({}); counted as 0",
            self.field, self.original
        )
    }
}

/// The three headline numbers shown while the form is being filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_revenue: Amount,
    pub total_costs: Amount,
    pub total_owed_to_partner: Amount,
}

impl From<ClosureTotals> for Summary {
    fn from(totals: ClosureTotals) -> Self {
        Self {
            total_revenue: totals.total_revenue,
            total_costs: totals.total_costs,
            total_owed_to_partner: totals.total_owed_to_partner,
        }
    }
}

/// Fully derived closure that has not been stamped or saved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    revenue: Revenue,
    venue_costs: VenueCosts,
    consumption_items: Vec<ConsumptionLine>,
    extra_costs: ExtraCosts,
    notes: String,
    totals: ClosureTotals,
    warnings: Vec<ValidationWarning>,
}

impl Calculation {
    pub fn totals(&self) -> ClosureTotals {
        self.totals
    }

    pub fn summary(&self) -> Summary {
        Summary::from(self.totals)
    }

    pub fn revenue(&self) -> &Revenue {
        &self.revenue
    }

    pub fn venue_costs(&self) -> &VenueCosts {
        &self.venue_costs
    }

    pub fn consumption_items(&self) -> &[ConsumptionLine] {
        &self.consumption_items
    }

    pub fn extra_costs(&self) -> &ExtraCosts {
        &self.extra_costs
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Produces the immutable record, stamped by the caller at save time.
    pub fn finalize(self, timestamp: DateTime<Utc>) -> ClosureRecord {
        ClosureRecord {
            timestamp,
            total_revenue: self.totals.total_revenue,
            total_costs: self.totals.total_costs,
            total_owed_to_partner: self.totals.total_owed_to_partner,
            total_consumption: self.totals.total_consumption,
            revenue: self.revenue,
            venue_costs: self.venue_costs,
            consumption_items: self.consumption_items,
            extra_costs: self.extra_costs,
            notes: self.notes,
        }
    }
}

/// Pure closure arithmetic. Never touches the ledger.
pub struct ClosureCalculator;

impl ClosureCalculator {
    pub fn compute(raw: &RawInputs) -> Result<Calculation> {
        let mut reader = FieldReader {
            raw,
            warnings: Vec::new(),
        };

        let mut revenue = Revenue {
            entry: EntryTakings {
                reserved_cash: reader.amount(InputField::ReservedCash)?,
                walk_in_cash: reader.amount(InputField::WalkInCash)?,
                card_total: reader.amount(InputField::EntryCard)?,
                ..EntryTakings::default()
            },
            bar: BarTakings {
                cash: reader.amount(InputField::BarCash)?,
                card: reader.amount(InputField::BarCard)?,
                ..BarTakings::default()
            },
            cloakroom: CloakroomTakings {
                cash: reader.amount(InputField::CloakroomCash)?,
                ..CloakroomTakings::default()
            },
        };
        revenue.recompute()?;

        let mut venue_costs = VenueCosts {
            bartender: reader.amount(InputField::Bartender)?,
            bar_back: reader.amount(InputField::BarBack)?,
            cashier: reader.amount(InputField::Cashier)?,
            cashier_extra: reader.amount(InputField::CashierExtra)?,
            security_lead: reader.amount(InputField::SecurityLead)?,
            royalty_fee: reader.amount(InputField::RoyaltyFee)?,
            av_technician: reader.amount(InputField::AvTechnician)?,
            cleaning: reader.amount(InputField::Cleaning)?,
            total: Amount::ZERO,
        };
        venue_costs.recompute()?;

        let mut consumption_items = Vec::with_capacity(CONSUMPTION_CATALOG.len());
        for item in CONSUMPTION_CATALOG {
            let (unit_price, quantity) = reader.consumption(item)?;
            consumption_items.push(ConsumptionLine::new(item, unit_price, quantity)?);
        }

        let extra_costs = ExtraCosts {
            vat: reader.amount(InputField::Vat)?,
            rent: reader.amount(InputField::Rent)?,
        };

        let totals = derive_totals(&revenue, &venue_costs, &consumption_items, &extra_costs)?;
        tracing::debug!(
            total_revenue = %totals.total_revenue,
            total_costs = %totals.total_costs,
            total_owed_to_partner = %totals.total_owed_to_partner,
            "closure computed"
        );

        Ok(Calculation {
            revenue,
            venue_costs,
            consumption_items,
            extra_costs,
            notes: raw.notes.trim().to_string(),
            totals,
            warnings: reader.warnings,
        })
    }
}

struct FieldReader<'a> {
    raw: &'a RawInputs,
    warnings: Vec<ValidationWarning>,
}

impl FieldReader<'_> {
    fn amount(&mut self, field: InputField) -> Result<Amount> {
        self.parse_amount(field.key(), self.raw.get(field))
    }

    fn consumption(&mut self, item: &str) -> Result<(Amount, u32)> {
        let entry = self.raw.consumption(item);
        let price_field = format!("{item}.unitPrice");
        let quantity_field = format!("{item}.quantity");
        let unit_price = self.parse_amount(
            &price_field,
            entry.and_then(|entry| entry.unit_price.as_deref()),
        )?;
        let quantity = self.parse_quantity(
            &quantity_field,
            entry.and_then(|entry| entry.quantity.as_deref()),
        )?;
        Ok((unit_price, quantity))
    }

    fn parse_amount(&mut self, field: &str, raw: Option<&str>) -> Result<Amount> {
        let value = self.parse_number(field, raw)?;
        if value.normalize().scale() > MONEY_SCALE {
            return Err(CloseError::validation(
                field,
                "use at most two decimal places (grouping separators are not accepted)",
            ));
        }
        let value = self.clamp(field, value);
        if value > MAX_AMOUNT {
            return Err(CloseError::validation(
                field,
                format!("amount exceeds the limit of {MAX_AMOUNT}"),
            ));
        }
        Ok(round_money(value))
    }

    fn parse_quantity(&mut self, field: &str, raw: Option<&str>) -> Result<u32> {
        let value = self.parse_number(field, raw)?;
        let value = self.clamp(field, value);
        if !value.fract().is_zero() {
            return Err(CloseError::validation(field, "quantity must be a whole number"));
        }
        value
            .to_u32()
            .ok_or_else(|| CloseError::validation(field, "quantity is too large"))
    }

    fn parse_number(&self, field: &str, raw: Option<&str>) -> Result<Amount> {
        let text = raw.ok_or_else(|| CloseError::validation(field, "value is missing"))?;
        if text.trim().is_empty() {
            return Err(CloseError::validation(field, "value is missing"));
        }
        parse_decimal(text)
            .ok_or_else(|| CloseError::validation(field, format!("`{}` is not a number", text.trim())))
    }

    fn clamp(&mut self, field: &str, value: Amount) -> Amount {
        if value.is_zero() {
            // Also drops the sign of `-0`.
            Amount::ZERO
        } else if value.is_sign_negative() {
            tracing::warn!(field, %value, "negative input clamped to zero");
            self.warnings.push(ValidationWarning {
                field: field.to_string(),
                original: value,
            });
            Amount::ZERO
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn reference_inputs() -> RawInputs {
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

    #[test]
    fn reference_closure_matches_hand_computed_totals() {
        let calc = ClosureCalculator::compute(&reference_inputs()).unwrap();

        assert_eq!(calc.revenue().entry.total, dec("100"));
        assert_eq!(calc.revenue().bar.total, dec("50"));
        assert_eq!(calc.revenue().cloakroom.total, dec("5"));
        assert_eq!(calc.venue_costs().total, dec("200"));

        let totals = calc.totals();
        assert_eq!(totals.total_revenue, dec("155"));
        assert_eq!(totals.total_consumption, dec("50"));
        assert_eq!(totals.total_costs, dec("358"));
        assert_eq!(totals.total_owed_to_partner, dec("158"));
        assert!(calc.warnings().is_empty());
    }

    #[test]
    fn all_zero_form_is_valid() {
        let calc = ClosureCalculator::compute(&RawInputs::zeroed()).unwrap();
        assert_eq!(calc.summary(), Summary::default());
        assert_eq!(calc.consumption_items().len(), CONSUMPTION_CATALOG.len());
    }

    #[test]
    fn negative_values_are_clamped_with_warning() {
        let mut raw = RawInputs::zeroed();
        raw.set(InputField::BarCash, "-12.5")
            .set(InputField::BarCard, "10")
            .set_consumption("Beer", "3", "-4");

        let calc = ClosureCalculator::compute(&raw).unwrap();
        assert_eq!(calc.revenue().bar.cash, Decimal::ZERO);
        assert_eq!(calc.totals().total_revenue, dec("10"));
        let fields: Vec<&str> = calc.warnings().iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["barCash", "Beer.quantity"]);
        assert_eq!(calc.warnings()[0].original, dec("-12.5"));
    }

    #[test]
    fn missing_field_is_a_validation_error() {
        let mut raw = RawInputs::zeroed();
        raw.set(InputField::Rent, "   ");
        let err = ClosureCalculator::compute(&raw).unwrap_err();
        assert!(matches!(err, CloseError::Validation { ref field, .. } if field == "rent"));

        let err = ClosureCalculator::compute(&RawInputs::default()).unwrap_err();
        assert!(matches!(err, CloseError::Validation { ref field, .. } if field == "reservedCash"));
    }

    #[test]
    fn non_numeric_and_fractional_quantities_are_rejected() {
        let mut raw = RawInputs::zeroed();
        raw.set(InputField::Vat, "eight");
        assert!(ClosureCalculator::compute(&raw).is_err());

        let mut raw = RawInputs::zeroed();
        raw.set_consumption("Water", "1.50", "2.5");
        let err = ClosureCalculator::compute(&raw).unwrap_err();
        assert!(
            matches!(err, CloseError::Validation { ref field, .. } if field == "Water.quantity")
        );
    }

    #[test]
    fn repeated_cent_additions_do_not_drift() {
        let mut raw = RawInputs::zeroed();
        raw.set_consumption("Snacks", "0.10", "3")
            .set_consumption("Water", "0.20", "1");
        let calc = ClosureCalculator::compute(&raw).unwrap();
        assert_eq!(calc.totals().total_consumption, dec("0.50"));
    }

    #[test]
    fn finalize_stamps_caller_timestamp_and_keeps_notes() {
        let mut raw = reference_inputs();
        raw.set_notes("  DJ set ran late  ");
        let stamp = "2025-05-10T02:15:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut record = ClosureCalculator::compute(&raw).unwrap().finalize(stamp);

        assert_eq!(record.timestamp, stamp);
        assert_eq!(record.notes, "DJ set ran late");
        assert_eq!(record.consumption_line("Drink").unwrap().line_total, dec("50"));
        assert!(!record.recompute_totals().unwrap());
    }

    #[test]
    fn oversized_amounts_are_validation_errors() {
        let mut raw = RawInputs::zeroed();
        raw.set(InputField::BarCash, "79228162514264337593543950335")
            .set(InputField::BarCard, "1");
        let err = ClosureCalculator::compute(&raw).unwrap_err();
        assert!(matches!(err, CloseError::Validation { ref field, .. } if field == "barCash"));

        let mut raw = RawInputs::zeroed();
        raw.set_consumption("Drink", "10000000000000000000000000", "100000");
        let err = ClosureCalculator::compute(&raw).unwrap_err();
        assert!(
            matches!(err, CloseError::Validation { ref field, .. } if field == "Drink.unitPrice")
        );

        let mut raw = RawInputs::zeroed();
        raw.set_consumption("Drink", "1000000000", &u32::MAX.to_string())
            .set(InputField::Rent, "1000000000")
            .set(InputField::BarCash, "1000000000");
        let calc = ClosureCalculator::compute(&raw).unwrap();
        assert_eq!(
            calc.totals().total_consumption,
            Decimal::from(1_000_000_000u64) * Decimal::from(u32::MAX)
        );
    }

    #[test]
    fn more_than_two_decimal_places_is_rejected() {
        let mut raw = RawInputs::zeroed();
        raw.set(InputField::Vat, "1,234");
        let err = ClosureCalculator::compute(&raw).unwrap_err();
        assert!(matches!(err, CloseError::Validation { ref field, .. } if field == "vat"));

        let mut raw = RawInputs::zeroed();
        raw.set(InputField::Vat, "1.500");
        let calc = ClosureCalculator::compute(&raw).unwrap();
        assert_eq!(calc.extra_costs().vat, dec("1.5"));
    }

    #[test]
    fn negative_zero_is_stored_as_plain_zero() {
        let mut raw = RawInputs::zeroed();
        raw.set(InputField::Cleaning, "-0")
            .set(InputField::Rent, "-0,00");
        let calc = ClosureCalculator::compute(&raw).unwrap();
        assert!(calc.warnings().is_empty());
        assert!(!calc.venue_costs().cleaning.is_sign_negative());
        assert!(!calc.extra_costs().rent.is_sign_negative());

        let record = calc.finalize(Utc::now());
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"-0"), "{json}");
    }
}
