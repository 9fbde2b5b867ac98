use std::collections::BTreeMap;
use std::fmt;

use super::closure::CONSUMPTION_CATALOG;

/// Every numeric field of the closing form, except per-item consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputField {
    ReservedCash,
    WalkInCash,
    EntryCard,
    BarCash,
    BarCard,
    CloakroomCash,
    Bartender,
    BarBack,
    Cashier,
    CashierExtra,
    SecurityLead,
    RoyaltyFee,
    AvTechnician,
    Cleaning,
    Vat,
    Rent,
}

impl InputField {
    pub const ALL: [InputField; 16] = [
        InputField::ReservedCash,
        InputField::WalkInCash,
        InputField::EntryCard,
        InputField::BarCash,
        InputField::BarCard,
        InputField::CloakroomCash,
        InputField::Bartender,
        InputField::BarBack,
        InputField::Cashier,
        InputField::CashierExtra,
        InputField::SecurityLead,
        InputField::RoyaltyFee,
        InputField::AvTechnician,
        InputField::Cleaning,
        InputField::Vat,
        InputField::Rent,
    ];

    pub fn key(self) -> &'static str {
        match self {
            InputField::ReservedCash => "reservedCash",
            InputField::WalkInCash => "walkInCash",
            InputField::EntryCard => "entryCard",
            InputField::BarCash => "barCash",
            InputField::BarCard => "barCard",
            InputField::CloakroomCash => "cloakroomCash",
            InputField::Bartender => "bartender",
            InputField::BarBack => "barBack",
            InputField::Cashier => "cashier",
            InputField::CashierExtra => "cashierExtra",
            InputField::SecurityLead => "securityLead",
            InputField::RoyaltyFee => "royaltyFee",
            InputField::AvTechnician => "avTechnician",
            InputField::Cleaning => "cleaning",
            InputField::Vat => "vat",
            InputField::Rent => "rent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputField::ReservedCash => "Entry cash (reserved)",
            InputField::WalkInCash => "Entry cash (walk-in)",
            InputField::EntryCard => "Entry card total",
            InputField::BarCash => "Bar cash",
            InputField::BarCard => "Bar card",
            InputField::CloakroomCash => "Cloakroom cash",
            InputField::Bartender => "Bartender",
            InputField::BarBack => "Bar back",
            InputField::Cashier => "Cashier",
            InputField::CashierExtra => "Cashier (extra)",
            InputField::SecurityLead => "Security lead",
            InputField::RoyaltyFee => "Royalty fee",
            InputField::AvTechnician => "Sound & light technician",
            InputField::Cleaning => "Cleaning",
            InputField::Vat => "VAT",
            InputField::Rent => "Rent",
        }
    }

    /// Case-insensitive lookup by serialized key.
    pub fn from_key(key: &str) -> Option<InputField> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Entered price and quantity for a consumption item, still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConsumption {
    pub unit_price: Option<String>,
    pub quantity: Option<String>,
}

/// Raw operator input exactly as typed, before parsing or validation.
///
/// [`RawInputs::zeroed`] mirrors a fresh closing form where every field starts
/// at zero; [`RawInputs::default`] is empty and fails validation until filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    fields: BTreeMap<InputField, String>,
    consumption: BTreeMap<String, RawConsumption>,
    pub notes: String,
}

impl RawInputs {
    pub fn zeroed() -> Self {
        let mut inputs = Self::default();
        for field in InputField::ALL {
            inputs.set(field, "0");
        }
        for item in CONSUMPTION_CATALOG {
            inputs.consumption.insert(
                item.to_string(),
                RawConsumption {
                    unit_price: Some("0".into()),
                    quantity: Some("0".into()),
                },
            );
        }
        inputs
    }

    pub fn set(&mut self, field: InputField, value: impl Into<String>) -> &mut Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn get(&self, field: InputField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set_consumption(
        &mut self,
        item: &str,
        unit_price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> &mut Self {
        self.consumption.insert(
            item.to_string(),
            RawConsumption {
                unit_price: Some(unit_price.into()),
                quantity: Some(quantity.into()),
            },
        );
        self
    }

    pub fn consumption(&self, item: &str) -> Option<&RawConsumption> {
        self.consumption.get(item)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> &mut Self {
        self.notes = notes.into();
        self
    }
}

/// Resolves a user-typed item name to its catalog spelling.
pub fn catalog_item(name: &str) -> Option<&'static str> {
    CONSUMPTION_CATALOG
        .iter()
        .copied()
        .find(|item| item.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_case_insensitively() {
        for field in InputField::ALL {
            assert_eq!(InputField::from_key(field.key()), Some(field));
            assert_eq!(
                InputField::from_key(&field.key().to_uppercase()),
                Some(field)
            );
        }
        assert_eq!(InputField::from_key("tips"), None);
    }

    #[test]
    fn zeroed_form_covers_catalog() {
        let inputs = RawInputs::zeroed();
        assert_eq!(inputs.get(InputField::Rent), Some("0"));
        for item in CONSUMPTION_CATALOG {
            assert!(inputs.consumption(item).is_some());
        }
    }

    #[test]
    fn catalog_lookup_ignores_case() {
        assert_eq!(catalog_item("soft DRINK"), Some("Soft drink"));
        assert_eq!(catalog_item("Wine"), None);
    }
}
