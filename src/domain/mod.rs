pub mod closure;
pub mod inputs;
pub mod money;

pub use closure::{
    BarTakings, CloakroomTakings, ClosureRecord, ClosureTotals, ConsumptionLine, EntryTakings,
    ExtraCosts, Revenue, VenueCosts, CONSUMPTION_CATALOG,
};
pub use inputs::{catalog_item, InputField, RawConsumption, RawInputs};
pub use money::{Amount, MoneyFormat};
