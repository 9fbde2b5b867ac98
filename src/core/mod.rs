pub mod calculator;
pub mod confirm;
pub mod history;

pub use calculator::{Calculation, ClosureCalculator, Summary, ValidationWarning};
pub use confirm::{ClearAuthorization, ClearConfirmation, ConfirmState};
