//! Domain services

pub mod cancellation;
pub mod checkpoint_resolver;
pub mod formula_validator;
pub mod ledger_lifecycle;
pub mod reconciliation;

pub use cancellation::{
    cancel_entry, create_driver_account_entry, display_rows, format_for_display, post_entry,
    CancellationRequest, DisplayClass, DriverAccountRequest, EntryDisplay,
    DEFAULT_CANCELLATION_REASON,
};
pub use checkpoint_resolver::{
    normalize_station, CheckpointCatalog, LedgerColumn, Resolution, ResolutionSource,
    CASH_STATION,
};
pub use formula_validator::{unknown_identifiers, validate_formula, FormulaValidation, FORMULA_VARIABLES};
pub use ledger_lifecycle::LedgerLifecycle;
pub use reconciliation::{report_for, statement_for, CancellationReport, CancelledLine};
