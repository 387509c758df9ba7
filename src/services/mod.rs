pub mod field_mapper;
pub mod ledger;
pub mod pacer;

pub use field_mapper::{FieldAction, FieldMapper, FillPlan, FillStep};
pub use ledger::{ProcessedRow, RowStatus, RunLedger};
pub use pacer::Pacer;
