pub mod lead_ctx;
pub mod submit_flow;

pub use lead_ctx::LeadCtx;
pub use submit_flow::{SubmissionOutcome, SubmitFlow};
