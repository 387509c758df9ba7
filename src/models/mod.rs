pub mod lead;
pub mod loaders;
pub mod states;

pub use lead::LeadRecord;
pub use loaders::load_leads;
pub use states::{state_code, STATE_CODES};
