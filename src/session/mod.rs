pub mod driver;
pub mod readiness;

pub use driver::{CdpDriver, SessionDriver};
pub use readiness::{ConsolePrompt, DirectNavigation, ManualLogin, OperatorPrompt, SessionReadiness};
