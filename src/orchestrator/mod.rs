pub mod app;
pub mod batch_runner;

pub use app::App;
pub use batch_runner::{batch_pause_due, run_batch, select_range, RunOptions};
