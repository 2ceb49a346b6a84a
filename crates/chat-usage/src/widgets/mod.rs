//! TUI widget modules

pub mod header;
pub mod shortcuts;
pub mod usage_chart;

pub use header::*;
pub use shortcuts::*;
pub use usage_chart::*;
