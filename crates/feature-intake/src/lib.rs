//! Feature request intake: collect a proposal section by section, derive its RICE priority and
//! append it to a spreadsheet.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use workflows::proposal;
