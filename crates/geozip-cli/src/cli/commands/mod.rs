//! CLI command handlers, one file per command.

mod list;
mod run;

pub use list::run_list;
pub use run::run_fetch;
