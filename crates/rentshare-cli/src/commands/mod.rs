//! Command handlers. Each maps one subcommand onto one core operation.

mod init;
mod maintenance;
mod recalculate;
mod registry;
mod rent;
mod report;
mod share;

pub use init::handle_init;
pub use maintenance::handle_check;
pub use recalculate::handle_recalculate;
pub use registry::{handle_owner, handle_property};
pub use rent::handle_rent;
pub use report::handle_report;
pub use share::handle_share;
