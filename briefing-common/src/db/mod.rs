//! Database schema and briefing persistence

pub mod briefings;
pub mod init;
pub mod migrations;

pub use briefings::*;
pub use init::*;
pub use migrations::run_migrations;
