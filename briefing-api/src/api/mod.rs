//! HTTP API handlers for briefing-api

pub mod briefings;
pub mod generate;
pub mod health;

pub use briefings::{delete_briefing, export_briefing, get_briefing, list_briefings, save_briefing};
pub use generate::generate_briefing;
pub use health::health_routes;
