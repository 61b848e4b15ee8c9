//! # Briefing Common Library
//!
//! Shared code for the briefing generator service:
//! - Briefing record model and schema validation
//! - Prompt construction and the completion client seam
//! - Briefing extraction from untrusted completion text
//! - Normalization of stored content payloads
//! - Configuration loading and root folder resolution
//! - Database schema, migrations and briefing persistence

pub mod briefing;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod prompt;
pub mod render;
pub mod time;
pub mod uuid_utils;

pub use briefing::BriefingRecord;
pub use error::{Error, Result};
pub use extract::{ExtractionError, Extractor};
pub use normalize::{normalize, NormalizedContent};
