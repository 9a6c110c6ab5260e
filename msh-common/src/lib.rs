//! # Music Study Hub Common Library
//!
//! Shared code for the Music Study Hub services including:
//! - Error and result types
//! - Bootstrap configuration loading (TOML, environment, CLI overrides)
//! - Compliance event types and the broadcast bus that carries them
//! - Server-Sent Events helpers
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod sse;
pub mod time;

pub use error::{Error, Result};
pub use events::{ComplianceBus, ComplianceEvent, RiskLevel, SubjectKind};
