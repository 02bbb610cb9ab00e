//! Core business logic for Sofra's reporting engine.
//!
//! This crate contains pure reporting logic with ZERO web or database
//! dependencies. The storage layer is reached through the narrow
//! [`report::StorageDelegate`] seam.
//!
//! # Modules
//!
//! - `report` - Configuration validation, condition building, query
//!   execution, aggregation, and grouping
//! - `export` - Excel/CSV/HTML serialization with injection defenses

pub mod export;
pub mod report;
