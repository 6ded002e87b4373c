//! # offsec-core
//!
//! Core types, ID prefixes, and error types for the offensive security
//! program tracker.
//!
//! This crate provides the foundational types shared across all offsec crates:
//! - Entity structs for all domain objects (engagements, findings, intake, etc.)
//! - Closed enumerations for severities, statuses and types, with their wire strings
//! - The intake status state machine
//! - ID prefix constants
//! - Cross-cutting error types
//! - Pure validation rules (due dates, required text)
//! - The nested engagement report shape

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod validation;
