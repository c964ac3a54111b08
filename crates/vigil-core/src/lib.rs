//! # vigil-core
//!
//! Core types, ID prefixes, and error types for vigil.
//!
//! This crate provides the foundational types shared across all vigil crates:
//! - Entity structs for users, projects, scan jobs, and findings
//! - Status enums with state machine transitions
//! - The closed job-type set and its total normalizer
//! - ID prefix constants
//! - Cross-cutting error types
//! - The session identity handed over by the upstream auth layer

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
