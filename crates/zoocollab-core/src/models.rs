//! Domain models for ZooCollab.
//!
//! These are the core types shared across all crates.

pub mod actor;
pub mod membership;
pub mod observation;
pub mod project;
pub mod user;
