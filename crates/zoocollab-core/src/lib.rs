//! ZooCollab Core: domain models, repository contracts, and the
//! permission engine shared by every other crate.

pub mod error;
pub mod models;
pub mod permission;
pub mod repository;

pub use error::{ZooError, ZooResult};
