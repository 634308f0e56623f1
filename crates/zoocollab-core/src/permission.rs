//! Permission evaluation engine.
//!
//! A pure decision function over an actor, a project, an action and an
//! optional observation. Nothing here performs I/O or caches results;
//! callers re-derive a [`Decision`] on every request.

mod action;
mod decision;
mod engine;
mod summary;

pub use action::Action;
pub use decision::{Decision, DenialReason, EffectiveRole};
pub use engine::{capabilities, evaluate};
pub use summary::{PermissionSummary, summarize, summarize_batch};
