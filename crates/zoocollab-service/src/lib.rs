//! ZooCollab Service: the permission-guarded workflows.
//!
//! Every operation resolves the project (and observation, where one is
//! involved) through the repositories, asks the permission engine for a
//! [`Decision`](zoocollab_core::permission::Decision) and only then
//! touches storage. A denial aborts the whole operation.

pub mod guard;
pub mod observation;
pub mod profile;
pub mod project;

pub use observation::{ObservationService, ObservationWithPermissions};
pub use profile::{ProfileActivity, ProfileService, ProfileStats};
pub use project::ProjectService;
