//! Registry of research projects, collaborations, academic centres and researchers.
//!
//! Records live behind the [`Collection`] abstraction; [`RegistryService`] owns every mutation
//! and the cross-collection rules, while dashboards and reports are pure functions over a
//! [`Dataset`] snapshot.

pub mod auth;
pub mod changes;
pub mod dashboard;
pub mod dates;
pub mod domain;
pub mod filters;
pub(crate) mod migration;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod status;

#[cfg(test)]
mod tests;

pub use changes::{
    CentreDraft, CentrePatch, CollaborationDraft, CollaborationPatch, ResearchDraft,
    ResearchPatch, ResearcherDraft, ResearcherPatch, ValidationError,
};
pub use dashboard::{Dashboard, DashboardSnapshot};
pub use domain::{
    AcademicCentre, CentreId, Collaboration, CollaborationId, CollaborationStatus,
    CollaborationType, Involvement, Research, ResearchId, ResearchRole, ResearchStatus,
    Researcher, ResearcherId, Role, UserId, UserProfile,
};
pub use filters::{ResearchFilter, ResearcherFilter};
pub use repository::{Collection, InMemoryCollection, Record, RegistryStore, RepositoryError};
pub use router::{registry_router, ApiState};
pub use service::{CentreUsage, RegistryError, RegistryService, YearOptions};
pub use session::{ClientSession, SessionEvent};
pub use snapshot::{Dataset, SnapshotError};
pub use status::{derive_status, CollaborationView};
