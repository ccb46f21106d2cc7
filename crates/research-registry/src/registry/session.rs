//! Client-side application state advanced by a pure reducer.
//!
//! Mutations are applied optimistically once the caller has issued the request; a later
//! failure only raises a notification, the local copy is not rolled back.

use serde::Serialize;

use super::auth::Session;
use super::domain::{
    AcademicCentre, CentreId, Collaboration, CollaborationId, Research, ResearchId, Researcher,
    ResearcherId, Role, UserProfile,
};
use super::repository::Record;
use super::snapshot::Dataset;

const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    #[default]
    Dashboard,
    Research,
    Collaborations,
    Researchers,
    AcademicCentres,
    Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// A create, update or delete the client has sent to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    ResearchSaved(Research),
    ResearchRemoved(ResearchId),
    CollaborationSaved(Collaboration),
    CollaborationRemoved(CollaborationId),
    CentreSaved(AcademicCentre),
    CentreRemoved(CentreId),
    ResearcherSaved(Researcher),
    ResearcherRemoved(ResearcherId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoggedIn(Session),
    GuestEntered(Session),
    DataLoaded(Dataset),
    Applied(RecordChange),
    /// `status` is the HTTP status when the server answered at all.
    RequestFailed {
        status: Option<u16>,
        message: String,
    },
    NotificationDismissed,
    SectionChanged(Section),
    LoggedOut,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSession {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub section: Section,
    pub notification: Option<Notification>,
    pub data: Dataset,
}

fn upsert<T: Record>(records: &mut Vec<T>, record: T) {
    match records.iter_mut().find(|existing| existing.id() == record.id()) {
        Some(slot) => *slot = record,
        None => records.push(record),
    }
}

fn remove<T: Record>(records: &mut Vec<T>, id: &T::Id) {
    records.retain(|existing| existing.id() != id);
}

impl ClientSession {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn can_edit(&self) -> bool {
        self.role().is_some_and(Role::can_edit_content)
    }

    pub fn apply(mut self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::LoggedIn(session) | SessionEvent::GuestEntered(session) => {
                ClientSession {
                    user: Some(session.user),
                    token: Some(session.token),
                    ..ClientSession::default()
                }
            }
            SessionEvent::DataLoaded(data) => {
                self.data = data;
                self
            }
            SessionEvent::Applied(change) => {
                let message = self.apply_change(change);
                self.notification = Some(Notification::success(message));
                self
            }
            SessionEvent::RequestFailed { status, message } => {
                if status == Some(UNAUTHORIZED) {
                    return ClientSession {
                        notification: Some(Notification::error(
                            "Your session has expired. Please sign in again.",
                        )),
                        ..ClientSession::default()
                    };
                }
                self.notification = Some(Notification::error(message));
                self
            }
            SessionEvent::NotificationDismissed => {
                self.notification = None;
                self
            }
            SessionEvent::SectionChanged(section) => {
                self.section = section;
                self
            }
            SessionEvent::LoggedOut => ClientSession::default(),
        }
    }

    fn apply_change(&mut self, change: RecordChange) -> &'static str {
        let data = &mut self.data;
        match change {
            RecordChange::ResearchSaved(research) => {
                upsert(&mut data.research, research);
                "Research saved"
            }
            RecordChange::ResearchRemoved(id) => {
                remove(&mut data.research, &id);
                for researcher in &mut data.researchers {
                    researcher
                        .involvements
                        .retain(|involvement| !involvement.references(&id));
                }
                "Research deleted"
            }
            RecordChange::CollaborationSaved(collaboration) => {
                upsert(&mut data.collaborations, collaboration);
                "Collaboration saved"
            }
            RecordChange::CollaborationRemoved(id) => {
                remove(&mut data.collaborations, &id);
                "Collaboration deleted"
            }
            RecordChange::CentreSaved(centre) => {
                upsert(&mut data.academic_centres, centre);
                "Centre saved"
            }
            RecordChange::CentreRemoved(id) => {
                remove(&mut data.academic_centres, &id);
                "Centre deleted"
            }
            RecordChange::ResearcherSaved(researcher) => {
                upsert(&mut data.researchers, researcher);
                "Researcher saved"
            }
            RecordChange::ResearcherRemoved(id) => {
                remove(&mut data.researchers, &id);
                "Researcher deleted"
            }
        }
    }
}
