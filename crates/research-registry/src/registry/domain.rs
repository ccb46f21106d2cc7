use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::dates::{lenient_date, lenient_date_list};
use super::migration::InvolvementRecord;

macro_rules! string_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(pub String);

            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )+
    };
}

string_id!(
    /// Identifier wrapper for research projects.
    ResearchId,
    /// Identifier wrapper for MoU/MoA collaborations.
    CollaborationId,
    /// Identifier wrapper for academic centres.
    CentreId,
    /// Identifier wrapper for researcher profiles.
    ResearcherId,
    /// Identifier wrapper for user accounts.
    UserId,
    /// Identifier wrapper for research documents.
    DocumentId,
);

/// Manually assigned lifecycle of a research project.
///
/// Values that do not match a known status deserialize to [`ResearchStatus::Unknown`]
/// and are ignored by every rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResearchStatus {
    #[serde(rename = "Active-Ongoing (New)", alias = "ongoing-new")]
    OngoingNew,
    #[serde(rename = "Active-Ongoing (From Past Years)", alias = "ongoing-past")]
    OngoingPast,
    #[serde(rename = "Unregistered", alias = "unregistered")]
    Unregistered,
    #[serde(rename = "Completed", alias = "completed")]
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResearchStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::OngoingNew,
            Self::OngoingPast,
            Self::Unregistered,
            Self::Completed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OngoingNew => "Active-Ongoing (New)",
            Self::OngoingPast => "Active-Ongoing (From Past Years)",
            Self::Unregistered => "Unregistered",
            Self::Completed => "Completed",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::OngoingNew => "statuses.Active-Ongoing (New)",
            Self::OngoingPast => "statuses.Active-Ongoing (From Past Years)",
            Self::Unregistered => "statuses.Unregistered",
            Self::Completed => "statuses.Completed",
            Self::Unknown => "common.unknown",
        }
    }

    /// Both active statuses share the "ongoing" display label.
    pub const fn is_ongoing(self) -> bool {
        matches!(self, Self::OngoingNew | Self::OngoingPast)
    }
}

/// Derived collaboration lifecycle label. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollaborationStatus {
    Active,
    Expired,
    Extended,
}

impl CollaborationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Extended => "Extended",
        }
    }

    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::Active => "statuses.Active",
            Self::Expired => "statuses.Expired",
            Self::Extended => "statuses.Extended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollaborationType {
    #[serde(rename = "MoU")]
    MoU,
    #[serde(rename = "MoA")]
    MoA,
}

impl CollaborationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MoU => "MoU",
            Self::MoA => "MoA",
        }
    }
}

/// Per-calendar-year checkpoint inside a research record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProgress {
    pub year: i32,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub budget_limit: f64,
    #[serde(default)]
    pub budget_spent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Proposal,
    Report,
    Publication,
    Presentation,
    Data,
    Other,
}

/// Metadata for a file attached to a research record. The bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    #[serde(rename = "fileURL")]
    pub file_url: String,
    pub storage_path: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Research {
    pub id: ResearchId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub centre_id: CentreId,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date_list")]
    pub extension_periods: Vec<NaiveDate>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spending: f64,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub status: ResearchStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub yearly_progress: Vec<YearlyProgress>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Research {
    pub fn yearly_entries_for(&self, year: i32) -> impl Iterator<Item = &YearlyProgress> {
        self.yearly_progress
            .iter()
            .filter(move |entry| entry.year == year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: CollaborationId,
    pub organization: String,
    #[serde(rename = "type")]
    pub kind: CollaborationType,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date_list")]
    pub extension_periods: Vec<NaiveDate>,
    pub centre_id: CentreId,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicCentre {
    pub id: CentreId,
    pub name: String,
    #[serde(rename = "abbr", alias = "abbreviation")]
    pub abbreviation: String,
}

/// Display sentinel for a reference that does not resolve.
pub const UNRESOLVED: &str = "N/A";

/// Abbreviation of the referenced centre, or [`UNRESOLVED`].
pub fn centre_abbreviation<'a>(centres: &'a [AcademicCentre], id: &CentreId) -> &'a str {
    centres
        .iter()
        .find(|centre| &centre.id == id)
        .map(|centre| centre.abbreviation.as_str())
        .unwrap_or(UNRESOLVED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchRole {
    #[serde(rename = "Principal Investigator")]
    PrincipalInvestigator,
    #[serde(rename = "Research Secretary")]
    ResearchSecretary,
    #[serde(rename = "Research Member")]
    ResearchMember,
}

impl ResearchRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PrincipalInvestigator => "Principal Investigator",
            Self::ResearchSecretary => "Research Secretary",
            Self::ResearchMember => "Research Member",
        }
    }

    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::PrincipalInvestigator => "roles.Principal Investigator",
            Self::ResearchSecretary => "roles.Research Secretary",
            Self::ResearchMember => "roles.Research Member",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalProjectStatus {
    #[serde(rename = "Active-Ongoing")]
    ActiveOngoing,
    Pending,
    Completed,
}

impl ExternalProjectStatus {
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::ActiveOngoing => "statuses.Active-Ongoing",
            Self::Pending => "statuses.Pending",
            Self::Completed => "statuses.Completed",
        }
    }
}

/// Which project an involvement points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvolvementProject {
    /// A research record owned by this office. The id may dangle.
    Internal { research_id: Option<ResearchId> },
    External {
        title: Option<String>,
        status: Option<ExternalProjectStatus>,
    },
}

/// A researcher's role on one internal or external project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InvolvementRecord", into = "InvolvementRecord")]
pub struct Involvement {
    pub role: ResearchRole,
    pub project: InvolvementProject,
}

impl Involvement {
    pub fn internal(research_id: ResearchId, role: ResearchRole) -> Self {
        Self {
            role,
            project: InvolvementProject::Internal {
                research_id: Some(research_id),
            },
        }
    }

    pub fn external(
        title: impl Into<String>,
        status: Option<ExternalProjectStatus>,
        role: ResearchRole,
    ) -> Self {
        Self {
            role,
            project: InvolvementProject::External {
                title: Some(title.into()),
                status,
            },
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.project, InvolvementProject::External { .. })
    }

    pub fn references(&self, research_id: &ResearchId) -> bool {
        match &self.project {
            InvolvementProject::Internal {
                research_id: Some(id),
            } => id == research_id,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Researcher {
    pub id: ResearcherId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub centre_id: CentreId,
    #[serde(default)]
    pub involvements: Vec<Involvement>,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Researcher {
    pub fn count_role(&self, role: ResearchRole) -> usize {
        self.involvements
            .iter()
            .filter(|involvement| involvement.role == role)
            .count()
    }

    pub fn has_role(&self, role: ResearchRole) -> bool {
        self.involvements
            .iter()
            .any(|involvement| involvement.role == role)
    }
}

/// Access level of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Host,
    CoHost,
    Guest,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::CoHost => "co-host",
            Self::Guest => "guest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "host" => Some(Self::Host),
            "co-host" => Some(Self::CoHost),
            "guest" => Some(Self::Guest),
            _ => None,
        }
    }

    /// Hosts and co-hosts may create, edit and delete registry content.
    pub const fn can_edit_content(self) -> bool {
        matches!(self, Self::Host | Self::CoHost)
    }

    pub const fn can_manage_users(self) -> bool {
        matches!(self, Self::Host)
    }
}

/// Stored account including the password hash. Never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
    pub organization: String,
    pub password_hash: String,
}

impl UserAccount {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            approved: self.approved,
            organization: self.organization.clone(),
        }
    }
}

/// Public view of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
    pub organization: String,
}
