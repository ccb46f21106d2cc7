//! Load-time upgrades for records written by older clients.
//!
//! Early researcher records stored involvements without a `type` field; every one of
//! them referenced an internal research project. The upgrade happens once, while the
//! record is deserialized, so the rest of the crate only ever sees [`Involvement`].

use serde::{Deserialize, Serialize};

use super::domain::{
    ExternalProjectStatus, Involvement, InvolvementProject, ResearchId, ResearchRole,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum InvolvementKind {
    Internal,
    External,
}

/// Wire shape of an involvement, shared by every schema version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvolvementRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<InvolvementKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    research_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    external_project_title: Option<String>,
    role: ResearchRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    external_project_status: Option<ExternalProjectStatus>,
}

impl InvolvementRecord {
    fn schema_kind(&self) -> InvolvementKind {
        self.kind.unwrap_or(InvolvementKind::Internal)
    }
}

impl From<InvolvementRecord> for Involvement {
    fn from(record: InvolvementRecord) -> Self {
        let project = match record.schema_kind() {
            InvolvementKind::Internal => InvolvementProject::Internal {
                research_id: record
                    .research_id
                    .filter(|id| !id.trim().is_empty())
                    .map(ResearchId),
            },
            InvolvementKind::External => InvolvementProject::External {
                title: record
                    .external_project_title
                    .filter(|title| !title.trim().is_empty()),
                status: record.external_project_status,
            },
        };

        Involvement {
            role: record.role,
            project,
        }
    }
}

impl From<Involvement> for InvolvementRecord {
    fn from(involvement: Involvement) -> Self {
        match involvement.project {
            InvolvementProject::Internal { research_id } => Self {
                kind: Some(InvolvementKind::Internal),
                research_id: research_id.map(|id| id.0),
                external_project_title: None,
                role: involvement.role,
                external_project_status: None,
            },
            InvolvementProject::External { title, status } => Self {
                kind: Some(InvolvementKind::External),
                research_id: None,
                external_project_title: title,
                role: involvement.role,
                external_project_status: status,
            },
        }
    }
}
