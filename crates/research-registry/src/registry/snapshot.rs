//! Whole-registry JSON snapshots.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{AcademicCentre, CentreId, Collaboration, Research, ResearchId, Researcher};
use super::repository::{InMemoryCollection, RegistryStore};

/// Every content collection at one point in time. User accounts are never included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub research: Vec<Research>,
    #[serde(default)]
    pub collaborations: Vec<Collaboration>,
    #[serde(default)]
    pub academic_centres: Vec<AcademicCentre>,
    #[serde(default)]
    pub researchers: Vec<Researcher>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to open snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot is not valid registry JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Involvements missing a `type` are upgraded and unusable dates dropped while parsing.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn centre(&self, id: &CentreId) -> Option<&AcademicCentre> {
        self.academic_centres.iter().find(|centre| &centre.id == id)
    }

    pub fn research_by_id(&self, id: &ResearchId) -> Option<&Research> {
        self.research.iter().find(|item| &item.id == id)
    }

    /// In-memory store holding this snapshot and no user accounts.
    pub fn into_store(self) -> RegistryStore {
        RegistryStore {
            research: Arc::new(InMemoryCollection::with_records(self.research)),
            collaborations: Arc::new(InMemoryCollection::with_records(self.collaborations)),
            centres: Arc::new(InMemoryCollection::with_records(self.academic_centres)),
            researchers: Arc::new(InMemoryCollection::with_records(self.researchers)),
            users: Arc::new(InMemoryCollection::new()),
        }
    }
}
