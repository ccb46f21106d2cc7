use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::changes::{
    CentreDraft, CentrePatch, CollaborationDraft, CollaborationPatch, ResearchDraft,
    ResearchPatch, ResearcherDraft, ResearcherPatch, ValidationError,
};
use super::dashboard::{Dashboard, DashboardSnapshot};
use super::domain::{
    AcademicCentre, CentreId, Collaboration, CollaborationId, Research, ResearchId, Researcher,
    ResearcherId,
};
use super::filters::{
    completion_year_options, start_year_options, ResearchFilter, ResearcherFilter,
};
use super::repository::{RegistryStore, RepositoryError};
use super::snapshot::Dataset;

/// Numbered ids of the form `<prefix>-NNNNNN`, continuing past any already stored.
#[derive(Debug)]
struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    fn after<'a>(prefix: &'static str, existing: impl IntoIterator<Item = &'a str>) -> Self {
        let highest = existing
            .into_iter()
            .filter_map(|id| id.strip_prefix(prefix)?.strip_prefix('-')?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            prefix,
            next: AtomicU64::new(highest + 1),
        }
    }

    fn next_id(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id:06}", self.prefix)
    }
}

#[derive(Debug)]
struct IdSequences {
    research: IdSequence,
    collaborations: IdSequence,
    centres: IdSequence,
    researchers: IdSequence,
}

impl IdSequences {
    fn for_store(store: &RegistryStore) -> Result<Self, RepositoryError> {
        let research = store.research.list()?;
        let collaborations = store.collaborations.list()?;
        let centres = store.centres.list()?;
        let researchers = store.researchers.list()?;

        Ok(Self {
            research: IdSequence::after("res", research.iter().map(|r| r.id.as_str())),
            collaborations: IdSequence::after("col", collaborations.iter().map(|c| c.id.as_str())),
            centres: IdSequence::after("ctr", centres.iter().map(|c| c.id.as_str())),
            researchers: IdSequence::after("rsr", researchers.iter().map(|r| r.id.as_str())),
        })
    }
}

/// Service owning every content mutation and the cross-collection rules.
#[derive(Clone)]
pub struct RegistryService {
    store: RegistryStore,
    ids: Arc<IdSequences>,
}

/// Reference counts that blocked a centre deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreUsage {
    pub research: usize,
    pub collaborations: usize,
    pub researchers: usize,
}

impl CentreUsage {
    pub fn is_unused(&self) -> bool {
        self.research == 0 && self.collaborations == 0 && self.researchers == 0
    }
}

/// Options for the research listing year selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearOptions {
    pub start_years: Vec<i32>,
    pub completion_years: Vec<i32>,
}

impl RegistryService {
    /// Id sequences resume after the highest numbered record already in `store`.
    pub fn new(store: RegistryStore) -> Result<Self, RegistryError> {
        let ids = IdSequences::for_store(&store)?;
        debug!(
            next_research = %ids.research.next.load(Ordering::Relaxed),
            "registry id sequences primed"
        );
        Ok(Self {
            store,
            ids: Arc::new(ids),
        })
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn list_research(&self, filter: &ResearchFilter) -> Result<Vec<Research>, RegistryError> {
        let research = self.store.research.list()?;
        Ok(research
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect())
    }

    pub fn get_research(&self, id: &ResearchId) -> Result<Research, RegistryError> {
        Ok(self
            .store
            .research
            .get(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn create_research(
        &self,
        draft: ResearchDraft,
        actor: &str,
    ) -> Result<Research, RegistryError> {
        draft.validate()?;

        let research = Research {
            id: ResearchId(self.ids.research.next_id()),
            title: draft.title,
            description: draft.description,
            centre_id: draft.centre_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            extension_periods: draft.extension_periods,
            budget: draft.budget,
            spending: draft.spending,
            team: draft.team,
            status: draft.status,
            progress: draft.progress,
            yearly_progress: draft.yearly_progress,
            documents: draft.documents,
            created_by: actor.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let stored = self.store.research.add(research)?;
        info!(research_id = %stored.id, centre_id = %stored.centre_id, "research created");
        Ok(stored)
    }

    pub fn update_research(
        &self,
        id: &ResearchId,
        patch: ResearchPatch,
    ) -> Result<Research, RegistryError> {
        patch.validate()?;
        let mut research = self.get_research(id)?;
        patch.apply(&mut research);
        research.updated_at = Some(Utc::now());

        let stored = self.store.research.update(research)?;
        info!(research_id = %stored.id, "research updated");
        Ok(stored)
    }

    /// Remove a research record after pruning every involvement that points at it.
    pub fn delete_research(&self, id: &ResearchId) -> Result<Research, RegistryError> {
        self.get_research(id)?;

        let mut pruned = 0usize;
        for mut researcher in self.store.researchers.list()? {
            let before = researcher.involvements.len();
            researcher
                .involvements
                .retain(|involvement| !involvement.references(id));
            if researcher.involvements.len() != before {
                researcher.updated_at = Some(Utc::now());
                debug!(researcher_id = %researcher.id, research_id = %id, "pruning involvements");
                self.store.researchers.update(researcher)?;
                pruned += 1;
            }
        }

        let removed = self.store.research.remove(id)?;
        info!(research_id = %id, pruned_researchers = pruned, "research deleted");
        Ok(removed)
    }

    pub fn list_collaborations(&self) -> Result<Vec<Collaboration>, RegistryError> {
        Ok(self.store.collaborations.list()?)
    }

    pub fn get_collaboration(&self, id: &CollaborationId) -> Result<Collaboration, RegistryError> {
        Ok(self
            .store
            .collaborations
            .get(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn create_collaboration(
        &self,
        draft: CollaborationDraft,
        actor: &str,
    ) -> Result<Collaboration, RegistryError> {
        draft.validate()?;

        let collaboration = Collaboration {
            id: CollaborationId(self.ids.collaborations.next_id()),
            organization: draft.organization,
            kind: draft.kind,
            start_date: draft.start_date,
            end_date: draft.end_date,
            extension_periods: draft.extension_periods,
            centre_id: draft.centre_id,
            created_by: actor.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let stored = self.store.collaborations.add(collaboration)?;
        info!(collaboration_id = %stored.id, kind = stored.kind.label(), "collaboration created");
        Ok(stored)
    }

    pub fn update_collaboration(
        &self,
        id: &CollaborationId,
        patch: CollaborationPatch,
    ) -> Result<Collaboration, RegistryError> {
        patch.validate()?;
        let mut collaboration = self.get_collaboration(id)?;
        patch.apply(&mut collaboration);
        collaboration.updated_at = Some(Utc::now());

        let stored = self.store.collaborations.update(collaboration)?;
        info!(collaboration_id = %stored.id, "collaboration updated");
        Ok(stored)
    }

    pub fn delete_collaboration(
        &self,
        id: &CollaborationId,
    ) -> Result<Collaboration, RegistryError> {
        let removed = self.store.collaborations.remove(id)?;
        info!(collaboration_id = %id, "collaboration deleted");
        Ok(removed)
    }

    pub fn list_centres(&self) -> Result<Vec<AcademicCentre>, RegistryError> {
        Ok(self.store.centres.list()?)
    }

    pub fn create_centre(&self, draft: CentreDraft) -> Result<AcademicCentre, RegistryError> {
        draft.validate()?;

        let centre = AcademicCentre {
            id: CentreId(self.ids.centres.next_id()),
            name: draft.name,
            abbreviation: draft.abbreviation,
        };

        let stored = self.store.centres.add(centre)?;
        info!(centre_id = %stored.id, abbreviation = %stored.abbreviation, "centre created");
        Ok(stored)
    }

    pub fn update_centre(
        &self,
        id: &CentreId,
        patch: CentrePatch,
    ) -> Result<AcademicCentre, RegistryError> {
        patch.validate()?;
        let mut centre = self
            .store
            .centres
            .get(id)?
            .ok_or(RepositoryError::NotFound)?;
        patch.apply(&mut centre);

        let stored = self.store.centres.update(centre)?;
        info!(centre_id = %stored.id, "centre updated");
        Ok(stored)
    }

    pub fn centre_usage(&self, id: &CentreId) -> Result<CentreUsage, RegistryError> {
        Ok(CentreUsage {
            research: count_where(self.store.research.list()?, |r| &r.centre_id == id),
            collaborations: count_where(self.store.collaborations.list()?, |c| &c.centre_id == id),
            researchers: count_where(self.store.researchers.list()?, |r| &r.centre_id == id),
        })
    }

    /// Delete a centre that nothing references any more.
    pub fn delete_centre(&self, id: &CentreId) -> Result<AcademicCentre, RegistryError> {
        if self.store.centres.get(id)?.is_none() {
            return Err(RepositoryError::NotFound.into());
        }

        let usage = self.centre_usage(id)?;
        if !usage.is_unused() {
            warn!(
                centre_id = %id,
                research = usage.research,
                collaborations = usage.collaborations,
                researchers = usage.researchers,
                "centre deletion rejected"
            );
            return Err(RegistryError::CentreInUse {
                centre_id: id.clone(),
                usage,
            });
        }

        let removed = self.store.centres.remove(id)?;
        info!(centre_id = %id, "centre deleted");
        Ok(removed)
    }

    pub fn list_researchers(
        &self,
        filter: &ResearcherFilter,
    ) -> Result<Vec<Researcher>, RegistryError> {
        let researchers = self.store.researchers.list()?;
        Ok(researchers
            .into_iter()
            .filter(|researcher| filter.matches(researcher))
            .collect())
    }

    pub fn get_researcher(&self, id: &ResearcherId) -> Result<Researcher, RegistryError> {
        Ok(self
            .store
            .researchers
            .get(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn create_researcher(
        &self,
        draft: ResearcherDraft,
        actor: &str,
    ) -> Result<Researcher, RegistryError> {
        draft.validate()?;

        let researcher = Researcher {
            id: ResearcherId(self.ids.researchers.next_id()),
            name: draft.name,
            email: draft.email,
            centre_id: draft.centre_id,
            involvements: draft.involvements,
            created_by: actor.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let stored = self.store.researchers.add(researcher)?;
        info!(researcher_id = %stored.id, "researcher created");
        Ok(stored)
    }

    pub fn update_researcher(
        &self,
        id: &ResearcherId,
        patch: ResearcherPatch,
    ) -> Result<Researcher, RegistryError> {
        patch.validate()?;
        let mut researcher = self.get_researcher(id)?;
        patch.apply(&mut researcher);
        researcher.updated_at = Some(Utc::now());

        let stored = self.store.researchers.update(researcher)?;
        info!(researcher_id = %stored.id, "researcher updated");
        Ok(stored)
    }

    pub fn delete_researcher(&self, id: &ResearcherId) -> Result<Researcher, RegistryError> {
        let removed = self.store.researchers.remove(id)?;
        info!(researcher_id = %id, "researcher deleted");
        Ok(removed)
    }

    pub fn research_year_options(&self) -> Result<YearOptions, RegistryError> {
        let research = self.store.research.list()?;
        Ok(YearOptions {
            start_years: start_year_options(&research),
            completion_years: completion_year_options(&research),
        })
    }

    /// Copy of every content collection, for dashboards and reports.
    pub fn dataset(&self) -> Result<Dataset, RegistryError> {
        Ok(Dataset {
            research: self.store.research.list()?,
            collaborations: self.store.collaborations.list()?,
            academic_centres: self.store.centres.list()?,
            researchers: self.store.researchers.list()?,
        })
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardSnapshot, RegistryError> {
        let dataset = self.dataset()?;
        Ok(Dashboard::from_dataset(&dataset, today).snapshot())
    }
}

fn count_where<T>(records: Vec<T>, predicate: impl Fn(&T) -> bool) -> usize {
    records.iter().filter(|record| predicate(record)).count()
}

/// Error raised by the registry service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(
        "centre {centre_id} is still referenced by {} research, {} collaborations and {} researchers",
        usage.research,
        usage.collaborations,
        usage.researchers
    )]
    CentreInUse {
        centre_id: CentreId,
        usage: CentreUsage,
    },
}
