use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    AcademicCentre, CentreId, Collaboration, CollaborationId, Research, ResearchId, Researcher,
    ResearcherId, UserAccount, UserId,
};

/// A stored entity addressable by id.
pub trait Record: Clone + Send + Sync {
    type Id: PartialEq + Clone + Send + Sync;

    fn id(&self) -> &Self::Id;
}

impl Record for Research {
    type Id = ResearchId;

    fn id(&self) -> &ResearchId {
        &self.id
    }
}

impl Record for Collaboration {
    type Id = CollaborationId;

    fn id(&self) -> &CollaborationId {
        &self.id
    }
}

impl Record for AcademicCentre {
    type Id = CentreId;

    fn id(&self) -> &CentreId {
        &self.id
    }
}

impl Record for Researcher {
    type Id = ResearcherId;

    fn id(&self) -> &ResearcherId {
        &self.id
    }
}

impl Record for UserAccount {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Storage abstraction for one collection so any backing store can be swapped in.
pub trait Collection<T: Record>: Send + Sync {
    fn add(&self, record: T) -> Result<T, RepositoryError>;
    fn update(&self, record: T) -> Result<T, RepositoryError>;
    fn remove(&self, id: &T::Id) -> Result<T, RepositoryError>;
    fn get(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local collection preserving insertion order.
#[derive(Debug)]
pub struct InMemoryCollection<T> {
    records: Mutex<Vec<T>>,
}

impl<T> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Record> InMemoryCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))
    }
}

impl<T: Record> Collection<T> for InMemoryCollection<T> {
    fn add(&self, record: T) -> Result<T, RepositoryError> {
        let mut records = self.lock()?;
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(RepositoryError::Conflict);
        }
        records.push(record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<T, RepositoryError> {
        let mut records = self.lock()?;
        let slot = records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
            .ok_or(RepositoryError::NotFound)?;
        *slot = record.clone();
        Ok(record)
    }

    fn remove(&self, id: &T::Id) -> Result<T, RepositoryError> {
        let mut records = self.lock()?;
        let index = records
            .iter()
            .position(|existing| existing.id() == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(records.remove(index))
    }

    fn get(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let records = self.lock()?;
        Ok(records.iter().find(|existing| existing.id() == id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.lock()?.clone())
    }
}

/// The five registry collections behind trait objects.
#[derive(Clone)]
pub struct RegistryStore {
    pub research: Arc<dyn Collection<Research>>,
    pub collaborations: Arc<dyn Collection<Collaboration>>,
    pub centres: Arc<dyn Collection<AcademicCentre>>,
    pub researchers: Arc<dyn Collection<Researcher>>,
    pub users: Arc<dyn Collection<UserAccount>>,
}

impl RegistryStore {
    pub fn in_memory() -> Self {
        Self {
            research: Arc::new(InMemoryCollection::<Research>::new()),
            collaborations: Arc::new(InMemoryCollection::<Collaboration>::new()),
            centres: Arc::new(InMemoryCollection::<AcademicCentre>::new()),
            researchers: Arc::new(InMemoryCollection::<Researcher>::new()),
            users: Arc::new(InMemoryCollection::<UserAccount>::new()),
        }
    }

    /// Empty store with the office's standing academic centres.
    pub fn seeded() -> Self {
        let mut store = Self::in_memory();
        store.centres = Arc::new(InMemoryCollection::with_records(default_centres()));
        store
    }
}

const DEFAULT_CENTRES: [(&str, &str, &str); 5] = [
    (
        "centre-syarak",
        "Pusat Kajian Syariah, Undang-Undang Dan Politik",
        "SYARAK",
    ),
    ("centre-emas", "Pusat Kajian Ekonomi Dan Kemasyarakatan", "EMAS"),
    ("centre-kias", "Pusat Kajian Sains Dan Alam Sekitar", "KIAS"),
    (
        "centre-apak",
        "Pusat Kajian Akidah, Perbandingan Agama dan Keharmonian",
        "APAK",
    ),
    ("centre-rmu", "Unit Pengurusan Penyelidikan", "RMU"),
];

pub fn default_centres() -> Vec<AcademicCentre> {
    DEFAULT_CENTRES
        .iter()
        .map(|(id, name, abbreviation)| AcademicCentre {
            id: CentreId::from(*id),
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centre(id: &str, abbreviation: &str) -> AcademicCentre {
        AcademicCentre {
            id: CentreId::from(id),
            name: format!("{abbreviation} centre"),
            abbreviation: abbreviation.to_string(),
        }
    }

    #[test]
    fn list_preserves_insertion_order() {
        let collection = InMemoryCollection::new();
        collection.add(centre("c-2", "B")).expect("add");
        collection.add(centre("c-1", "A")).expect("add");

        let ids: Vec<_> = collection
            .list()
            .expect("list")
            .into_iter()
            .map(|centre| centre.id.0)
            .collect();
        assert_eq!(ids, vec!["c-2", "c-1"]);
    }

    #[test]
    fn duplicate_ids_conflict() {
        let collection = InMemoryCollection::new();
        collection.add(centre("c-1", "A")).expect("add");
        let err = collection.add(centre("c-1", "B")).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict));
    }

    #[test]
    fn update_and_remove_missing_records_report_not_found() {
        let collection: InMemoryCollection<AcademicCentre> = InMemoryCollection::new();
        assert!(matches!(
            collection.update(centre("c-9", "Z")).unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            collection.remove(&CentreId::from("c-9")).unwrap_err(),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn update_replaces_in_place() {
        let collection = InMemoryCollection::new();
        collection.add(centre("c-1", "A")).expect("add");
        collection.add(centre("c-2", "B")).expect("add");
        collection.update(centre("c-1", "AA")).expect("update");

        let listed = collection.list().expect("list");
        assert_eq!(listed[0].abbreviation, "AA");
        assert_eq!(listed[1].abbreviation, "B");
    }

    #[test]
    fn seeded_store_carries_default_centres() {
        let store = RegistryStore::seeded();
        let abbreviations: Vec<_> = store
            .centres
            .list()
            .expect("list")
            .into_iter()
            .map(|centre| centre.abbreviation)
            .collect();
        assert_eq!(abbreviations, vec!["SYARAK", "EMAS", "KIAS", "APAK", "RMU"]);
    }
}
