use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use solvent::Notebook;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::traits::NotebookRepository;

/// In-memory notebook repository.
///
/// Notebooks live in a `BTreeMap` behind one mutex. Nothing touches disk,
/// so this backend suits tests and short-lived servers.
///
/// # Example
///
/// ```
/// use solvent::Notebook;
/// use solvent_store::{MemoryRepository, NotebookRepository};
///
/// let repo = MemoryRepository::new();
/// let notebook = Notebook::new().unwrap();
/// repo.store(&notebook).unwrap();
///
/// assert_eq!(repo.fetch(notebook.id()).unwrap(), notebook);
/// ```
#[derive(Debug, Default)]
pub struct MemoryRepository {
    notebooks: Mutex<BTreeMap<Uuid, Notebook>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notebooks.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<Uuid, Notebook>>> {
        self.notebooks.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl NotebookRepository for MemoryRepository {
    fn store(&self, notebook: &Notebook) -> Result<()> {
        self.lock()?.insert(notebook.id(), notebook.clone());
        Ok(())
    }

    fn update(&self, notebook: &Notebook) -> Result<()> {
        let mut notebooks = self.lock()?;
        let slot = notebooks
            .get_mut(&notebook.id())
            .ok_or(StoreError::NotFound { id: notebook.id() })?;
        *slot = notebook.clone();
        Ok(())
    }

    fn fetch(&self, id: Uuid) -> Result<Notebook> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    fn remove(&self, id: Uuid) -> Result<()> {
        self.lock()?.remove(&id);
        Ok(())
    }

    fn modify<F>(&self, id: Uuid, f: F) -> Result<Notebook>
    where
        F: FnOnce(Option<Notebook>) -> Result<Notebook>,
    {
        let mut notebooks = self.lock()?;
        let next = f(notebooks.get(&id).cloned())?;
        notebooks.insert(next.id(), next.clone());
        Ok(next)
    }

    fn ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.lock()?.keys().copied().collect())
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.lock()?.contains_key(&id))
    }
}
