use solvent::{Mergeable, Notebook};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::traits::NotebookRepository;

/// Notebook use cases on top of a [`NotebookRepository`].
///
/// Writes never overwrite blindly: [`update`](Self::update) merges the
/// incoming replica into the stored one and persists the result. The
/// fetch-merge-write sequence runs inside [`NotebookRepository::modify`], so
/// concurrent writers cannot lose each other's changes, even when they are
/// separate processes sharing one SQLite file.
pub struct NotebookService<R> {
    repository: R,
}

impl<R: NotebookRepository> NotebookService<R> {
    /// Wrap a repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// The wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Create an empty notebook and persist it.
    pub fn create(&self) -> Result<Notebook> {
        let notebook = Notebook::new()?;
        self.repository.store(&notebook)?;
        tracing::info!(notebook = %notebook.id(), "created notebook");
        Ok(notebook)
    }

    /// Load a notebook.
    pub fn fetch(&self, id: Uuid) -> Result<Notebook> {
        self.repository.fetch(id)
    }

    /// Ids of every stored notebook.
    pub fn ids(&self) -> Result<Vec<Uuid>> {
        self.repository.ids()
    }

    /// Merge a replica into the stored notebook and persist the result.
    ///
    /// Returns the merged notebook, which is what every replica converges on
    /// after pulling it.
    pub fn update(&self, notebook: &Notebook) -> Result<Notebook> {
        let id = notebook.id();
        let merged = self.repository.modify(id, |stored| {
            let old = stored.ok_or(StoreError::NotFound { id })?;
            merge_into(old, notebook)
        })?;

        tracing::debug!(
            notebook = %id,
            lists = merged.get_lists().len(),
            "merged notebook update"
        );
        Ok(merged)
    }

    /// Like [`update`](Self::update), but a notebook that was never stored
    /// is inserted as is.
    pub fn merge_or_store(&self, notebook: &Notebook) -> Result<Notebook> {
        let id = notebook.id();
        let merged = self.repository.modify(id, |stored| match stored {
            Some(old) => merge_into(old, notebook),
            None => {
                tracing::info!(notebook = %id, "storing previously unknown notebook");
                Ok(notebook.clone())
            }
        })?;

        tracing::debug!(
            notebook = %id,
            lists = merged.get_lists().len(),
            "merged notebook"
        );
        Ok(merged)
    }

    /// Delete a notebook. Unknown ids are ignored.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.repository.remove(id)?;
        tracing::info!(notebook = %id, "removed notebook");
        Ok(())
    }
}

fn merge_into(old: Notebook, incoming: &Notebook) -> Result<Notebook> {
    let id = incoming.id();
    old.merge(incoming)
        .map_err(|source| StoreError::Merge { id, source })
}
