use solvent::Notebook;
use uuid::Uuid;

use crate::error::Result;

/// Persistence contract for whole notebooks.
///
/// A repository stores notebooks as opaque documents keyed by their id. It
/// never merges: conflict resolution happens in
/// [`NotebookService`](crate::NotebookService), which runs it inside
/// [`modify`](Self::modify).
///
/// Methods take `&self` so one repository can be shared between threads;
/// implementations guard their state with a lock.
pub trait NotebookRepository: Send + Sync {
    /// Insert a notebook, replacing any stored document with the same id.
    fn store(&self, notebook: &Notebook) -> Result<()>;

    /// Replace a stored notebook.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) when
    /// no notebook with that id has been stored.
    fn update(&self, notebook: &Notebook) -> Result<()>;

    /// Load a notebook by id.
    fn fetch(&self, id: Uuid) -> Result<Notebook>;

    /// Delete a notebook. Unknown ids are ignored.
    fn remove(&self, id: Uuid) -> Result<()>;

    /// Atomically read, transform and write back one notebook.
    ///
    /// `f` receives the stored notebook, or `None` when the id is unknown,
    /// and returns the document to persist. No other writer, in this process
    /// or another one sharing the same storage, can commit between the read
    /// and the write. When `f` fails nothing is written.
    fn modify<F>(&self, id: Uuid, f: F) -> Result<Notebook>
    where
        F: FnOnce(Option<Notebook>) -> Result<Notebook>;

    /// Ids of every stored notebook, ascending.
    fn ids(&self) -> Result<Vec<Uuid>>;

    /// Check whether a notebook is stored.
    fn exists(&self, id: Uuid) -> Result<bool> {
        match self.fetch(id) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
