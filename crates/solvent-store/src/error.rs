use uuid::Uuid;

/// Result alias for store and service operations.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors raised by repositories and the notebook service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No notebook with this id is stored.
    #[error("notebook with ID '{id}' could not be found")]
    NotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// The incoming replica could not be merged into the stored notebook.
    #[error("could not merge with old notebook [notebook ID: '{id}']")]
    Merge {
        /// Id of the notebook being updated.
        id: Uuid,
        /// Why the merge failed.
        #[source]
        source: solvent::Error,
    },

    /// A core entity operation failed.
    #[error(transparent)]
    Core(#[from] solvent::Error),

    /// A stored document could not be encoded or decoded as JSON.
    #[error("notebook document could not be encoded: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The SQLite backend reported an error, e.g. a busy database.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A thread panicked while holding the repository lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// `true` when the notebook (or something inside it) does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Core(err) => err.is_not_found(),
            _ => false,
        }
    }
}
