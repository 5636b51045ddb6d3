//! Error taxonomy shared by every entity in the hierarchy.

use uuid::Uuid;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures returned by entity operations and merges.
///
/// A type-mismatch variant is intentionally absent: [`crate::Mergeable::merge`]
/// takes `&Self`, so two different entity kinds can never meet in a merge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested id is not part of the current live view.
    #[error("item with ID '{id}' could not be found")]
    NotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// The two merge operands have different identifiers.
    #[error("item with ID '{this}' cannot be merged with item with ID '{other}'")]
    CannotBeMerged {
        /// Identifier of the left operand.
        this: String,
        /// Identifier of the right operand.
        other: String,
    },

    /// An unexpected lower-level failure, e.g. the entropy source.
    #[error("{message}")]
    Unknown {
        /// Context describing what was being attempted.
        message: String,
        /// The underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub(crate) fn unknown<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unknown {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Returns `true` for [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
