use core::fmt;

use crate::error::{Error, Result};

/// Core trait that every replicated entity implements.
///
/// Two replicas of the same logical entity share an identifier and can be
/// merged into a fresh value without coordination. Neither operand is
/// modified.
///
/// # Properties
///
/// For any `a`, `b`, `c` sharing an identifier, implementations must satisfy:
/// - **Commutativity:** `a.merge(b) == b.merge(a)`
/// - **Associativity:** `a.merge(b.merge(c)) == a.merge(b).merge(c)`
/// - **Idempotency:** `a.merge(a) == a`
pub trait Mergeable: Clone {
    /// Opaque, comparable identity. Never changes after creation.
    type Id: Clone + Ord + fmt::Debug + fmt::Display;

    /// Identity of this instance.
    fn identifier(&self) -> Self::Id;

    /// Combine this replica with `other`.
    ///
    /// Fails with [`Error::CannotBeMerged`] when the identifiers differ.
    fn merge(&self, other: &Self) -> Result<Self>;
}

/// Fails with [`Error::CannotBeMerged`] unless both operands share an identity.
pub(crate) fn ensure_same_identity<T: Mergeable>(this: &T, other: &T) -> Result<()> {
    let (left, right) = (this.identifier(), other.identifier());
    if left == right {
        Ok(())
    } else {
        Err(Error::CannotBeMerged {
            this: left.to_string(),
            other: right.to_string(),
        })
    }
}
