use core::cmp::Ordering;

use crate::clock;

/// A field resolved by last-writer-wins.
///
/// The value with the greater `updated_at` wins. Equal timestamps are broken
/// by comparing the values themselves, so the outcome does not depend on
/// which replica happens to be the left operand.
pub trait LastWriterWins {
    /// Timestamp of the last local write.
    fn updated_at(&self) -> i64;

    /// Deterministic ordering between two values written at the same instant.
    fn tie_break(&self, other: &Self) -> Ordering;

    /// Pick the winning register out of `self` and `other`.
    fn resolve<'a>(&'a self, other: &'a Self) -> &'a Self {
        match other
            .updated_at()
            .cmp(&self.updated_at())
            .then_with(|| other.tie_break(self))
        {
            Ordering::Greater => other,
            _ => self,
        }
    }
}

/// A real-valued sort key together with the time it was last moved.
///
/// # Example
///
/// ```
/// use solvent::{LastWriterWins, OrderValue};
///
/// let old = OrderValue::with_timestamp(10.0, 1);
/// let new = OrderValue::with_timestamp(15.0, 2);
/// assert_eq!(old.resolve(&new).value, 15.0);
/// assert_eq!(new.resolve(&old).value, 15.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderValue {
    /// Position of the item; lower sorts first.
    pub value: f64,
    /// UTC nanoseconds of the last move.
    pub updated_at: i64,
}

impl OrderValue {
    /// Create an order value stamped with the current time.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self::with_timestamp(value, clock::now())
    }

    /// Create an order value with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(value: f64, updated_at: i64) -> Self {
        Self { value, updated_at }
    }
}

impl LastWriterWins for OrderValue {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn tie_break(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

/// A list title together with the time it was last renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    /// The title text.
    pub value: String,
    /// UTC nanoseconds of the last rename.
    pub updated_at: i64,
}

impl Title {
    /// Create a title stamped with the current time.
    pub fn new(value: impl Into<String>) -> Self {
        Self::with_timestamp(value, clock::now())
    }

    /// Create a title with an explicit timestamp.
    pub fn with_timestamp(value: impl Into<String>, updated_at: i64) -> Self {
        Self {
            value: value.into(),
            updated_at,
        }
    }
}

impl LastWriterWins for Title {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn tie_break(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_timestamp_wins() {
        let a = Title::with_timestamp("old", 1);
        let b = Title::with_timestamp("new", 2);
        assert_eq!(a.resolve(&b).value, "new");
        assert_eq!(b.resolve(&a).value, "new");
    }

    #[test]
    fn earlier_timestamp_never_overrides() {
        let a = OrderValue::with_timestamp(10.0, 5);
        let b = OrderValue::with_timestamp(99.0, 4);
        assert_eq!(*a.resolve(&b), a);
    }

    #[test]
    fn tie_is_independent_of_operand_order() {
        let a = OrderValue::with_timestamp(10.0, 7);
        let b = OrderValue::with_timestamp(20.0, 7);
        assert_eq!(a.resolve(&b), b.resolve(&a));
        assert_eq!(a.resolve(&b).value, 20.0);

        let x = Title::with_timestamp("Groceries", 3);
        let y = Title::with_timestamp("Shopping", 3);
        assert_eq!(x.resolve(&y), y.resolve(&x));
        assert_eq!(x.resolve(&y).value, "Shopping");
    }

    #[test]
    fn resolve_with_self_is_identity() {
        let a = Title::with_timestamp("same", 1);
        assert_eq!(*a.resolve(&a), a);
    }
}
