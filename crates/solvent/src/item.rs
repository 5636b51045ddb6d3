use uuid::Uuid;

use crate::error::Result;
use crate::lww::{LastWriterWins, OrderValue};
use crate::mergeable::{ensure_same_identity, Mergeable};

/// A single task on a [`ToDoList`](crate::ToDoList).
///
/// The title is fixed at creation. `checked` only ever goes from `false` to
/// `true` through merges; unchecking retires the item and creates a new one
/// (see [`ToDoList::uncheck_item`](crate::ToDoList::uncheck_item)).
#[derive(Debug, Clone, PartialEq)]
pub struct ToDoItem {
    /// Identity of the item.
    pub id: Uuid,
    /// Task text.
    pub title: String,
    /// Whether the task is done.
    pub checked: bool,
    /// Position within the owning list.
    pub order_value: OrderValue,
}

impl ToDoItem {
    /// Create an unchecked item.
    pub fn new(id: Uuid, title: impl Into<String>, order_value: OrderValue) -> Self {
        Self {
            id,
            title: title.into(),
            checked: false,
            order_value,
        }
    }
}

impl Mergeable for ToDoItem {
    type Id = Uuid;

    fn identifier(&self) -> Uuid {
        self.id
    }

    fn merge(&self, other: &Self) -> Result<Self> {
        ensure_same_identity(self, other)?;

        Ok(Self {
            id: self.id,
            title: self.title.clone(),
            checked: self.checked || other.checked,
            order_value: *self.order_value.resolve(&other.order_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn milk(checked: bool, value: f64, updated_at: i64) -> ToDoItem {
        ToDoItem {
            id: Uuid::from_u128(7),
            title: "Milk".to_string(),
            checked,
            order_value: OrderValue::with_timestamp(value, updated_at),
        }
    }

    #[test]
    fn checked_is_or_of_both() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let merged = milk(a, 10.0, 1).merge(&milk(b, 10.0, 1)).unwrap();
            assert_eq!(merged.checked, a || b);
        }
    }

    #[test]
    fn order_value_is_last_writer_wins() {
        let older = milk(false, 10.0, 1);
        let newer = milk(false, 15.0, 2);
        assert_eq!(older.merge(&newer).unwrap().order_value.value, 15.0);
        assert_eq!(newer.merge(&older).unwrap().order_value.value, 15.0);
    }

    #[test]
    fn merge_keeps_title() {
        let merged = milk(false, 10.0, 1).merge(&milk(true, 20.0, 2)).unwrap();
        assert_eq!(merged.title, "Milk");
        assert_eq!(merged.id, Uuid::from_u128(7));
    }

    #[test]
    fn merge_is_idempotent() {
        let a = milk(true, 12.5, 3);
        assert_eq!(a.merge(&a).unwrap(), a);
    }

    #[test]
    fn merge_rejects_other_ids() {
        let a = milk(false, 10.0, 1);
        let b = ToDoItem::new(Uuid::from_u128(8), "Eggs", OrderValue::with_timestamp(20.0, 1));
        let err = a.merge(&b).unwrap_err();
        assert!(matches!(err, Error::CannotBeMerged { .. }));
    }
}
