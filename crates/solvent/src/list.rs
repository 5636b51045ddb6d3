use uuid::Uuid;

use crate::clock;
use crate::error::{Error, Result};
use crate::item::ToDoItem;
use crate::lww::{LastWriterWins, OrderValue, Title};
use crate::mergeable::{ensure_same_identity, Mergeable};
use crate::pset::PSet;

/// Tag of the item set owned by every list.
pub const ITEM_SET_TAG: &str = "ToDoItemPSet";

/// Distance between the order values of consecutively appended items.
pub const ORDER_STEP: f64 = 10.0;

/// A titled, ordered list of [`ToDoItem`]s.
///
/// Items are kept in a [`PSet`]; their display order comes from
/// [`OrderValue`]s that [`move_item`](Self::move_item) places halfway between
/// the new neighbours. Halving a gap over and over eventually runs out of
/// `f64` precision; when a move finds no representable value between its
/// neighbours the list is [`rebalance`](Self::rebalance)d first.
///
/// # Example
///
/// ```
/// use solvent::ToDoList;
///
/// let mut list = ToDoList::new("Groceries").unwrap();
/// let milk = list.add_item("Milk").unwrap();
/// let eggs = list.add_item("Eggs").unwrap();
///
/// list.move_item(eggs, 0).unwrap();
/// let titles: Vec<_> = list.sorted_items().iter().map(|i| i.title.as_str()).collect();
/// assert_eq!(titles, ["Eggs", "Milk"]);
///
/// list.check_item(milk).unwrap();
/// assert!(list.get_item(milk).unwrap().checked);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ToDoList {
    id: Uuid,
    title: Title,
    to_do_items: PSet<ToDoItem>,
    created_at: i64,
}

impl ToDoList {
    /// Create an empty list with a fresh identifier.
    ///
    /// Fails only when no identifier can be minted.
    pub fn new(title: impl Into<String>) -> Result<Self> {
        let now = clock::now();
        Ok(Self {
            id: clock::random_id()?,
            title: Title::with_timestamp(title, now),
            to_do_items: PSet::new(ITEM_SET_TAG),
            created_at: now,
        })
    }

    /// Reassemble a list from stored parts.
    #[must_use]
    pub fn from_parts(id: Uuid, title: Title, to_do_items: PSet<ToDoItem>, created_at: i64) -> Self {
        Self {
            id,
            title,
            to_do_items,
            created_at,
        }
    }

    /// Identity of the list.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current title register.
    #[must_use]
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// The underlying item set, tombstones included.
    #[must_use]
    pub fn items(&self) -> &PSet<ToDoItem> {
        &self.to_do_items
    }

    /// Creation time in UTC nanoseconds.
    #[must_use]
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Replace the title, stamped with the current time.
    pub fn rename(&mut self, title: impl Into<String>) {
        let updated_at = clock::now().max(self.title.updated_at.saturating_add(1));
        self.rename_with_timestamp(title, updated_at);
    }

    /// Replace the title with an explicit timestamp.
    pub fn rename_with_timestamp(&mut self, title: impl Into<String>, updated_at: i64) {
        self.title = Title::with_timestamp(title, updated_at);
    }

    /// Append a new unchecked item and return its id.
    pub fn add_item(&mut self, title: impl Into<String>) -> Result<Uuid> {
        let id = clock::random_id()?;
        let order_value = OrderValue::new(self.next_order_value());
        self.to_do_items.add(ToDoItem::new(id, title, order_value))?;
        Ok(id)
    }

    /// Fetch a live item.
    pub fn get_item(&self, id: Uuid) -> Result<&ToDoItem> {
        self.to_do_items.get(&id).ok_or_else(|| Error::not_found(id))
    }

    /// All live items, in no particular order.
    #[must_use]
    pub fn get_items(&self) -> Vec<&ToDoItem> {
        self.to_do_items.iter().collect()
    }

    /// All live items sorted by order value.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<&ToDoItem> {
        let mut items = self.get_items();
        items.sort_by(|a, b| {
            a.order_value
                .value
                .total_cmp(&b.order_value.value)
                .then_with(|| a.id.cmp(&b.id))
        });
        items
    }

    /// Tombstone an item. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: Uuid) {
        if let Some(item) = self.to_do_items.get(&id).cloned() {
            self.to_do_items.remove(&item);
        }
    }

    /// Mark an item as done. The id stays the same.
    pub fn check_item(&mut self, id: Uuid) -> Result<Uuid> {
        let mut item = self.get_item(id)?.clone();
        item.checked = true;
        self.to_do_items.add(item)?;
        Ok(id)
    }

    /// Mark an item as not done.
    ///
    /// A merge can never turn `checked` back to `false`, so the old item is
    /// tombstoned and replaced by a copy under a new id, which is returned.
    pub fn uncheck_item(&mut self, id: Uuid) -> Result<Uuid> {
        let item = self.get_item(id)?.clone();
        let new_id = clock::random_id()?;

        self.to_do_items.remove(&item);
        self.to_do_items
            .add(ToDoItem::new(new_id, item.title, item.order_value))?;
        Ok(new_id)
    }

    /// Move an item to `target_index` in the sorted order.
    ///
    /// Indices past the end are clamped to the last position.
    pub fn move_item(&mut self, id: Uuid, target_index: usize) -> Result<()> {
        let mut slot = self.move_slot(id, target_index)?;
        if slot.is_some_and(|(low, high)| !has_room(low, high)) {
            self.rebalance()?;
            slot = self.move_slot(id, target_index)?;
        }
        let Some((low, high)) = slot else {
            return Ok(());
        };

        let mut item = self.get_item(id)?.clone();
        let updated_at = clock::now().max(item.order_value.updated_at.saturating_add(1));
        item.order_value = OrderValue::with_timestamp((low + high) / 2.0, updated_at);
        self.to_do_items.add(item)
    }

    /// Reassign evenly spaced order values to all live items, keeping their
    /// current order.
    pub fn rebalance(&mut self) -> Result<()> {
        let now = clock::now();
        let respaced: Vec<ToDoItem> = self
            .sorted_items()
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let mut item = item.clone();
                let updated_at = now.max(item.order_value.updated_at.saturating_add(1));
                item.order_value =
                    OrderValue::with_timestamp((index + 1) as f64 * ORDER_STEP, updated_at);
                item
            })
            .collect();

        for item in respaced {
            self.to_do_items.add(item)?;
        }
        Ok(())
    }

    /// Order value for an item appended at the end.
    #[must_use]
    pub fn next_order_value(&self) -> f64 {
        self.to_do_items
            .iter()
            .map(|item| item.order_value.value)
            .fold(0.0, f64::max)
            + ORDER_STEP
    }

    /// Bounds of the gap the item has to land in, or `None` if it already
    /// sits at the target index.
    fn move_slot(&self, id: Uuid, target_index: usize) -> Result<Option<(f64, f64)>> {
        let current = self.get_item(id)?.order_value.value;
        let sorted = self.sorted_items();
        let index = target_index.min(sorted.len().saturating_sub(1));
        let Some(target) = sorted.get(index) else {
            return Ok(None);
        };
        let mid = target.order_value.value;

        let slot = if mid < current {
            let before = index
                .checked_sub(1)
                .and_then(|i| sorted.get(i))
                .map_or(0.0, |item| item.order_value.value);
            Some((before, mid))
        } else if mid > current {
            let after = sorted
                .get(index + 1)
                .map_or_else(|| self.next_order_value(), |item| item.order_value.value);
            Some((mid, after))
        } else if target.id != id {
            // Same value as another item: no gap until the list is respaced.
            Some((mid, mid))
        } else {
            None
        };
        Ok(slot)
    }
}

/// Whether a value strictly between `low` and `high` is representable.
fn has_room(low: f64, high: f64) -> bool {
    let mid = (low + high) / 2.0;
    low < mid && mid < high
}

impl Mergeable for ToDoList {
    type Id = Uuid;

    fn identifier(&self) -> Uuid {
        self.id
    }

    fn merge(&self, other: &Self) -> Result<Self> {
        ensure_same_identity(self, other)?;

        Ok(Self {
            id: self.id,
            title: self.title.resolve(&other.title).clone(),
            to_do_items: self.to_do_items.merge(&other.to_do_items)?,
            created_at: self.created_at,
        })
    }
}
