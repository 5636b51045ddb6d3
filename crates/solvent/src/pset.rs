use std::collections::btree_map::{BTreeMap, Entry};

use crate::error::{Error, Result};
use crate::mergeable::{ensure_same_identity, Mergeable};

/// An observed-remove set of mergeable entities with permanent tombstones.
///
/// Elements are keyed by their [`Mergeable::identifier`]. Adding an element
/// whose key is already present merges the two instead of overwriting, so
/// concurrent edits of the same entity converge. Removing copies the element
/// into the tombstone partition; a tombstoned key never becomes live again.
///
/// The set carries its own tag (e.g. `"ToDoItemPSet"`) which must match for
/// two sets to be merged.
///
/// # Example
///
/// ```
/// use solvent::{Mergeable, OrderValue, PSet, ToDoItem};
/// use uuid::Uuid;
///
/// let milk = ToDoItem::new(Uuid::from_u128(1), "Milk", OrderValue::with_timestamp(10.0, 1));
///
/// let mut s1 = PSet::new("items");
/// s1.add(milk.clone()).unwrap();
///
/// let mut s2 = s1.clone();
/// s2.remove(&milk);
///
/// // s1 never saw the removal, but the tombstone survives the merge.
/// let merged = s1.merge(&s2).unwrap();
/// assert!(!merged.contains(&milk.id));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PSet<T: Mergeable> {
    identifier: &'static str,
    live_set: BTreeMap<T::Id, T>,
    tombstone_set: BTreeMap<T::Id, T>,
}

impl<T: Mergeable> PSet<T> {
    /// Create an empty set with the given tag.
    #[must_use]
    pub fn new(identifier: &'static str) -> Self {
        Self {
            identifier,
            live_set: BTreeMap::new(),
            tombstone_set: BTreeMap::new(),
        }
    }

    /// Rebuild a set from its two partitions, e.g. after deserialization.
    ///
    /// Entries that share a key within one partition are merged.
    pub fn from_parts<L, D>(identifier: &'static str, live: L, tombstones: D) -> Result<Self>
    where
        L: IntoIterator<Item = T>,
        D: IntoIterator<Item = T>,
    {
        let mut set = Self::new(identifier);
        for item in live {
            merge_into(&mut set.live_set, item)?;
        }
        for item in tombstones {
            merge_into(&mut set.tombstone_set, item)?;
        }
        Ok(set)
    }

    /// Add an element, merging it with any existing entry under the same key.
    pub fn add(&mut self, item: T) -> Result<()> {
        merge_into(&mut self.live_set, item)
    }

    /// Tombstone an element.
    ///
    /// Does nothing when the element is not currently live.
    pub fn remove(&mut self, item: &T) {
        let key = item.identifier();
        if !self.contains(&key) {
            return;
        }
        self.tombstone_set.insert(key, item.clone());
    }

    /// The live elements: the live partition minus tombstoned keys.
    ///
    /// Computed on every call.
    #[must_use]
    pub fn live_view(&self) -> BTreeMap<T::Id, &T> {
        self.iter()
            .map(|item| (item.identifier(), item))
            .collect()
    }

    /// Iterate over the live elements in key order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.live_set
            .iter()
            .filter(|(key, _)| !self.tombstone_set.contains_key(key))
            .map(|(_, item)| item)
    }

    /// Look up a live element.
    #[must_use]
    pub fn get(&self, key: &T::Id) -> Option<&T> {
        if self.tombstone_set.contains_key(key) {
            return None;
        }
        self.live_set.get(key)
    }

    /// Look up a live element for in-place mutation.
    ///
    /// Only for edits that keep the element's identifier unchanged.
    pub fn get_mut(&mut self, key: &T::Id) -> Option<&mut T> {
        if self.tombstone_set.contains_key(key) {
            return None;
        }
        self.live_set.get_mut(key)
    }

    /// Check if a key is live.
    #[must_use]
    pub fn contains(&self, key: &T::Id) -> bool {
        self.get(key).is_some()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check if no element is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Raw live partition, including entries shadowed by a tombstone.
    #[must_use]
    pub fn live_set(&self) -> &BTreeMap<T::Id, T> {
        &self.live_set
    }

    /// Raw tombstone partition.
    #[must_use]
    pub fn tombstone_set(&self) -> &BTreeMap<T::Id, T> {
        &self.tombstone_set
    }
}

impl<T: Mergeable> Mergeable for PSet<T> {
    type Id = &'static str;

    fn identifier(&self) -> Self::Id {
        self.identifier
    }

    /// Merge both partitions independently, then let the live view apply
    /// tombstones. The first element-level failure aborts the whole merge.
    fn merge(&self, other: &Self) -> Result<Self> {
        ensure_same_identity(self, other)?;

        Ok(Self {
            identifier: self.identifier,
            live_set: merge_maps(&self.live_set, &other.live_set)?,
            tombstone_set: merge_maps(&self.tombstone_set, &other.tombstone_set)?,
        })
    }
}

fn merge_maps<T: Mergeable>(
    this: &BTreeMap<T::Id, T>,
    other: &BTreeMap<T::Id, T>,
) -> Result<BTreeMap<T::Id, T>> {
    let mut merged = this.clone();
    for item in other.values() {
        merge_into(&mut merged, item.clone())?;
    }
    Ok(merged)
}

fn merge_into<T: Mergeable>(map: &mut BTreeMap<T::Id, T>, item: T) -> Result<(), Error> {
    match map.entry(item.identifier()) {
        Entry::Vacant(slot) => {
            slot.insert(item);
        }
        Entry::Occupied(mut slot) => {
            let merged = slot.get().merge(&item)?;
            slot.insert(merged);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lww::OrderValue;
    use crate::ToDoItem;
    use uuid::Uuid;

    fn item(n: u128, title: &str) -> ToDoItem {
        ToDoItem::new(
            Uuid::from_u128(n),
            title,
            OrderValue::with_timestamp(n as f64 * 10.0, 1),
        )
    }

    #[test]
    fn new_set_is_empty() {
        let s = PSet::<ToDoItem>::new("items");
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s.identifier(), "items");
    }

    #[test]
    fn add_and_get() {
        let mut s = PSet::new("items");
        s.add(item(1, "Milk")).unwrap();
        assert!(s.contains(&Uuid::from_u128(1)));
        assert_eq!(s.get(&Uuid::from_u128(1)).unwrap().title, "Milk");
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn add_existing_key_merges() {
        let mut s = PSet::new("items");
        s.add(item(1, "Milk")).unwrap();

        let mut checked = item(1, "Milk");
        checked.checked = true;
        s.add(checked).unwrap();

        // Re-adding the unchecked version cannot undo the check.
        s.add(item(1, "Milk")).unwrap();
        assert!(s.get(&Uuid::from_u128(1)).unwrap().checked);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn remove_tombstones_live_element() {
        let mut s = PSet::new("items");
        let milk = item(1, "Milk");
        s.add(milk.clone()).unwrap();
        s.remove(&milk);

        assert!(!s.contains(&milk.id));
        assert!(s.is_empty());
        assert!(s.live_set().contains_key(&milk.id));
        assert!(s.tombstone_set().contains_key(&milk.id));
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut s = PSet::<ToDoItem>::new("items");
        s.remove(&item(1, "Milk"));
        assert!(s.tombstone_set().is_empty());
    }

    #[test]
    fn readd_after_remove_stays_removed() {
        let mut s = PSet::new("items");
        let milk = item(1, "Milk");
        s.add(milk.clone()).unwrap();
        s.remove(&milk);
        s.add(milk.clone()).unwrap();
        assert!(!s.contains(&milk.id));
    }

    #[test]
    fn live_view_excludes_tombstones() {
        let mut s = PSet::new("items");
        s.add(item(1, "Milk")).unwrap();
        s.add(item(2, "Eggs")).unwrap();
        s.remove(&item(1, "Milk"));

        let view = s.live_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[&Uuid::from_u128(2)].title, "Eggs");
    }

    #[test]
    fn merge_unions_both_partitions() {
        let mut s1 = PSet::new("items");
        s1.add(item(1, "Milk")).unwrap();
        s1.add(item(2, "Eggs")).unwrap();

        let mut s2 = PSet::new("items");
        s2.add(item(3, "Bread")).unwrap();
        s2.add(item(2, "Eggs")).unwrap();
        s2.remove(&item(2, "Eggs"));

        let merged = s1.merge(&s2).unwrap();
        let keys: Vec<_> = merged.live_view().into_keys().collect();
        assert_eq!(keys, vec![Uuid::from_u128(1), Uuid::from_u128(3)]);
    }

    #[test]
    fn tombstone_survives_when_live_entry_missing() {
        // s2 only knows the tombstone, e.g. after a partial sync.
        let milk = item(1, "Milk");
        let mut s1 = PSet::new("items");
        s1.add(milk.clone()).unwrap();

        let s2 = PSet::from_parts("items", Vec::new(), vec![milk.clone()]).unwrap();

        assert!(!s1.merge(&s2).unwrap().contains(&milk.id));
        assert!(!s2.merge(&s1).unwrap().contains(&milk.id));
    }

    #[test]
    fn merge_rejects_different_tags() {
        let s1 = PSet::<ToDoItem>::new("ToDoItemPSet");
        let s2 = PSet::<ToDoItem>::new("ToDoListPSet");
        let err = s1.merge(&s2).unwrap_err();
        assert!(matches!(err, Error::CannotBeMerged { .. }));
    }

    #[test]
    fn merge_does_not_touch_inputs() {
        let mut s1 = PSet::new("items");
        s1.add(item(1, "Milk")).unwrap();
        let mut s2 = PSet::new("items");
        s2.add(item(2, "Eggs")).unwrap();

        let before = (s1.clone(), s2.clone());
        let _ = s1.merge(&s2).unwrap();
        assert_eq!((s1, s2), before);
    }

    #[test]
    fn merge_is_idempotent_and_commutative() {
        let mut s1 = PSet::new("items");
        s1.add(item(1, "Milk")).unwrap();
        s1.remove(&item(1, "Milk"));
        let mut s2 = PSet::new("items");
        s2.add(item(2, "Eggs")).unwrap();

        assert_eq!(s1.merge(&s1).unwrap(), s1);
        assert_eq!(s1.merge(&s2).unwrap(), s2.merge(&s1).unwrap());
    }

    #[test]
    fn from_parts_merges_duplicates() {
        let mut checked = item(1, "Milk");
        checked.checked = true;
        let s = PSet::from_parts("items", vec![item(1, "Milk"), checked], Vec::new()).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.get(&Uuid::from_u128(1)).unwrap().checked);
    }
}
