use uuid::Uuid;

use crate::clock;
use crate::error::{Error, Result};
use crate::list::ToDoList;
use crate::mergeable::{ensure_same_identity, Mergeable};
use crate::pset::PSet;

/// Tag of the list set owned by every notebook.
pub const LIST_SET_TAG: &str = "ToDoListPSet";

/// The root of a replicated tree: a set of [`ToDoList`]s.
///
/// # Example
///
/// ```
/// use solvent::{Mergeable, Notebook};
///
/// let mut phone = Notebook::new().unwrap();
/// let mut laptop = phone.clone();
///
/// phone.add_list("Groceries").unwrap();
/// laptop.add_list("Chores").unwrap();
///
/// let merged = phone.merge(&laptop).unwrap();
/// assert_eq!(merged.get_lists().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Notebook {
    id: Uuid,
    to_do_lists: PSet<ToDoList>,
    created_at: i64,
}

impl Notebook {
    /// Create an empty notebook with a fresh identifier.
    pub fn new() -> Result<Self> {
        Ok(Self {
            id: clock::random_id()?,
            to_do_lists: PSet::new(LIST_SET_TAG),
            created_at: clock::now(),
        })
    }

    /// Reassemble a notebook from stored parts.
    #[must_use]
    pub fn from_parts(id: Uuid, to_do_lists: PSet<ToDoList>, created_at: i64) -> Self {
        Self {
            id,
            to_do_lists,
            created_at,
        }
    }

    /// Identity of the notebook.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The underlying list set, tombstones included.
    #[must_use]
    pub fn lists(&self) -> &PSet<ToDoList> {
        &self.to_do_lists
    }

    /// Creation time in UTC nanoseconds.
    #[must_use]
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Create a new list and add it to the notebook.
    pub fn add_list(&mut self, title: impl Into<String>) -> Result<&mut ToDoList> {
        let list = ToDoList::new(title)?;
        let id = list.id();
        self.to_do_lists.add(list)?;
        self.get_list_mut(id)
    }

    /// Tombstone a list. Unknown ids are ignored.
    pub fn remove_list(&mut self, id: Uuid) {
        if let Some(list) = self.to_do_lists.get(&id).cloned() {
            self.to_do_lists.remove(&list);
        }
    }

    /// Fetch a live list.
    pub fn get_list(&self, id: Uuid) -> Result<&ToDoList> {
        self.to_do_lists.get(&id).ok_or_else(|| Error::not_found(id))
    }

    /// Fetch a live list for local edits.
    pub fn get_list_mut(&mut self, id: Uuid) -> Result<&mut ToDoList> {
        self.to_do_lists
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(id))
    }

    /// All live lists, in no particular order.
    #[must_use]
    pub fn get_lists(&self) -> Vec<&ToDoList> {
        self.to_do_lists.iter().collect()
    }

    /// Merge an externally edited copy of a list back into the notebook.
    ///
    /// A list this notebook has never seen is added; a tombstoned one stays
    /// removed.
    pub fn update_list(&mut self, list: ToDoList) -> Result<()> {
        self.to_do_lists.add(list)
    }
}

impl Mergeable for Notebook {
    type Id = Uuid;

    fn identifier(&self) -> Uuid {
        self.id
    }

    fn merge(&self, other: &Self) -> Result<Self> {
        ensure_same_identity(self, other)?;

        Ok(Self {
            id: self.id,
            to_do_lists: self.to_do_lists.merge(&other.to_do_lists)?,
            created_at: self.created_at,
        })
    }
}
