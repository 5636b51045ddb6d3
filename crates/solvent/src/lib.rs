//! # solvent
//!
//! Replicated to-do notebooks for local-first applications.
//!
//! Every replica owns its own tree of [`Notebook`] → [`ToDoList`] →
//! [`ToDoItem`] and edits it offline. Two replicas of the same entity are
//! reconciled with [`Mergeable::merge`], which always converges to the same
//! result no matter in which order replicas meet.
//!
//! ## Quick Start
//!
//! ```
//! use solvent::prelude::*;
//!
//! let mut list = ToDoList::new("Groceries").unwrap();
//! let mut other = list.clone();
//!
//! list.add_item("Tea").unwrap();
//! other.rename("Shopping");
//!
//! let merged = list.merge(&other).unwrap();
//! assert_eq!(merged.title().value, "Shopping");
//! assert_eq!(merged.get_items().len(), 1);
//! ```
//!
//! ## Building blocks
//!
//! - [`PSet`] - observed-remove set with permanent tombstones, reused at
//!   every level of the tree
//! - [`OrderValue`], [`Title`] - last-writer-wins registers
//! - [`ToDoItem`] - a task; `checked` only ever flips to `true` when merged
//! - [`ToDoList`] - titled list with fractional-index ordering
//! - [`Notebook`] - a set of lists, the usual merge root
//!
//! ## Wire format
//!
//! With the `serde` feature, [`dto`] provides the flat JSON shape used for
//! storage and transport.

#![warn(missing_docs)]

mod error;
mod item;
mod list;
mod lww;
mod mergeable;
mod notebook;
mod pset;

pub mod clock;
#[cfg(feature = "serde")]
pub mod dto;
pub mod prelude;

pub use error::{Error, Result};
pub use item::ToDoItem;
pub use list::{ToDoList, ITEM_SET_TAG, ORDER_STEP};
pub use lww::{LastWriterWins, OrderValue, Title};
pub use mergeable::Mergeable;
pub use notebook::{Notebook, LIST_SET_TAG};
pub use pset::PSet;
