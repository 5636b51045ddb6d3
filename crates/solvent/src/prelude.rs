//! Convenient re-exports for common usage.
//!
//! ```
//! use solvent::prelude::*;
//! ```

pub use crate::LastWriterWins;
pub use crate::Mergeable;
pub use crate::Notebook;
pub use crate::OrderValue;
pub use crate::PSet;
pub use crate::Title;
pub use crate::ToDoItem;
pub use crate::ToDoList;
