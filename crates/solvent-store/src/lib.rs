//! # solvent-store
//!
//! Persistence for [`solvent`] notebooks.
//!
//! Repositories store whole notebooks keyed by id; the [`NotebookService`]
//! sits on top and merges incoming replicas into the stored state before
//! writing, so no update ever overwrites another.
//!
//! ## Quick Start
//!
//! ```
//! use solvent_store::{MemoryRepository, NotebookService};
//!
//! let service = NotebookService::new(MemoryRepository::new());
//! let notebook = service.create().unwrap();
//!
//! let mut replica = notebook.clone();
//! replica.add_list("Groceries").unwrap();
//!
//! let merged = service.update(&replica).unwrap();
//! assert_eq!(merged.get_lists().len(), 1);
//! ```
//!
//! ## Backends
//!
//! | Backend | Feature flag | Use case |
//! |---------|-------------|----------|
//! | [`MemoryRepository`] | *(always available)* | Testing, throwaway servers |
//! | `SqliteRepository` | `sqlite` | Desktop, CLI, single-node servers |

mod error;
mod memory;
mod service;
#[cfg(feature = "sqlite")]
mod sqlite;
mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryRepository;
pub use service::NotebookService;
#[cfg(feature = "sqlite")]
pub use sqlite::{JournalMode, SqliteConfig, SqliteRepository};
pub use traits::NotebookRepository;
