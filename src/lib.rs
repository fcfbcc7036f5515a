/// Tab Organizer - Chrome Extension for sorting and grouping tabs
/// Built with Rust + WASM

pub mod backend;
pub mod category;
pub mod classifier;
pub mod collation;
pub mod directory;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod organize;
pub mod settings;
pub mod snapshot;
pub mod sort;
pub mod tab_data;
pub mod timer;
pub mod undo;

#[cfg(target_arch = "wasm32")]
pub mod bridge;
#[cfg(target_arch = "wasm32")]
mod handlers;

pub use error::{BackendError, OrganizeError, StorageError, TabError};
pub use organize::{OrganizeEngine, OrganizeReport, OrganizeRequest};
pub use snapshot::SnapshotStore;
pub use sort::{SortEngine, SortKey};
pub use undo::{RestoreOutcome, UndoController};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}
