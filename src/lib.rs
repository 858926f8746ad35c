//! Context Bridge - surfaces prior team knowledge for an editor selection
//!
//! A selection flows through a four-state pipeline:
//! - Trigger: selection stamped into intent metadata
//! - Retrieval: catalog records scored on keyword overlap + recency, top 3 kept
//! - Display: result cached per session and handed to the display surface
//! - back to Idle

pub mod types;
pub mod bridge;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod extractor;
pub mod messages;
pub mod ranking;
pub mod scoring;
pub mod server;
pub mod state_machine;

pub use types::*;
pub use bridge::SelectionBridge;
pub use catalog::{
    find_duplicates, CatalogSource, DuplicateReport, EmptyCatalog, JsonFileCatalog, StaticCatalog,
};
pub use error::CatalogError;
pub use messages::{DisplayMessage, HostEvent, SelectionEvent};
pub use state_machine::SessionStateMachine;

#[cfg(test)]
mod tests;
