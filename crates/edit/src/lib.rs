//! Cross-store edit/save coordinator.
//!
//! The [`EditCoordinator`] is the view layer's entry point for committing
//! accumulated edits: it summarizes every modified entity across all stores
//! ([`EditCoordinator::change_lists`]), and saves a selection of them
//! ([`EditCoordinator::save`]) by opening one remote write transaction per
//! entity, replaying that entity's recorded actions against it, and
//! finalizing. Pending transaction handles are persisted to durable local
//! storage so an in-progress save survives a process restart.

/// The coordinator and its summary/report types.
pub mod coordinator;
/// Save error types.
pub mod error;

pub use coordinator::{EditCoordinator, SaveReport, StoreChangeList};
pub use error::SaveError;

#[cfg(test)]
mod tests;
