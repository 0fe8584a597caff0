//! Core engine for the order board.
//!
//! This crate ties the store, the backend transport and the polling loop
//! into one engine: a poller drives fetch-reconcile cycles on a fixed
//! interval, a transition controller issues status changes and folds the
//! authoritative responses back into the store, and every change is
//! published to the display layer as a sorted, truncated view snapshot.

pub mod controller;
pub mod engine;
pub mod pagination;
pub mod poller;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::{TransitionController, TransitionError, TransitionScope};
pub use engine::BoardEngine;
pub use pagination::PageWindow;
pub use poller::{Poller, PollerCommand};
pub use view::ViewPublisher;
