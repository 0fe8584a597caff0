//! Common types module for the order board engine.
//!
//! This module defines the core data types and structures shared by the
//! board components. It provides a centralized location for domain types
//! to ensure consistency between the store, the transport and the engine.

/// Read-side aggregation of legal next actions for an order.
pub mod actions;
/// API types for the backend query endpoint and the published view.
pub mod api;
/// Order domain types: records, items, statuses and patches.
pub mod order;

// Re-export all types for convenient access
pub use actions::*;
pub use api::*;
pub use order::*;
