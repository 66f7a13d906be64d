//! Chapel Admin - dashboard core
//!
//! State containers and REST plumbing behind the church admin dashboard:
//! - `ApiClient` and typed resources (bulletins, services, finance,
//!   notifications, dashboard pages, forms, page components, pages)
//! - `EditDialog` for the permission-gated create/edit/delete flow
//! - `ReorderableList` for optimistic drag reordering with rollback
//! - Pagination, date-range filters and a debouncer for search and autosave
//! - Configuration and logging setup

#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod debounce;
pub mod dialog;
pub mod error;
pub mod filters;
pub mod logging;
pub mod pagination;
pub mod reorder;
pub mod resources;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;
pub use config::AdminConfig;
pub use debounce::Debouncer;
pub use dialog::{ApiPermissionChecker, DialogMode, DialogState, EditDialog, PermissionChecker};
pub use error::{AdminError, Result};
pub use filters::DateRangeFilter;
pub use pagination::{Page, Pagination};
pub use reorder::{Ordered, PendingReorder, ReorderableList};
pub use resources::{Draft, Resource};
