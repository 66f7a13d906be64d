//! Chapel Forms - schema-driven donation and registration forms
//!
//! This crate holds everything the form builder and the public form
//! renderer agree on:
//! - Field descriptors and the persisted form document
//! - Conditional visibility (`name OP literal` expressions)
//! - Price aggregation across priced field types
//! - A render session that ties values, visibility and totals together
//! - The builder's schema store for a single editing session

#![warn(clippy::all)]

pub mod builder;
pub mod error;
pub mod js;
pub mod money;
pub mod persist;
pub mod pricing;
pub mod schema;
pub mod session;
pub mod visibility;

pub use builder::SchemaStore;
pub use error::{FormsError, Result};
pub use persist::{export_form, import_form, PersistedForm};
pub use pricing::{compute_total, has_pricing, line_items, weekday_price, LineItem};
pub use schema::{
    DateMode, DatePricing, FieldDescriptor, FieldKind, FieldOption, FieldWidth, FormMeta,
    FormSchema, FormValues,
};
pub use session::{FormPreview, FormSession, FormSubmission, PreviewField};
pub use visibility::{is_visible, Literal, Operator, VisibilityExpr};
