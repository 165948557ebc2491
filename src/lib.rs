//! Headless, renderer-agnostic engine for a hierarchical, dynamically-schemed,
//! incrementally-loaded data grid.
//!
//! A server-described column hierarchy (milestones → tasks → deliverables →
//! properties) compiles into a column tree whose leaves carry unique binding
//! keys; nested row data flattens into records indexed by those same keys;
//! a paginated store owns the rows, grouping, and edit accounting; and small
//! controllers cover scroll-driven loading, cell-kind dispatch with editor
//! sessions, group-row actions, and cell validation. Rendering, transport,
//! and application state stay on the host side of the trait seams in
//! [`ops::store`].

pub mod model;
pub mod ops;
pub mod schema;
