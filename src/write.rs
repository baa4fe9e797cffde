//! Write operations.
//!
//! - Putting an item, optionally guarded by a condition
//! - Deleting an item by primary key, optionally guarded by a condition

/// Common arguments for write operations.
pub mod common;

/// Delete item operation.
pub mod delete_item;

/// Put item operation.
pub mod put_item;
