//! Read operations.
//!
//! - Getting a single item by primary key
//! - Querying the table or a secondary index by partition key

/// Common arguments for read operations.
pub mod common;

/// Get item operation.
pub mod get_item;

/// Query operation.
pub mod query;
