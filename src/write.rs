//! Write operations for modifying data in DynamoDB tables.
//!
//! This module provides operations for writing data to DynamoDB:
//! - Putting new items or replacing existing ones
//! - Updating items with an update expression
//! - Deleting items by primary key
//!
//! Every write can carry a condition and an error to return in place of a
//! failed conditional check.

/// Common utilities and types for write operations.
pub mod common;

/// Delete item operation for removing items from tables.
pub mod delete_item;

/// Put item operation for creating or replacing items.
pub mod put_item;

/// Update item operation for modifying existing items.
pub mod update_item;
