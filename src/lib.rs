#![deny(missing_docs)]

//! # DynamoDB Compose
//!
//! Builder-style request composition for Amazon DynamoDB.
//!
//! ## Overview
//!
//! DynamoDB expressions refer to attribute names and values through `#name`
//! and `:value` placeholders that travel next to the expression. This library:
//! - Lets every expression carry its own placeholders, with or without sigils
//! - Serializes placeholder values eagerly and reports the first failure when
//!   the request is composed
//! - Merges the placeholders of every expression slot of a request into the
//!   single set the wire format allows
//! - Caps Query and Scan pagination, reading one page unless told otherwise
//! - Substitutes caller errors for failed conditional checks and missing items
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_compose::{common, write};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::from_conf(aws_sdk_dynamodb::config::Config::builder().build());
//! let keys = common::key::Keys::new(common::key::Key::new("id", "1"));
//! write::update_item::UpdateItem::new("users", keys)
//!     .update(
//!         common::expression::exp("SET #name = :name, #age = #age + :one")
//!             .name("name", "name")
//!             .name("age", "age")
//!             .value("name", "Jane")
//!             .value("one", 1),
//!     )
//!     .condition(common::expression::exp("attribute_exists(#name)"))
//!     .condition_error("user not found")
//!     .send(&client)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Requests are sent through any [`client::Store`]; the SDK [`Client`](aws_sdk_dynamodb::Client)
//! implements it.
//!
//! ## Modules
//!
//! - [`mod@client`] - The remote store capability and its errors
//! - [`mod@common`] - Expressions, placeholders and keys
//! - [`mod@error`] - Errors returned by composed requests
//! - [`mod@read`] - Read operations (GetItem, Query, Scan)
//! - [`mod@write`] - Write operations (PutItem, UpdateItem, DeleteItem)

pub mod client;

/// Common utilities for expressions, placeholders and keys.
pub mod common;

pub mod error;

/// Read operations for retrieving data from DynamoDB tables.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying items with key conditions
/// - Scanning entire tables
pub mod read;

/// Write operations for modifying data in DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Updating items with an update expression
/// - Deleting items by key
pub mod write;

pub use error::{BoxError, Error, Result};
