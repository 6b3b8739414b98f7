use crate::{client, common, error};

use aws_sdk_dynamodb::types;
use serde::de::DeserializeOwned;
use serde_dynamo::from_item;
use std::{collections, future};

/// Single-item read fields ready to be sent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SingleReadInput {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Attribute name placeholders of the projection.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// The resolved projection expression.
    pub projection_expression: Option<String>,
    /// The name of the table to read from.
    pub table_name: String,
}

/// Arguments for single-item read operations (GetItem).
#[derive(Debug, Default)]
pub struct SingleReadArgs {
    /// Whether to use a consistent read.
    ///
    /// `true` for strongly consistent reads, `false` or `None` for eventually consistent reads.
    pub consistent_read: Option<bool>,
    /// Name placeholders set directly on the request.
    ///
    /// GetItem carries no value placeholders; values added here are not sent.
    pub expression_holder: common::ExpressionHolder,
    /// Which attributes to retrieve (projection expression).
    ///
    /// If `None`, all attributes are retrieved.
    pub projection: Option<common::expression::Expression>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl SingleReadArgs {
    /// Creates arguments for the given table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }
}

impl TryFrom<SingleReadArgs> for SingleReadInput {
    type Error = error::Error;

    fn try_from(single_read_args: SingleReadArgs) -> error::Result<Self> {
        let mut merged = common::MergedExpressions::default();
        let projection_expression = merged.resolve(
            single_read_args.projection,
            error::ExpressionRole::Projection,
        )?;
        merged.apply(single_read_args.expression_holder)?;
        let operation = Self {
            consistent_read: single_read_args.consistent_read,
            expression_attribute_names: merged.expression_attribute_names,
            projection_expression,
            table_name: single_read_args.table_name,
        };
        Ok(operation)
    }
}

/// Multiple-item read fields ready to be sent, shared by every page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipleReadInput {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Attribute name placeholders of every expression slot.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Attribute value placeholders of every expression slot.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// The resolved filter expression.
    pub filter_expression: Option<String>,
    /// The index to read instead of the base table.
    pub index_name: Option<String>,
    /// The maximum number of items to evaluate per page.
    pub limit: Option<i32>,
    /// The resolved projection expression.
    pub projection_expression: Option<String>,
    /// Which attributes to return.
    pub select: Option<types::Select>,
    /// The name of the table to read from.
    pub table_name: String,
}

/// Arguments for multiple-item read operations (Query, Scan).
#[derive(Debug, Default)]
pub struct MultipleReadArgs {
    /// Whether to use a consistent read.
    ///
    /// `true` for strongly consistent reads, `false` or `None` for eventually consistent reads.
    pub consistent_read: Option<bool>,
    /// The exclusive start key of the first page.
    ///
    /// Used to continue a previous Query or Scan operation from where it left off.
    pub exclusive_start_key: Option<client::Item>,
    /// Placeholders set directly on the request.
    pub expression_holder: common::ExpressionHolder,
    /// Filter applied to the results.
    pub filter: Option<common::expression::Expression>,
    /// The name of a global secondary index or local secondary index to read.
    pub index_name: Option<String>,
    /// The maximum number of items to evaluate per page (not necessarily the number of matching items).
    pub limit: Option<i32>,
    /// The maximum number of pages to fetch.
    ///
    /// `0` fetches a single page: reading further pages is opt-in.
    pub max_pages: usize,
    /// Which attributes to retrieve (projection expression).
    pub projection: Option<common::expression::Expression>,
    /// Which attributes to return.
    ///
    /// Use `Select::Count` to only count matching items.
    pub select: Option<types::Select>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl MultipleReadArgs {
    /// Creates arguments for the given table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Resolves projection and filter on top of the slots already in `merged`.
    pub(crate) fn into_input(
        self,
        mut merged: common::MergedExpressions,
    ) -> error::Result<(MultipleReadInput, Paging)> {
        let projection_expression =
            merged.resolve(self.projection, error::ExpressionRole::Projection)?;
        let filter_expression = merged.resolve(self.filter, error::ExpressionRole::Filter)?;
        merged.apply(self.expression_holder)?;
        let multiple_read_input = MultipleReadInput {
            consistent_read: self.consistent_read,
            expression_attribute_names: merged.expression_attribute_names,
            expression_attribute_values: merged.expression_attribute_values,
            filter_expression,
            index_name: self.index_name,
            limit: self.limit,
            projection_expression,
            select: self.select,
            table_name: self.table_name,
        };
        let paging = Paging {
            exclusive_start_key: self.exclusive_start_key,
            max_pages: self.max_pages,
        };
        Ok((multiple_read_input, paging))
    }
}

/// Where pagination starts and how far it may go.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Paging {
    pub(crate) exclusive_start_key: Option<client::Item>,
    pub(crate) max_pages: usize,
}

/// Fetches pages until the cursor runs out or `max_pages` is reached.
///
/// Items of every page are decoded into `items` when given. Returns the sum of
/// the counts reported by the remote side, which differs from the number of
/// decoded items for count-only reads.
pub(crate) async fn paginate<O, F, Fut>(
    paging: Paging,
    mut items: Option<&mut Vec<O>>,
    mut fetch_page: F,
) -> error::Result<i64>
where
    O: DeserializeOwned,
    F: FnMut(Option<client::Item>) -> Fut,
    Fut: future::Future<Output = Result<client::Page, client::StoreError>>,
{
    let max_pages = paging.max_pages.max(1);
    let mut exclusive_start_key = paging.exclusive_start_key;
    let mut pages = 0;
    let mut count = 0;
    loop {
        let page = fetch_page(exclusive_start_key.take())
            .await
            .map_err(error::Error::Request)?;
        pages += 1;
        count += i64::from(page.count);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            page = pages,
            count = page.count,
            has_more = page.last_evaluated_key.is_some(),
            "fetched page"
        );
        if let (Some(items), Some(page_items)) = (items.as_deref_mut(), page.items) {
            let decoded = page_items
                .into_iter()
                .map(|item| from_item(item))
                .collect::<Result<Vec<O>, _>>()
                .map_err(error::Error::UnmarshalItems)?;
            items.extend(decoded);
        }
        match page.last_evaluated_key {
            Some(last_evaluated_key) if pages < max_pages => {
                exclusive_start_key = Some(last_evaluated_key);
            }
            _ => return Ok(count),
        }
    }
}

/// apply common single read settings to an sdk builder
#[macro_export]
macro_rules! apply_single_read_input {
    ($builder:expr, $single_read_input:expr) => {
        $builder
            .set_consistent_read($single_read_input.consistent_read)
            .set_expression_attribute_names($single_read_input.expression_attribute_names)
            .set_projection_expression($single_read_input.projection_expression)
            .table_name($single_read_input.table_name)
    };
}

/// apply common multiple read settings to an sdk builder
#[macro_export]
macro_rules! apply_multiple_read_input {
    ($builder:expr, $multiple_read_input:expr) => {
        $builder
            .set_consistent_read($multiple_read_input.consistent_read)
            .set_expression_attribute_names($multiple_read_input.expression_attribute_names)
            .set_expression_attribute_values($multiple_read_input.expression_attribute_values)
            .set_filter_expression($multiple_read_input.filter_expression)
            .set_index_name($multiple_read_input.index_name)
            .set_limit($multiple_read_input.limit)
            .set_projection_expression($multiple_read_input.projection_expression)
            .set_select($multiple_read_input.select)
            .table_name($multiple_read_input.table_name)
    };
}

/// fluent setters for composers carrying `multiple_read_args`
#[macro_export]
macro_rules! multiple_read_args_setters {
    () => {
        /// Sets whether to use a strongly consistent read.
        pub fn consistent_read(mut self, consistent_read: bool) -> Self {
            self.multiple_read_args.consistent_read = Some(consistent_read);
            self
        }

        /// Starts reading after the given key.
        pub fn exclusive_start_key(mut self, exclusive_start_key: $crate::client::Item) -> Self {
            self.multiple_read_args.exclusive_start_key = Some(exclusive_start_key);
            self
        }

        /// Attaches the filter expression builder.
        pub fn filter(mut self, filter: $crate::common::expression::Expression) -> Self {
            self.multiple_read_args.filter = Some(filter);
            self
        }

        /// Attaches a filter expression without placeholders of its own.
        pub fn filter_expression(mut self, filter: impl Into<String>) -> Self {
            self.multiple_read_args.filter = Some($crate::common::expression::Expression::new(filter));
            self
        }

        /// Reads a secondary index instead of the base table.
        pub fn index_name(mut self, index_name: impl Into<String>) -> Self {
            self.multiple_read_args.index_name = Some(index_name.into());
            self
        }

        /// Sets the maximum number of items evaluated per page.
        pub fn limit(mut self, limit: i32) -> Self {
            self.multiple_read_args.limit = Some(limit);
            self
        }

        /// Sets the maximum number of pages to fetch.
        pub fn max_pages(mut self, max_pages: usize) -> Self {
            self.multiple_read_args.max_pages = max_pages;
            self
        }

        /// Attaches the projection expression builder.
        pub fn projection(mut self, projection: $crate::common::expression::Expression) -> Self {
            self.multiple_read_args.projection = Some(projection);
            self
        }

        /// Attaches a projection expression without placeholders of its own.
        pub fn projection_expression(mut self, projection: impl Into<String>) -> Self {
            self.multiple_read_args.projection =
                Some($crate::common::expression::Expression::new(projection));
            self
        }

        /// Sets which attributes to return.
        pub fn select(mut self, select: aws_sdk_dynamodb::types::Select) -> Self {
            self.multiple_read_args.select = Some(select);
            self
        }

        /// Aliases an attribute name directly on the request.
        pub fn name(mut self, placeholder: &str, name: impl Into<String>) -> Self {
            self.multiple_read_args
                .expression_holder
                .add_name(placeholder, name);
            self
        }

        /// Aliases an attribute value directly on the request.
        pub fn value<V: serde::Serialize>(mut self, placeholder: &str, value: V) -> Self {
            self.multiple_read_args
                .expression_holder
                .add_value(placeholder, value);
            self
        }
    };
}
