use crate::{client, common, error, read};

use serde::de::{DeserializeOwned, IgnoredAny};

/// query request with where its pagination starts
#[derive(Debug)]
struct QueryOperation {
    paging: read::common::Paging,
    request: client::QueryRequest,
}

/// Query operation.
///
/// Reads a single page unless [`Query::max_pages`] allows more. The key
/// condition is resolved first, then the projection and the filter, each seeing
/// the placeholders of the slots before it.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_compose::{common, read};
/// use serde_json::Value;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let mut scores: Vec<Value> = Vec::new();
/// let count = read::query::Query::new("scores", "#title = :title")
///     .name("title", "GameTitle")
///     .value("title", "Alien Adventure")
///     .filter(common::expression::exp("TopScore > :min").value("min", 100))
///     .max_pages(5)
///     .send(client, &mut scores)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Query {
    /// The key condition expression builder.
    pub key_condition: common::expression::Expression,
    /// Additional read operation arguments (table name, projection, filter, paging).
    pub multiple_read_args: read::common::MultipleReadArgs,
    /// Whether to traverse the index in ascending sort key order.
    ///
    /// `false` reads in descending order, `None` uses the service default (ascending).
    pub scan_index_forward: Option<bool>,
}

impl TryFrom<Query> for QueryOperation {
    type Error = error::Error;

    fn try_from(query: Query) -> error::Result<Self> {
        let mut merged = common::MergedExpressions::default();
        let key_condition_expression = merged
            .resolve(Some(query.key_condition), error::ExpressionRole::KeyCondition)?
            .unwrap_or_default();
        let (multiple_read_input, paging) = query.multiple_read_args.into_input(merged)?;
        let operation = Self {
            paging,
            request: client::QueryRequest {
                key_condition_expression,
                multiple_read_input,
                scan_index_forward: query.scan_index_forward,
            },
        };
        Ok(operation)
    }
}

impl Query {
    /// Creates a query of `table_name` with a key condition without placeholders of its own.
    pub fn new(table_name: impl Into<String>, key_condition: impl Into<String>) -> Self {
        Self {
            key_condition: common::expression::Expression::new(key_condition),
            multiple_read_args: read::common::MultipleReadArgs::new(table_name),
            scan_index_forward: None,
        }
    }

    /// Replaces the key condition with an expression builder.
    pub fn key_condition(mut self, key_condition: common::expression::Expression) -> Self {
        self.key_condition = key_condition;
        self
    }

    /// Sets whether to traverse the index in ascending sort key order.
    pub fn scan_index_forward(mut self, scan_index_forward: bool) -> Self {
        self.scan_index_forward = Some(scan_index_forward);
        self
    }

    crate::multiple_read_args_setters!();

    /// Execute the query operation, appending decoded items to `items`.
    ///
    /// Returns the number of matching items reported across the fetched pages.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.query",
            skip_all,
            fields(table_name = %self.multiple_read_args.table_name),
            err
        )
    )]
    pub async fn send<O, S>(self, store: &S, items: &mut Vec<O>) -> error::Result<i64>
    where
        O: DeserializeOwned,
        S: client::Store + ?Sized,
    {
        let query: QueryOperation = self.try_into()?;
        let request = &query.request;
        read::common::paginate(query.paging, Some(items), move |exclusive_start_key| {
            store.query_page(request, exclusive_start_key)
        })
        .await
    }

    /// Execute the query operation without decoding items.
    ///
    /// Pair with `select(Select::Count)` to have only counts returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.query_count",
            skip_all,
            fields(table_name = %self.multiple_read_args.table_name),
            err
        )
    )]
    pub async fn count<S: client::Store + ?Sized>(self, store: &S) -> error::Result<i64> {
        let query: QueryOperation = self.try_into()?;
        let request = &query.request;
        read::common::paginate::<IgnoredAny, _, _>(query.paging, None, move |exclusive_start_key| {
            store.query_page(request, exclusive_start_key)
        })
        .await
    }
}
