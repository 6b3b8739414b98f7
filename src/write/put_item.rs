use crate::{client, common, error, write};

use serde::Serialize;
use serde_dynamo::to_item;

/// put item request with its substitute error
#[derive(Debug)]
struct PutItemOperation {
    condition_error: Option<error::BoxError>,
    request: client::PutItemRequest,
}

/// Put item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_compose::write;
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// write::put_item::PutItem::new("scores", json!({"GameTitle": "Alien Adventure", "UserId": "User-5"}))
///     .condition_expression("attribute_not_exists(GameTitle)")
///     .condition_error("score already recorded")
///     .send(client)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PutItem<T> {
    /// The item to put into the table.
    pub item: T,
    /// Additional write operation arguments (table name, condition, substitute error).
    pub write_args: write::common::WriteArgs,
}

impl<T: Serialize> TryFrom<PutItem<T>> for PutItemOperation {
    type Error = error::Error;

    fn try_from(put_item: PutItem<T>) -> error::Result<Self> {
        let item = to_item(put_item.item).map_err(error::Error::MarshalItem)?;
        let (write_input, condition_error) = put_item
            .write_args
            .into_input(common::MergedExpressions::default())?;
        let operation = Self {
            condition_error,
            request: client::PutItemRequest { item, write_input },
        };
        Ok(operation)
    }
}

impl<T: Serialize> PutItem<T> {
    /// Creates a put of `item` into `table_name`.
    pub fn new(table_name: impl Into<String>, item: T) -> Self {
        Self {
            item,
            write_args: write::common::WriteArgs::new(table_name),
        }
    }

    crate::write_args_setters!();

    /// Execute the put item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.put_item",
            skip_all,
            fields(table_name = %self.write_args.table_name),
            err
        )
    )]
    pub async fn send<S: client::Store + ?Sized>(self, store: &S) -> error::Result<()> {
        let put_item: PutItemOperation = self.try_into()?;
        let result = store.put_item(put_item.request).await;
        write::common::check_condition(result, put_item.condition_error)
    }
}
