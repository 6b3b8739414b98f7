use crate::{client, common, error, write};

use serde::Serialize;
use serde_dynamo::to_item;

/// delete item request with its substitute error
#[derive(Debug)]
struct DeleteItemOperation {
    condition_error: Option<error::BoxError>,
    request: client::DeleteItemRequest,
}

/// Delete item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_compose::{common, write};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let keys = common::key::Keys::new(common::key::Key::new("id", "1"));
/// write::delete_item::DeleteItem::new("users", keys)
///     .condition_expression("attribute_exists(id)")
///     .condition_error("user not found")
///     .send(client)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeleteItem<K> {
    /// The primary key of the item to delete.
    pub keys: K,
    /// Additional write operation arguments (table name, condition, substitute error).
    pub write_args: write::common::WriteArgs,
}

impl<K: Serialize> TryFrom<DeleteItem<K>> for DeleteItemOperation {
    type Error = error::Error;

    fn try_from(delete_item: DeleteItem<K>) -> error::Result<Self> {
        let key = to_item(delete_item.keys).map_err(error::Error::MarshalKey)?;
        let (write_input, condition_error) = delete_item
            .write_args
            .into_input(common::MergedExpressions::default())?;
        let operation = Self {
            condition_error,
            request: client::DeleteItemRequest { key, write_input },
        };
        Ok(operation)
    }
}

impl<K: Serialize> DeleteItem<K> {
    /// Creates a delete of the item identified by `keys` from `table_name`.
    pub fn new(table_name: impl Into<String>, keys: K) -> Self {
        Self {
            keys,
            write_args: write::common::WriteArgs::new(table_name),
        }
    }

    crate::write_args_setters!();

    /// Execute the delete item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.delete_item",
            skip_all,
            fields(table_name = %self.write_args.table_name),
            err
        )
    )]
    pub async fn send<S: client::Store + ?Sized>(self, store: &S) -> error::Result<()> {
        let delete_item: DeleteItemOperation = self.try_into()?;
        let result = store.delete_item(delete_item.request).await;
        write::common::check_condition(result, delete_item.condition_error)
    }
}
