use crate::{client, common, error, read};

use serde::{Serialize, de::DeserializeOwned};
use serde_dynamo::{from_item, to_item};

/// get item request with its absent item error
#[derive(Debug)]
struct GetItemOperation {
    item_absent_error: Option<error::BoxError>,
    request: client::GetItemRequest,
}

/// Get item operation.
///
/// Only a projection can be attached: GetItem carries attribute name
/// placeholders but no value placeholders.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_compose::{common, read};
/// use serde_json::Value;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let keys = common::key::Keys::new(common::key::Key::new("id", "1"));
/// let user: Option<Value> = read::get_item::GetItem::new("users", keys)
///     .projection(common::expression::exp("#name, email").name("name", "name"))
///     .consistent_read(true)
///     .send(client)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GetItem<K> {
    /// Error returned when no item matches the key.
    ///
    /// If `None`, a missing item yields `Ok(None)`.
    pub item_absent_error: Option<error::BoxError>,
    /// The primary key of the item to retrieve.
    pub keys: K,
    /// Additional read operation arguments (table name, consistent read, projection).
    pub single_read_args: read::common::SingleReadArgs,
}

impl<K: Serialize> TryFrom<GetItem<K>> for GetItemOperation {
    type Error = error::Error;

    fn try_from(get_item: GetItem<K>) -> error::Result<Self> {
        let key = to_item(get_item.keys).map_err(error::Error::MarshalKey)?;
        let single_read_input = get_item.single_read_args.try_into()?;
        let operation = Self {
            item_absent_error: get_item.item_absent_error,
            request: client::GetItemRequest {
                key,
                single_read_input,
            },
        };
        Ok(operation)
    }
}

impl<K: Serialize> GetItem<K> {
    /// Creates a read of the item identified by `keys` in `table_name`.
    pub fn new(table_name: impl Into<String>, keys: K) -> Self {
        Self {
            item_absent_error: None,
            keys,
            single_read_args: read::common::SingleReadArgs::new(table_name),
        }
    }

    /// Sets whether to use a strongly consistent read.
    pub fn consistent_read(mut self, consistent_read: bool) -> Self {
        self.single_read_args.consistent_read = Some(consistent_read);
        self
    }

    /// Returns `item_absent_error` when no item matches the key.
    pub fn item_absent_error(mut self, item_absent_error: impl Into<error::BoxError>) -> Self {
        self.item_absent_error = Some(item_absent_error.into());
        self
    }

    /// Attaches the projection expression builder.
    pub fn projection(mut self, projection: common::expression::Expression) -> Self {
        self.single_read_args.projection = Some(projection);
        self
    }

    /// Attaches a projection expression without placeholders of its own.
    pub fn projection_expression(mut self, projection: impl Into<String>) -> Self {
        self.single_read_args.projection = Some(common::expression::Expression::new(projection));
        self
    }

    /// Aliases an attribute name directly on the request.
    pub fn name(mut self, placeholder: &str, name: impl Into<String>) -> Self {
        self.single_read_args
            .expression_holder
            .add_name(placeholder, name);
        self
    }

    /// Execute the get item operation.
    ///
    /// Decodes the item into `O` when found.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.get_item",
            skip_all,
            fields(table_name = %self.single_read_args.table_name),
            err
        )
    )]
    pub async fn send<O, S>(self, store: &S) -> error::Result<Option<O>>
    where
        O: DeserializeOwned,
        S: client::Store + ?Sized,
    {
        let get_item: GetItemOperation = self.try_into()?;
        let item = store
            .get_item(get_item.request)
            .await
            .map_err(error::Error::Request)?;
        match (item, get_item.item_absent_error) {
            (Some(item), _) => from_item(item).map(Some).map_err(error::Error::UnmarshalItem),
            (None, Some(item_absent_error)) => Err(error::Error::Domain(item_absent_error)),
            (None, None) => Ok(None),
        }
    }
}
