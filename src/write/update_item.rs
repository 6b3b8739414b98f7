use crate::{client, common, error, write};

use serde::Serialize;
use serde_dynamo::to_item;

/// update item request with its substitute error
#[derive(Debug)]
struct UpdateItemOperation {
    condition_error: Option<error::BoxError>,
    request: client::UpdateItemRequest,
}

/// Update item operation.
///
/// The update expression is resolved first; the condition then sees its
/// placeholders, so both may share aliases.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_compose::{common, write};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let keys = common::key::Keys::new(common::key::Key::new("GameTitle", "Alien Adventure"))
///     .sort_key(common::key::Key::new("UserId", "User-5"));
/// write::update_item::UpdateItem::new("scores", keys)
///     .update_expression("SET TopScore = :TopScore")
///     .value(":TopScore", 120)
///     .condition_expression("attribute_exists(GameTitle)")
///     .condition_error("game score does not exist")
///     .send(client)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UpdateItem<K> {
    /// The primary key of the item to update.
    pub keys: K,
    /// The update expression builder.
    pub update: Option<common::expression::Expression>,
    /// Additional write operation arguments (table name, condition, substitute error).
    pub write_args: write::common::WriteArgs,
}

impl<K: Serialize> TryFrom<UpdateItem<K>> for UpdateItemOperation {
    type Error = error::Error;

    fn try_from(update_item: UpdateItem<K>) -> error::Result<Self> {
        let key = to_item(update_item.keys).map_err(error::Error::MarshalKey)?;
        let mut merged = common::MergedExpressions::default();
        let update_expression = merged.resolve(update_item.update, error::ExpressionRole::Update)?;
        let (write_input, condition_error) = update_item.write_args.into_input(merged)?;
        let operation = Self {
            condition_error,
            request: client::UpdateItemRequest {
                key,
                update_expression,
                write_input,
            },
        };
        Ok(operation)
    }
}

impl<K: Serialize> UpdateItem<K> {
    /// Creates an update of the item identified by `keys` in `table_name`.
    pub fn new(table_name: impl Into<String>, keys: K) -> Self {
        Self {
            keys,
            update: None,
            write_args: write::common::WriteArgs::new(table_name),
        }
    }

    /// Attaches the update expression builder.
    pub fn update(mut self, update: common::expression::Expression) -> Self {
        self.update = Some(update);
        self
    }

    /// Attaches an update expression without placeholders of its own.
    pub fn update_expression(mut self, update: impl Into<String>) -> Self {
        self.update = Some(common::expression::Expression::new(update));
        self
    }

    crate::write_args_setters!();

    /// Execute the update item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.update_item",
            skip_all,
            fields(table_name = %self.write_args.table_name),
            err
        )
    )]
    pub async fn send<S: client::Store + ?Sized>(self, store: &S) -> error::Result<()> {
        let update_item: UpdateItemOperation = self.try_into()?;
        let result = store.update_item(update_item.request).await;
        write::common::check_condition(result, update_item.condition_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockStore;

    use aws_sdk_dynamodb::types;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::{collections, fmt};

    #[derive(Debug)]
    struct GameScoreNotExists;

    impl fmt::Display for GameScoreNotExists {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("game score does not exist")
        }
    }

    impl std::error::Error for GameScoreNotExists {}

    fn keys(game_title: &str) -> Value {
        json!({"GameTitle": game_title, "UserId": "User-5"})
    }

    #[rstest]
    #[case::empty(
        UpdateItem::new(
            "c",
            json!(
                {
                    "a": "b"
                }
            )
        ),
        client::UpdateItemRequest {
            key: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            ),
            write_input: write::common::WriteInput {
                table_name: "c".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    )]
    #[case::update_and_condition_share_placeholders(
        UpdateItem::new(
            "g",
            json!(
                {
                    "a": "b"
                }
            )
        )
        .update(
            common::expression::exp("SET #c = :d")
                .name("c", "c")
                .value("d", 1)
        )
        .condition(
            common::expression::exp("#c < :d AND #e = :f")
                .name("e", "e")
                .value("f", "h")
        ),
        client::UpdateItemRequest {
            key: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            ),
            update_expression: Some(
                "SET #c = :d".to_string()
            ),
            write_input: write::common::WriteInput {
                condition_expression: Some(
                    "#c < :d AND #e = :f".to_string()
                ),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#c".to_string(), "c".to_string()),
                            ("#e".to_string(), "e".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [
                            (
                                ":d".to_string(),
                                types::AttributeValue::N(
                                    "1".to_string()
                                )
                            ),
                            (
                                ":f".to_string(),
                                types::AttributeValue::S(
                                    "h".to_string()
                                )
                            ),
                        ]
                    )
                ),
                table_name: "g".to_string(),
            },
        }
    )]
    fn test_update_item(#[case] args: UpdateItem<Value>, #[case] expected: client::UpdateItemRequest) {
        let actual: UpdateItemOperation = args.try_into().unwrap();
        assert_eq!(actual.request, expected);
    }

    #[test]
    fn test_update_collision_prefers_update_expression() {
        let update_item = UpdateItem::new("a", json!({"a": "b"}))
            .update(common::expression::exp("SET #c = :c").name("c", "from_update").value("c", 1))
            .condition(common::expression::exp("#c = :c").name("c", "from_condition"));
        let actual: UpdateItemOperation = update_item.try_into().unwrap();
        let expected = Some(collections::HashMap::from([(
            "#c".to_string(),
            "from_update".to_string(),
        )]));
        assert_eq!(actual.request.write_input.expression_attribute_names, expected);
    }

    #[tokio::test]
    async fn test_update_missing_without_condition() {
        let store = MockStore::new(&["GameTitle", "UserId"]);
        UpdateItem::new("scores", keys("No Any Game"))
            .send(&store)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_with_condition_error() {
        let store = MockStore::new(&["GameTitle", "UserId"]);
        let err = UpdateItem::new("scores", keys("No Such Game"))
            .update_expression("SET TopScore = :TopScore")
            .value(":TopScore", 120)
            .condition_expression("attribute_exists(GameTitle)")
            .condition_error(GameScoreNotExists)
            .send(&store)
            .await
            .unwrap_err();
        assert!(err.domain_error::<GameScoreNotExists>().is_some());
    }

    #[tokio::test]
    async fn test_update_existing() {
        let store = MockStore::new(&["GameTitle", "UserId"]);
        store.insert(json!({"GameTitle": "Alien Adventure", "UserId": "User-5", "TopScore": 100}));
        UpdateItem::new("scores", keys("Alien Adventure"))
            .update_expression("SET TopScore = :TopScore")
            .value(":TopScore", 120)
            .condition_expression("attribute_exists(GameTitle)")
            .condition_error(GameScoreNotExists)
            .send(&store)
            .await
            .unwrap();
        let item = store.get(&keys("Alien Adventure")).unwrap();
        assert_eq!(
            item.get("TopScore"),
            Some(&types::AttributeValue::N("120".to_string()))
        );
    }
}
