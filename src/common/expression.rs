use crate::common;

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::Result;

/// Starts a new expression, shorthand for [`Expression::new`].
///
/// ```rust
/// use dynamodb_compose::common::expression;
///
/// let input = expression::exp("attribute_not_exists(#t)")
///     .name("#t", "Title")
///     .value(":v", "x")
///     .resolve()
///     .unwrap();
/// assert_eq!(input.expression, "attribute_not_exists(#t)");
/// ```
pub fn exp(expression: impl Into<String>) -> Expression {
    Expression::new(expression)
}

/// One expression fragment together with the placeholders it references.
///
/// Used for every expression slot a request carries: key condition, filter,
/// projection, update and condition. Calls chain; a value that fails to
/// serialize does not break the chain, the first such failure is returned by
/// [`Expression::resolve`] instead.
///
/// ```rust
/// use dynamodb_compose::common::expression::Expression;
///
/// let update = Expression::new("SET #score = :score")
///     .name("score", "TopScore")
///     .value("score", 120);
/// ```
#[derive(Debug, Default)]
pub struct Expression {
    expression: String,
    expression_holder: common::ExpressionHolder,
}

impl Expression {
    /// Starts a new expression from its literal text.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            expression_holder: common::ExpressionHolder::default(),
        }
    }

    /// The literal expression text.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Aliases an attribute name; the leading `#` of `placeholder` is optional.
    pub fn name(mut self, placeholder: &str, name: impl Into<String>) -> Self {
        self.expression_holder.add_name(placeholder, name);
        self
    }

    /// Aliases an attribute value; the leading `:` of `placeholder` is optional.
    pub fn value<V: Serialize>(mut self, placeholder: &str, value: V) -> Self {
        self.expression_holder.add_value(placeholder, value);
        self
    }

    /// Copies placeholders resolved elsewhere into this expression.
    ///
    /// Entries already present are overwritten; names and values added after
    /// the merge overwrite the merged ones.
    pub fn merge(
        mut self,
        names: impl IntoIterator<Item = (String, String)>,
        values: impl IntoIterator<Item = (String, types::AttributeValue)>,
    ) -> Self {
        self.expression_holder.extend(names, values);
        self
    }

    /// Resolves into the wire triple, or the first value serialization error.
    pub fn resolve(self) -> Result<common::ExpressionInput> {
        let (expression_attribute_names, expression_attribute_values) =
            self.expression_holder.resolve()?;
        Ok(common::ExpressionInput {
            expression: self.expression,
            expression_attribute_names,
            expression_attribute_values,
        })
    }

    /// [`Expression::merge`] followed by [`Expression::resolve`].
    ///
    /// Lets a dependent expression, such as a filter, see the aliases of the
    /// expression resolved before it.
    pub fn resolve_merged(
        self,
        names: impl IntoIterator<Item = (String, String)>,
        values: impl IntoIterator<Item = (String, types::AttributeValue)>,
    ) -> Result<common::ExpressionInput> {
        self.merge(names, values).resolve()
    }
}
