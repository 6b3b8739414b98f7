use crate::{client, common, error};

use aws_sdk_dynamodb::types;
use std::collections;

/// Write fields ready to be sent.
///
/// Holds the resolved condition together with the placeholders merged from
/// every expression slot of the request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteInput {
    /// The resolved condition expression.
    pub condition_expression: Option<String>,
    /// Attribute name placeholders of every expression slot.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Attribute value placeholders of every expression slot.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// The name of the table to write to.
    pub table_name: String,
}

/// Arguments common to all write operations (Put, Update, Delete).
#[derive(Debug, Default)]
pub struct WriteArgs {
    /// Condition expression that must be true for the operation to succeed.
    ///
    /// If the condition is false, the operation fails with a conditional check error.
    pub condition: Option<common::expression::Expression>,
    /// Error returned in place of a failed conditional check.
    ///
    /// Lets callers express "already exists" or "not found" without inspecting
    /// remote error codes. Any other failure is never substituted.
    pub condition_error: Option<error::BoxError>,
    /// Placeholders set directly on the request.
    pub expression_holder: common::ExpressionHolder,
    /// The name of the table to write to.
    pub table_name: String,
}

impl WriteArgs {
    /// Creates arguments for the given table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Resolves the condition on top of the slots already in `merged`.
    pub(crate) fn into_input(
        self,
        mut merged: common::MergedExpressions,
    ) -> error::Result<(WriteInput, Option<error::BoxError>)> {
        let condition_expression =
            merged.resolve(self.condition, error::ExpressionRole::Condition)?;
        merged.apply(self.expression_holder)?;
        let write_input = WriteInput {
            condition_expression,
            expression_attribute_names: merged.expression_attribute_names,
            expression_attribute_values: merged.expression_attribute_values,
            table_name: self.table_name,
        };
        Ok((write_input, self.condition_error))
    }
}

/// Applies the conditional-check policy to the outcome of a write.
///
/// A failed condition becomes the configured substitute error, or is returned
/// as is; any other failure is wrapped as a request failure.
pub(crate) fn check_condition(
    result: Result<(), client::StoreError>,
    condition_error: Option<error::BoxError>,
) -> error::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_conditional_check_failed() => match condition_error {
            Some(condition_error) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %err, "substituting failed conditional check");
                Err(error::Error::Domain(condition_error))
            }
            None => Err(error::Error::ConditionFailed(err)),
        },
        Err(err) => Err(error::Error::Request(err)),
    }
}

/// apply common write settings to an sdk builder
#[macro_export]
macro_rules! apply_write_input {
    ($builder:expr, $write_input:expr) => {
        $builder
            .set_condition_expression($write_input.condition_expression)
            .set_expression_attribute_names($write_input.expression_attribute_names)
            .set_expression_attribute_values($write_input.expression_attribute_values)
            .table_name($write_input.table_name)
    };
}

/// fluent setters for composers carrying `write_args`
#[macro_export]
macro_rules! write_args_setters {
    () => {
        /// Attaches the condition expression builder.
        pub fn condition(mut self, condition: $crate::common::expression::Expression) -> Self {
            self.write_args.condition = Some(condition);
            self
        }

        /// Attaches a condition expression without placeholders of its own.
        pub fn condition_expression(mut self, condition: impl Into<String>) -> Self {
            self.write_args.condition = Some($crate::common::expression::Expression::new(condition));
            self
        }

        /// Returns `condition_error` instead of a failed conditional check.
        pub fn condition_error(mut self, condition_error: impl Into<$crate::BoxError>) -> Self {
            self.write_args.condition_error = Some(condition_error.into());
            self
        }

        /// Aliases an attribute name directly on the request.
        pub fn name(mut self, placeholder: &str, name: impl Into<String>) -> Self {
            self.write_args.expression_holder.add_name(placeholder, name);
            self
        }

        /// Aliases an attribute value directly on the request.
        pub fn value<V: serde::Serialize>(mut self, placeholder: &str, value: V) -> Self {
            self.write_args.expression_holder.add_value(placeholder, value);
            self
        }
    };
}
