//! Common utilities for DynamoDB operations.
//!
//! This module provides the placeholder bookkeeping shared by every request:
//! the expression builder, ad hoc placeholders set directly on a request, and
//! the merged placeholder set a request sends on the wire.

/// Expression builder with named and valued placeholders.
pub mod expression;

/// Key types for identifying items in DynamoDB tables.
pub mod key;

use crate::error;

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::{Result, to_attribute_value};
use std::collections;

const NAME_SIGIL: char = '#';
const VALUE_SIGIL: char = ':';

/// Normalizes an attribute name placeholder to exactly one leading `#`.
pub(crate) fn name_placeholder(placeholder: &str) -> String {
    format!("{NAME_SIGIL}{}", placeholder.trim_start_matches(NAME_SIGIL))
}

/// Normalizes an attribute value placeholder to exactly one leading `:`.
pub(crate) fn value_placeholder(placeholder: &str) -> String {
    format!("{VALUE_SIGIL}{}", placeholder.trim_start_matches(VALUE_SIGIL))
}

fn non_empty<V>(map: collections::HashMap<String, V>) -> Option<collections::HashMap<String, V>> {
    (!map.is_empty()).then_some(map)
}

fn extend_optional<V>(
    target: &mut Option<collections::HashMap<String, V>>,
    source: Option<collections::HashMap<String, V>>,
) {
    if let Some(source) = source {
        target
            .get_or_insert_with(collections::HashMap::new)
            .extend(source);
    }
}

/// A resolved expression, ready to be sent.
///
/// Empty placeholder maps are `None`: DynamoDB rejects an empty map, which is
/// not the same as sending no map at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionInput {
    /// The literal expression string.
    pub expression: String,
    /// Attribute name placeholders, keyed by `#placeholder`.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Attribute value placeholders, keyed by `:placeholder`.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
}

/// Named and valued placeholders without an expression of their own.
///
/// Every request carries one, so simple cases can alias names and values
/// directly on the request instead of on a separate expression builder.
/// Values are serialized when added; the first serialization failure is kept
/// and reported when the request is executed.
#[derive(Debug, Default)]
pub struct ExpressionHolder {
    error: Option<serde_dynamo::Error>,
    expression_attribute_names: collections::HashMap<String, String>,
    expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionHolder {
    /// Aliases `name` as `#placeholder`; the `#` is optional. Last write wins.
    pub fn add_name(&mut self, placeholder: &str, name: impl Into<String>) {
        self.expression_attribute_names
            .insert(name_placeholder(placeholder), name.into());
    }

    /// Serializes `value` as `:placeholder`; the `:` is optional. Last write wins.
    pub fn add_value<V: Serialize>(&mut self, placeholder: &str, value: V) {
        match to_attribute_value(value) {
            Ok(value) => {
                self.expression_attribute_values
                    .insert(value_placeholder(placeholder), value);
            }
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
        }
    }

    /// Copies already resolved placeholders in, overwriting on collision.
    pub fn extend(
        &mut self,
        names: impl IntoIterator<Item = (String, String)>,
        values: impl IntoIterator<Item = (String, types::AttributeValue)>,
    ) {
        self.expression_attribute_names.extend(names);
        self.expression_attribute_values.extend(values);
    }

    /// Whether no placeholder has been added.
    pub fn is_empty(&self) -> bool {
        self.error.is_none()
            && self.expression_attribute_names.is_empty()
            && self.expression_attribute_values.is_empty()
    }

    /// Returns both maps, absent when empty, or the first deferred error.
    #[allow(clippy::type_complexity)]
    pub(crate) fn resolve(
        self,
    ) -> Result<(
        Option<collections::HashMap<String, String>>,
        Option<collections::HashMap<String, types::AttributeValue>>,
    )> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok((
            non_empty(self.expression_attribute_names),
            non_empty(self.expression_attribute_values),
        ))
    }
}

/// Placeholders accumulated across every expression slot of one request.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct MergedExpressions {
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
}

impl MergedExpressions {
    /// Resolves one slot on top of everything accumulated so far.
    pub(crate) fn resolve(
        &mut self,
        expression: Option<expression::Expression>,
        role: error::ExpressionRole,
    ) -> error::Result<Option<String>> {
        let Some(expression) = expression else {
            return Ok(None);
        };
        let input = expression
            .resolve_merged(
                self.expression_attribute_names.take().into_iter().flatten(),
                self.expression_attribute_values.take().into_iter().flatten(),
            )
            .map_err(|source| error::Error::Expression { role, source })?;
        self.expression_attribute_names = input.expression_attribute_names;
        self.expression_attribute_values = input.expression_attribute_values;
        Ok(Some(input.expression))
    }

    /// Applies the request's ad hoc placeholders last.
    pub(crate) fn apply(&mut self, holder: ExpressionHolder) -> error::Result<()> {
        let (names, values) = holder.resolve().map_err(error::Error::MarshalValues)?;
        extend_optional(&mut self.expression_attribute_names, names);
        extend_optional(&mut self.expression_attribute_values, values);
        Ok(())
    }
}
