//! Error types returned by every composed request.
//!
//! Each variant names the phase that failed, so a caller can tell a bad key
//! record from a bad placeholder value or a rejected request without parsing
//! messages.

use crate::client;

use std::{error, fmt};

/// Boxed error used for caller-supplied substitute errors.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The expression slot an [`Error::Expression`] was raised from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExpressionRole {
    /// Condition attached to a write.
    Condition,
    /// Filter applied to query or scan results.
    Filter,
    /// Key condition of a query.
    KeyCondition,
    /// Attribute projection.
    Projection,
    /// Update expression of an update item request.
    Update,
}

impl fmt::Display for ExpressionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Self::Condition => "conditional",
            Self::Filter => "filter",
            Self::KeyCondition => "key condition",
            Self::Projection => "projection",
            Self::Update => "update",
        };
        f.write_str(role)
    }
}

/// Error returned when composing or executing a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The primary key record could not be converted into attribute values.
    #[error("failed to marshal primary key: {0}")]
    MarshalKey(#[source] serde_dynamo::Error),
    /// The item record could not be converted into attribute values.
    #[error("failed to marshal item: {0}")]
    MarshalItem(#[source] serde_dynamo::Error),
    /// A placeholder value added to an expression builder could not be serialized.
    #[error("error in {role} expression: {source}")]
    Expression {
        /// The slot the failing builder was attached to.
        role: ExpressionRole,
        /// The first serialization failure recorded by the builder.
        #[source]
        source: serde_dynamo::Error,
    },
    /// A placeholder value added directly on a request could not be serialized.
    #[error("failed to marshal expression values: {0}")]
    MarshalValues(#[source] serde_dynamo::Error),
    /// The remote call failed.
    #[error("failed to perform request: {0}")]
    Request(#[source] client::StoreError),
    /// A returned item could not be decoded into the target record.
    #[error("failed to unmarshal item: {0}")]
    UnmarshalItem(#[source] serde_dynamo::Error),
    /// A page of returned items could not be decoded into the target records.
    #[error("failed to unmarshal items: {0}")]
    UnmarshalItems(#[source] serde_dynamo::Error),
    /// The write condition did not hold and no substitute error was configured.
    #[error(transparent)]
    ConditionFailed(client::StoreError),
    /// A caller-configured error returned in place of a remote outcome.
    #[error(transparent)]
    Domain(BoxError),
}

impl Error {
    /// Returns the caller-configured error if it is of type `T`.
    ///
    /// ```rust
    /// use dynamodb_compose::Error;
    ///
    /// #[derive(Debug)]
    /// struct NotFound;
    ///
    /// impl std::fmt::Display for NotFound {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    ///         f.write_str("not found")
    ///     }
    /// }
    ///
    /// impl std::error::Error for NotFound {}
    ///
    /// let err = Error::Domain(Box::new(NotFound));
    /// assert!(err.domain_error::<NotFound>().is_some());
    /// ```
    pub fn domain_error<T: error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Self::Domain(err) => err.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Whether the remote side reported a failed conditional check.
    pub fn is_condition_failed(&self) -> bool {
        matches!(self, Self::ConditionFailed(_))
    }
}
