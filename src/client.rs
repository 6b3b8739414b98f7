//! Remote store capability consumed by every composed request.
//!
//! [`Store`] is deliberately thin and close to the DynamoDB API: it takes fully
//! composed wire fields and hands back raw attribute maps, so the composition
//! and error policy in [`crate::read`] and [`crate::write`] can be exercised
//! against any implementation. [`Client`] implements it by forwarding to the SDK.

#[cfg(test)]
pub(crate) mod mock;

use crate::{read, write};

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types,
};
use std::{collections, error, fmt};

/// Attribute map of one item, primary key or pagination cursor.
pub type Item = collections::HashMap<String, types::AttributeValue>;

/// Classification of a remote failure.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreErrorKind {
    /// The condition attached to a write did not hold.
    ConditionalCheckFailed,
    /// The request was rejected as malformed.
    Validation,
    /// The table or index does not exist.
    ResourceNotFound,
    /// The request rate exceeded the provisioned or account limits.
    Throttling,
    /// The request never got a response (timeout, connection or dispatch failure).
    Transport,
    /// Any other failure.
    Other,
}

impl StoreErrorKind {
    /// Classifies a DynamoDB error code.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("ConditionalCheckFailedException") => Self::ConditionalCheckFailed,
            Some("ValidationException") => Self::Validation,
            Some("ResourceNotFoundException") => Self::ResourceNotFound,
            Some(
                "ProvisionedThroughputExceededException"
                | "ThrottlingException"
                | "RequestLimitExceeded",
            ) => Self::Throttling,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::ConditionalCheckFailed => "ConditionalCheckFailedException",
            Self::Validation => "ValidationException",
            Self::ResourceNotFound => "ResourceNotFoundException",
            Self::Throttling => "ThrottlingException",
            Self::Transport => "TransportError",
            Self::Other => "UnknownError",
        };
        f.write_str(code)
    }
}

/// Failure reported by a [`Store`].
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn error::Error + Send + Sync + 'static>>,
}

impl StoreError {
    /// Creates an error of the given kind.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, source: impl Into<Box<dyn error::Error + Send + Sync>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The failure classification.
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// The failure message, without the kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the failure is a failed conditional check.
    pub fn is_conditional_check_failed(&self) -> bool {
        self.kind == StoreErrorKind::ConditionalCheckFailed
    }
}

impl<E, R> From<SdkError<E, R>> for StoreError
where
    E: ProvideErrorMetadata + error::Error + Send + Sync + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    fn from(err: SdkError<E, R>) -> Self {
        let kind = match &err {
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => StoreErrorKind::Transport,
            _ => StoreErrorKind::from_code(err.code()),
        };
        let message = DisplayErrorContext(&err).to_string();
        Self::new(kind, message).with_source(err)
    }
}

/// One page of a query or scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// The items returned, `None` for count-only reads.
    pub items: Option<Vec<Item>>,
    /// The number of items the remote side reported for this page.
    pub count: i32,
    /// Cursor to resume from, `None` on the last page.
    pub last_evaluated_key: Option<Item>,
}

/// Fully composed put item request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutItemRequest {
    /// The item attributes.
    pub item: Item,
    /// Table name, condition and placeholders.
    pub write_input: write::common::WriteInput,
}

/// Fully composed get item request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItemRequest {
    /// The primary key attributes.
    pub key: Item,
    /// Table name, projection and placeholders.
    pub single_read_input: read::common::SingleReadInput,
}

/// Fully composed update item request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateItemRequest {
    /// The primary key attributes.
    pub key: Item,
    /// The update expression, if any.
    pub update_expression: Option<String>,
    /// Table name, condition and placeholders.
    pub write_input: write::common::WriteInput,
}

/// Fully composed delete item request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteItemRequest {
    /// The primary key attributes.
    pub key: Item,
    /// Table name, condition and placeholders.
    pub write_input: write::common::WriteInput,
}

/// Fully composed query request, reused for every page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryRequest {
    /// The key condition expression.
    pub key_condition_expression: String,
    /// Table, index, filter, projection, placeholders and page size.
    pub multiple_read_input: read::common::MultipleReadInput,
    /// `false` to read the sort key in descending order.
    pub scan_index_forward: Option<bool>,
}

/// Fully composed scan request, reused for every page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanRequest {
    /// Table, index, filter, projection, placeholders and page size.
    pub multiple_read_input: read::common::MultipleReadInput,
    /// Segment of a parallel scan.
    pub segment: Option<i32>,
    /// Total segments of a parallel scan.
    pub total_segments: Option<i32>,
}

/// The remote key-value store operations the composers rely on.
///
/// Implementations must report a failed write condition with
/// [`StoreErrorKind::ConditionalCheckFailed`] so the composers can apply the
/// caller's substitute error.
#[async_trait]
pub trait Store: Send + Sync {
    /// Writes an item.
    async fn put_item(&self, request: PutItemRequest) -> Result<(), StoreError>;

    /// Reads an item by primary key, `None` if absent.
    async fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>, StoreError>;

    /// Updates an item by primary key.
    async fn update_item(&self, request: UpdateItemRequest) -> Result<(), StoreError>;

    /// Deletes an item by primary key.
    async fn delete_item(&self, request: DeleteItemRequest) -> Result<(), StoreError>;

    /// Fetches one page of a query, starting after `exclusive_start_key`.
    async fn query_page(
        &self,
        request: &QueryRequest,
        exclusive_start_key: Option<Item>,
    ) -> Result<Page, StoreError>;

    /// Fetches one page of a scan, starting after `exclusive_start_key`.
    async fn scan_page(
        &self,
        request: &ScanRequest,
        exclusive_start_key: Option<Item>,
    ) -> Result<Page, StoreError>;
}

#[async_trait]
impl Store for Client {
    async fn put_item(&self, request: PutItemRequest) -> Result<(), StoreError> {
        let builder = self.put_item().set_item(Some(request.item));
        crate::apply_write_input!(builder, request.write_input)
            .send()
            .await?;
        Ok(())
    }

    async fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>, StoreError> {
        let builder = self.get_item().set_key(Some(request.key));
        let output = crate::apply_single_read_input!(builder, request.single_read_input)
            .send()
            .await?;
        Ok(output.item)
    }

    async fn update_item(&self, request: UpdateItemRequest) -> Result<(), StoreError> {
        let builder = self
            .update_item()
            .set_key(Some(request.key))
            .set_update_expression(request.update_expression);
        crate::apply_write_input!(builder, request.write_input)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> Result<(), StoreError> {
        let builder = self.delete_item().set_key(Some(request.key));
        crate::apply_write_input!(builder, request.write_input)
            .send()
            .await?;
        Ok(())
    }

    async fn query_page(
        &self,
        request: &QueryRequest,
        exclusive_start_key: Option<Item>,
    ) -> Result<Page, StoreError> {
        let builder = self
            .query()
            .key_condition_expression(request.key_condition_expression.clone())
            .set_scan_index_forward(request.scan_index_forward)
            .set_exclusive_start_key(exclusive_start_key);
        let multiple_read_input = request.multiple_read_input.clone();
        let output = crate::apply_multiple_read_input!(builder, multiple_read_input)
            .send()
            .await?;
        Ok(Page {
            items: output.items,
            count: output.count,
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn scan_page(
        &self,
        request: &ScanRequest,
        exclusive_start_key: Option<Item>,
    ) -> Result<Page, StoreError> {
        let builder = self
            .scan()
            .set_segment(request.segment)
            .set_total_segments(request.total_segments)
            .set_exclusive_start_key(exclusive_start_key);
        let multiple_read_input = request.multiple_read_input.clone();
        let output = crate::apply_multiple_read_input!(builder, multiple_read_input)
            .send()
            .await?;
        Ok(Page {
            items: output.items,
            count: output.count,
            last_evaluated_key: output.last_evaluated_key,
        })
    }
}
