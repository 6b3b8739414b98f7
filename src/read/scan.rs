use crate::{client, common, error, read};

use serde::de::{DeserializeOwned, IgnoredAny};

/// scan request with where its pagination starts
#[derive(Debug)]
struct ScanOperation {
    paging: read::common::Paging,
    request: client::ScanRequest,
}

/// Scan operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_compose::{common, read};
/// use serde_json::Value;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let mut users: Vec<Value> = Vec::new();
/// read::scan::Scan::new("users")
///     .filter(common::expression::exp("#age >= :age").name("age", "age").value("age", 18))
///     .limit(100)
///     .send(client, &mut users)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Scan {
    /// Additional read operation arguments (table name, projection, filter, paging).
    pub multiple_read_args: read::common::MultipleReadArgs,
    /// The segment to be scanned by this worker, for parallel scans.
    pub segment: Option<i32>,
    /// The total number of segments the table is divided into, for parallel scans.
    pub total_segments: Option<i32>,
}

impl TryFrom<Scan> for ScanOperation {
    type Error = error::Error;

    fn try_from(scan: Scan) -> error::Result<Self> {
        let (multiple_read_input, paging) = scan
            .multiple_read_args
            .into_input(common::MergedExpressions::default())?;
        let operation = Self {
            paging,
            request: client::ScanRequest {
                multiple_read_input,
                segment: scan.segment,
                total_segments: scan.total_segments,
            },
        };
        Ok(operation)
    }
}

impl Scan {
    /// Creates a scan of `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            multiple_read_args: read::common::MultipleReadArgs::new(table_name),
            segment: None,
            total_segments: None,
        }
    }

    /// Restricts the scan to one segment of a parallel scan.
    pub fn segment(mut self, segment: i32, total_segments: i32) -> Self {
        self.segment = Some(segment);
        self.total_segments = Some(total_segments);
        self
    }

    crate::multiple_read_args_setters!();

    /// Execute the scan operation, appending decoded items to `items`.
    ///
    /// Returns the number of matching items reported across the fetched pages.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.scan",
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
        let scan: ScanOperation = self.try_into()?;
        let request = &scan.request;
        read::common::paginate(scan.paging, Some(items), move |exclusive_start_key| {
            store.scan_page(request, exclusive_start_key)
        })
        .await
    }

    /// Execute the scan operation without decoding items.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_compose.scan_count",
            skip_all,
            fields(table_name = %self.multiple_read_args.table_name),
            err
        )
    )]
    pub async fn count<S: client::Store + ?Sized>(self, store: &S) -> error::Result<i64> {
        let scan: ScanOperation = self.try_into()?;
        let request = &scan.request;
        read::common::paginate::<IgnoredAny, _, _>(scan.paging, None, move |exclusive_start_key| {
            store.scan_page(request, exclusive_start_key)
        })
        .await
    }
}
