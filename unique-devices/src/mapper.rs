use crate::errors::DevicesError;
use crate::metrics_defs::ROWS_SKIPPED;
use crate::query::QueryRange;
use crate::store::RowCursor;
use crate::types::DeviceCountResponse;
use futures::StreamExt;

/// Drains the cursor into a response.
///
/// Rows that fail to decode are logged and dropped. A terminal cursor error
/// discards everything read so far. A cursor that produced no usable rows is
/// reported as [`DevicesError::NoData`].
pub async fn map_rows(
    mut cursor: RowCursor,
    range: &QueryRange,
) -> Result<DeviceCountResponse, DevicesError> {
    let mut items = Vec::new();

    while let Some(item) = cursor.next().await {
        match item.map_err(DevicesError::Cursor)? {
            Ok(row) => items.push(range.record(row)),
            Err(err) => {
                tracing::error!(
                    project = range.project(),
                    access_site = range.access_site(),
                    granularity = %range.granularity(),
                    "skipping row: {err}"
                );
                shared::counter!(ROWS_SKIPPED).increment(1);
            }
        }
    }

    if items.is_empty() {
        return Err(DevicesError::NoData);
    }

    Ok(DeviceCountResponse { items })
}
