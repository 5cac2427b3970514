//! In-process store that evaluates range queries against rows held in key
//! order. Failure injection exercises the error paths of the request handler.

use super::{DecodedRow, DeviceRow, DeviceStore, RowCursor, RowDecodeError, StoreError};
use crate::query::{DOMAIN, RangeQuery};
use crate::types::Granularity;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RowKey {
    domain: String,
    project: String,
    access_site: String,
    granularity: Granularity,
    timestamp: String,
}

pub struct MemoryStore {
    rows: BTreeMap<RowKey, DecodedRow>,
    submission_error: Option<String>,
    stream_error: Option<(usize, String)>,
    latency: Option<Duration>,
    ready: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            rows: BTreeMap::new(),
            submission_error: None,
            stream_error: None,
            latency: None,
            ready: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    pub fn insert(
        &mut self,
        project: &str,
        access_site: &str,
        granularity: Granularity,
        row: DeviceRow,
    ) {
        let key = RowKey {
            domain: DOMAIN.to_string(),
            project: project.to_string(),
            access_site: access_site.to_string(),
            granularity,
            timestamp: row.timestamp.clone(),
        };
        self.rows.insert(key, Ok(row));
    }

    /// Stores a row that the cursor reports as undecodable.
    pub fn insert_malformed(
        &mut self,
        project: &str,
        access_site: &str,
        granularity: Granularity,
        timestamp: &str,
        reason: &str,
    ) {
        let key = RowKey {
            domain: DOMAIN.to_string(),
            project: project.to_string(),
            access_site: access_site.to_string(),
            granularity,
            timestamp: timestamp.to_string(),
        };
        self.rows
            .insert(key, Err(RowDecodeError(reason.to_string())));
    }

    pub fn with_row(
        mut self,
        project: &str,
        access_site: &str,
        granularity: Granularity,
        row: DeviceRow,
    ) -> Self {
        self.insert(project, access_site, granularity, row);
        self
    }

    /// Every query fails before any row is scanned.
    pub fn fail_submission(mut self, message: &str) -> Self {
        self.submission_error = Some(message.to_string());
        self
    }

    /// The cursor yields at most `rows` rows, then a terminal error.
    pub fn fail_stream_after(mut self, rows: usize, message: &str) -> Self {
        self.stream_error = Some((rows, message.to_string()));
        self
    }

    /// Delay applied to every query submission.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[async_trait]
impl DeviceStore for MemoryStore {
    async fn query(&self, query: &RangeQuery) -> Result<RowCursor, StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = &self.submission_error {
            return Err(StoreError::Query(message.clone()));
        }

        let mut items: Vec<Result<DecodedRow, StoreError>> = self
            .rows
            .iter()
            .filter(|(key, _)| {
                query.matches(
                    &key.domain,
                    &key.project,
                    &key.access_site,
                    key.granularity,
                    &key.timestamp,
                )
            })
            .map(|(_, row)| Ok(row.clone()))
            .collect();

        if let Some((after, message)) = &self.stream_error {
            items.truncate(*after);
            items.push(Err(StoreError::Stream(message.clone())));
        }

        Ok(futures::stream::iter(items).boxed())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryPlanner, QueryRange};

    fn row(timestamp: &str, devices: u64) -> DeviceRow {
        DeviceRow {
            timestamp: timestamp.into(),
            devices,
            offset: 1,
            underestimate: devices - 1,
        }
    }

    fn plan(project: &str, start: &str, end: &str) -> RangeQuery {
        let range = QueryRange::new(
            project.into(),
            "all-sites".into(),
            Granularity::Daily,
            start.parse().unwrap(),
            end.parse().unwrap(),
        )
        .unwrap();
        QueryPlanner::default().plan(&range)
    }

    async fn collect(cursor: RowCursor) -> Vec<Result<DecodedRow, StoreError>> {
        cursor.collect().await
    }

    #[tokio::test]
    async fn test_rows_in_key_order() {
        // Inserted out of order on purpose.
        let store = MemoryStore::new()
            .with_row("en.wikipedia", "all-sites", Granularity::Daily, row("2021010300", 30))
            .with_row("en.wikipedia", "all-sites", Granularity::Daily, row("2021010100", 10))
            .with_row("en.wikipedia", "all-sites", Granularity::Daily, row("2021010200", 20))
            .with_row("de.wikipedia", "all-sites", Granularity::Daily, row("2021010200", 99))
            .with_row("en.wikipedia", "mobile-site", Granularity::Daily, row("2021010200", 98))
            .with_row("en.wikipedia", "all-sites", Granularity::Monthly, row("2021010100", 97));

        let items = collect(store.query(&plan("en.wikipedia", "20210101", "20210103")).await.unwrap()).await;
        let timestamps: Vec<String> = items
            .into_iter()
            .map(|item| item.unwrap().unwrap().timestamp)
            .collect();
        assert_eq!(timestamps, ["2021010100", "2021010200", "2021010300"]);

        let items = collect(store.query(&plan("en.wikipedia", "20210102", "20210102")).await.unwrap()).await;
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_readiness_toggle() {
        let store = MemoryStore::new();
        assert!(store.is_ready());
        store.set_ready(false);
        assert!(!store.is_ready());
    }

    #[tokio::test]
    async fn test_malformed_rows_are_reported_in_place() {
        let mut store = MemoryStore::new()
            .with_row("en.wikipedia", "all-sites", Granularity::Daily, row("2021010100", 10));
        store.insert_malformed("en.wikipedia", "all-sites", Granularity::Daily, "2021010200", "negative devices");

        let items = collect(store.query(&plan("en.wikipedia", "20210101", "20210102")).await.unwrap()).await;
        assert_eq!(items.len(), 2);
        assert!(items[0].as_ref().unwrap().is_ok());
        assert_eq!(
            items[1].as_ref().unwrap(),
            &Err(RowDecodeError("negative devices".into()))
        );
    }

    #[tokio::test]
    async fn test_fail_submission() {
        let store = MemoryStore::new().fail_submission("no hosts available");
        let result = store.query(&plan("en.wikipedia", "20210101", "20210102")).await;
        assert!(matches!(result, Err(StoreError::Query(msg)) if msg == "no hosts available"));
    }

    #[tokio::test]
    async fn test_fail_stream_after() {
        let store = MemoryStore::new()
            .with_row("en.wikipedia", "all-sites", Granularity::Daily, row("2021010100", 10))
            .with_row("en.wikipedia", "all-sites", Granularity::Daily, row("2021010200", 20))
            .fail_stream_after(1, "connection reset");

        let items = collect(store.query(&plan("en.wikipedia", "20210101", "20210102")).await.unwrap()).await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(&items[1], Err(StoreError::Stream(msg)) if msg == "connection reset"));
    }
}
