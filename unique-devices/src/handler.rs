use crate::config::Consistency;
use crate::errors::{Bound, DevicesError};
use crate::mapper::map_rows;
use crate::metrics_defs::QUERY_DURATION;
use crate::project::normalize_project;
use crate::query::{QueryPlanner, QueryRange};
use crate::store::DeviceStore;
use crate::timestamp::normalize_timestamp;
use crate::types::{DeviceCountResponse, Granularity, RouteParams};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct UniqueDevicesInner {
    store: Arc<dyn DeviceStore>,
    planner: QueryPlanner,
    deadline: Duration,
}

/// Request handler for unique devices lookups. Cheap to clone; all clones
/// share the same store.
#[derive(Clone)]
pub struct UniqueDevices {
    inner: Arc<UniqueDevicesInner>,
}

impl UniqueDevices {
    pub fn new(store: Arc<dyn DeviceStore>, consistency: Consistency, deadline: Duration) -> Self {
        UniqueDevices {
            inner: Arc::new(UniqueDevicesInner {
                store,
                planner: QueryPlanner::new(consistency),
                deadline,
            }),
        }
    }

    /// Validates the route parameters, runs the range query under the
    /// configured deadline and maps the resulting rows.
    ///
    /// Validation stops at the first failure, so no query is issued for a
    /// bad request.
    pub async fn handle(&self, params: RouteParams) -> Result<DeviceCountResponse, DevicesError> {
        let granularity: Granularity = params.granularity.parse()?;
        let start = normalize_timestamp(&params.start)
            .map_err(|_| DevicesError::InvalidTimestamp(Bound::Start))?;
        let end = normalize_timestamp(&params.end)
            .map_err(|_| DevicesError::InvalidTimestamp(Bound::End))?;

        let range = QueryRange::new(
            normalize_project(&params.project),
            params.access_site.to_lowercase(),
            granularity,
            start,
            end,
        )
        .map_err(DevicesError::InvalidRange)?;

        let query = self.inner.planner.plan(&range);
        let started = Instant::now();

        // Dropping the future on timeout also drops the cursor, which
        // abandons the in-flight query.
        let result = tokio::time::timeout(self.inner.deadline, async {
            let cursor = self
                .inner
                .store
                .query(&query)
                .await
                .map_err(DevicesError::Query)?;
            map_rows(cursor, &range).await
        })
        .await;

        let result = result.unwrap_or_else(|_| Err(DevicesError::Timeout(self.inner.deadline)));
        shared::histogram!(QUERY_DURATION, "outcome" => query_outcome(&result))
            .record(started.elapsed().as_secs_f64());

        result
    }

    pub fn is_ready(&self) -> bool {
        self.inner.store.is_ready()
    }
}

fn query_outcome(result: &Result<DeviceCountResponse, DevicesError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(DevicesError::NoData) => "empty",
        Err(DevicesError::Timeout(_)) => "timeout",
        Err(_) => "error",
    }
}

/// Pretty-printed JSON with a single space of indentation.
pub fn render<T: Serialize>(value: &T) -> Result<Vec<u8>, DevicesError> {
    let mut body = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b" "));
    value.serialize(&mut serializer)?;
    Ok(body)
}
