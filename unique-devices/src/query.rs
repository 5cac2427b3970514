use crate::config::Consistency;
use crate::store::DeviceRow;
use crate::timestamp::{Timestamp, TimestampError, validate_range};
use crate::types::{DeviceCountRecord, Granularity};

/// Tenant discriminator every unique devices row is stored under.
pub const DOMAIN: &str = "analytics.wikimedia.org";

pub const SELECT_DEVICES: &str = r#"SELECT devices, offset, underestimate, timestamp FROM "local_group_default_T_unique_devices".data WHERE "_domain" = ? AND project = ? AND "access-site" = ? AND granularity = ? AND timestamp >= ? AND timestamp <= ?"#;

/// Fully validated request parameters. Only constructed once the range is
/// known to be ordered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRange {
    project: String,
    access_site: String,
    granularity: Granularity,
    start: Timestamp,
    end: Timestamp,
}

impl QueryRange {
    pub fn new(
        project: String,
        access_site: String,
        granularity: Granularity,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Self, TimestampError> {
        validate_range(&start, &end)?;
        Ok(QueryRange {
            project,
            access_site,
            granularity,
            start,
            end,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn access_site(&self) -> &str {
        &self.access_site
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn start(&self) -> &Timestamp {
        &self.start
    }

    pub fn end(&self) -> &Timestamp {
        &self.end
    }

    /// Builds a record from a storage row. Storage does not echo the key
    /// columns back, so they are filled in from the request.
    pub fn record(&self, row: DeviceRow) -> DeviceCountRecord {
        DeviceCountRecord {
            project: self.project.clone(),
            access_site: self.access_site.clone(),
            granularity: self.granularity,
            timestamp: row.timestamp,
            devices: row.devices,
            offset: row.offset,
            underestimate: row.underestimate,
        }
    }
}

/// A single bounded range scan, ready to be handed to a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeQuery {
    pub statement: &'static str,
    pub domain: &'static str,
    pub project: String,
    pub access_site: String,
    pub granularity: Granularity,
    pub start: String,
    pub end: String,
    pub consistency: Consistency,
}

impl RangeQuery {
    /// Bind values in statement order.
    pub fn values(&self) -> [&str; 6] {
        [
            self.domain,
            &self.project,
            &self.access_site,
            self.granularity.as_str(),
            &self.start,
            &self.end,
        ]
    }

    /// True when a row with the given key falls inside this scan.
    pub fn matches(
        &self,
        domain: &str,
        project: &str,
        access_site: &str,
        granularity: Granularity,
        timestamp: &str,
    ) -> bool {
        domain == self.domain
            && project == self.project
            && access_site == self.access_site
            && granularity == self.granularity
            && timestamp >= self.start.as_str()
            && timestamp <= self.end.as_str()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryPlanner {
    consistency: Consistency,
}

impl QueryPlanner {
    pub fn new(consistency: Consistency) -> Self {
        QueryPlanner { consistency }
    }

    pub fn plan(&self, range: &QueryRange) -> RangeQuery {
        RangeQuery {
            statement: SELECT_DEVICES,
            domain: DOMAIN,
            project: range.project.clone(),
            access_site: range.access_site.clone(),
            granularity: range.granularity,
            start: range.start.as_str().to_string(),
            end: range.end.as_str().to_string(),
            consistency: self.consistency,
        }
    }
}
