//! Metrics definitions for the unique devices service.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "unique_devices.request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to answer a unique devices request in seconds, tagged by status",
};

pub const RESPONSES: MetricDef = MetricDef {
    name: "unique_devices.responses",
    metric_type: MetricType::Counter,
    description: "Number of responses sent, tagged by status",
};

pub const ROWS_SKIPPED: MetricDef = MetricDef {
    name: "unique_devices.rows.skipped",
    metric_type: MetricType::Counter,
    description: "Number of storage rows dropped because they could not be decoded",
};

pub const QUERY_DURATION: MetricDef = MetricDef {
    name: "unique_devices.query.duration",
    metric_type: MetricType::Histogram,
    description: "Time spent querying storage and reading the cursor in seconds, tagged by outcome",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_DURATION, RESPONSES, ROWS_SKIPPED, QUERY_DURATION];

pub fn describe_all() {
    for def in ALL_METRICS {
        def.describe();
    }
}
