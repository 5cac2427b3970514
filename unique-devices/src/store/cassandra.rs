use super::{DecodedRow, DeviceRow, DeviceStore, RowCursor, RowDecodeError, StoreError};
use crate::config::{Cassandra as CassandraConfig, Consistency};
use crate::query::RangeQuery;
use async_trait::async_trait;
use futures::StreamExt;
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::errors::NextRowError;
use scylla::policies::load_balancing::DefaultPolicy;
use scylla::statement::Consistency as CqlConsistency;
use scylla::statement::unprepared::Statement;
use scylla::value::CqlValue;

/// Columns as selected: devices, offset, underestimate, timestamp.
type RawRow = (
    Option<CqlValue>,
    Option<CqlValue>,
    Option<CqlValue>,
    Option<String>,
);

impl From<Consistency> for CqlConsistency {
    fn from(consistency: Consistency) -> Self {
        match consistency {
            Consistency::Any => CqlConsistency::Any,
            Consistency::One => CqlConsistency::One,
            Consistency::Two => CqlConsistency::Two,
            Consistency::Three => CqlConsistency::Three,
            Consistency::Quorum => CqlConsistency::Quorum,
            Consistency::All => CqlConsistency::All,
            Consistency::LocalQuorum => CqlConsistency::LocalQuorum,
            Consistency::EachQuorum => CqlConsistency::EachQuorum,
            Consistency::LocalOne => CqlConsistency::LocalOne,
        }
    }
}

/// Store backed by a Cassandra cluster. The session owns the connection pool
/// and is shared by all requests.
pub struct CassandraStore {
    session: Session,
}

impl CassandraStore {
    pub async fn connect(config: &CassandraConfig) -> Result<Self, StoreError> {
        let nodes: Vec<String> = config
            .hosts
            .iter()
            .map(|host| format!("{host}:{}", config.port))
            .collect();

        let mut policy = DefaultPolicy::builder().token_aware(true);
        if let Some(local_dc) = &config.local_dc {
            policy = policy.prefer_datacenter(local_dc.clone());
        }

        let profile = ExecutionProfile::builder()
            .load_balancing_policy(policy.build())
            .consistency(config.consistency.into())
            .build();

        let session = SessionBuilder::new()
            .known_nodes(&nodes)
            .default_execution_profile_handle(profile.into_handle())
            .build()
            .await
            .map_err(|err| StoreError::Session(err.to_string()))?;

        tracing::info!(
            hosts = ?nodes,
            local_dc = config.local_dc.as_deref().unwrap_or("none"),
            "connected to cassandra"
        );

        Ok(CassandraStore { session })
    }
}

#[async_trait]
impl DeviceStore for CassandraStore {
    async fn query(&self, query: &RangeQuery) -> Result<RowCursor, StoreError> {
        let mut statement = Statement::new(query.statement);
        statement.set_consistency(query.consistency.into());

        let pager = self
            .session
            .query_iter(statement, query.values().to_vec())
            .await
            .map_err(|err| StoreError::Query(err.to_string()))?;

        let rows = pager
            .rows_stream::<RawRow>()
            .map_err(|err| StoreError::Query(err.to_string()))?;

        Ok(rows.map(next_row).boxed())
    }

    /// Ready while at least one node has an open connection pool.
    fn is_ready(&self) -> bool {
        self.session
            .get_cluster_state()
            .get_nodes_info()
            .iter()
            .any(|node| node.is_connected())
    }
}

/// A row that fails to deserialize only spoils itself; the pager moves on to
/// the next row. Any other error ends the stream.
fn next_row(item: Result<RawRow, NextRowError>) -> Result<DecodedRow, StoreError> {
    match item {
        Ok(raw) => Ok(decode_row(raw)),
        Err(NextRowError::RowDeserializationError(err)) => Ok(Err(RowDecodeError(err.to_string()))),
        Err(err) => Err(StoreError::Stream(err.to_string())),
    }
}

fn decode_row(raw: RawRow) -> DecodedRow {
    let (devices, offset, underestimate, timestamp) = raw;
    let timestamp = timestamp.ok_or_else(|| RowDecodeError("timestamp is null".into()))?;

    Ok(DeviceRow {
        devices: count("devices", devices)?,
        offset: count("offset", offset)?,
        underestimate: count("underestimate", underestimate)?,
        timestamp,
    })
}

fn count(column: &str, value: Option<CqlValue>) -> Result<u64, RowDecodeError> {
    let value = value.ok_or_else(|| RowDecodeError(format!("{column} is null")))?;
    let signed: i64 = match value {
        CqlValue::BigInt(v) => v,
        CqlValue::Int(v) => v.into(),
        CqlValue::SmallInt(v) => v.into(),
        CqlValue::TinyInt(v) => v.into(),
        CqlValue::Counter(counter) => counter.0,
        other => {
            return Err(RowDecodeError(format!(
                "{column} has unsupported type: {other:?}"
            )));
        }
    };

    u64::try_from(signed).map_err(|_| RowDecodeError(format!("{column} is negative: {signed}")))
}
