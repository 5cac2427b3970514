use crate::store::StoreError;
use crate::timestamp::TimestampError;
use http::StatusCode;
use std::fmt;
use std::time::Duration;

pub const NO_DATA_DETAIL: &str = "The date(s) you used are valid, but we either do not have data for those date(s), or the project you asked for is not loaded yet.";

/// Which end of the requested range a timestamp error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Start => f.write_str("start"),
            Bound::End => f.write_str("end"),
        }
    }
}

/// Every way a unique devices request can end without a 200.
///
/// The `Display` output is used verbatim as the problem `detail`. Storage
/// failures carry the driver's message as-is.
#[derive(thiserror::Error, Debug)]
pub enum DevicesError {
    #[error("Invalid granularity")]
    InvalidGranularity,

    #[error("{0} timestamp is invalid, must be a valid date in YYYYMMDD format")]
    InvalidTimestamp(Bound),

    #[error("{0}")]
    InvalidRange(TimestampError),

    #[error("{0}")]
    InvalidPath(String),

    #[error("{}", NO_DATA_DETAIL)]
    NoData,

    #[error("{0}")]
    Query(StoreError),

    #[error("{0}")]
    Cursor(StoreError),

    #[error("storage query exceeded the {0:?} deadline")]
    Timeout(Duration),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid route")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl DevicesError {
    pub fn status(&self) -> StatusCode {
        match self {
            DevicesError::InvalidGranularity
            | DevicesError::InvalidTimestamp(_)
            | DevicesError::InvalidRange(_)
            | DevicesError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            DevicesError::NoData | DevicesError::RouteNotFound => StatusCode::NOT_FOUND,
            DevicesError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            DevicesError::Query(_)
            | DevicesError::Cursor(_)
            | DevicesError::Timeout(_)
            | DevicesError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UniqueDevicesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::ValidationError),
}
