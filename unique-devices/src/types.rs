use crate::errors::DevicesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time bucket of a reported count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
    Hourly,
}

impl Granularity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Hourly => "hourly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = DevicesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Granularity::Daily),
            "monthly" => Ok(Granularity::Monthly),
            "hourly" => Ok(Granularity::Hourly),
            _ => Err(DevicesError::InvalidGranularity),
        }
    }
}

/// Raw path segments of a unique devices request, as extracted by the router.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RouteParams {
    pub project: String,
    pub access_site: String,
    pub granularity: String,
    pub start: String,
    pub end: String,
}

/// One unique devices count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCountRecord {
    pub project: String,
    #[serde(rename = "access-site")]
    pub access_site: String,
    pub granularity: Granularity,
    pub timestamp: String,
    pub devices: u64,
    pub offset: u64,
    pub underestimate: u64,
}

/// Response envelope. Items keep the order in which storage returned them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCountResponse {
    pub items: Vec<DeviceCountRecord>,
}
