use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported consistency: {0:?}")]
    UnsupportedConsistency(String),

    #[error("unsupported log level: {0:?}")]
    UnsupportedLogLevel(String),

    #[error("{0} must not be 0")]
    ZeroPort(&'static str),

    #[error("context_timeout must be greater than 0")]
    ZeroTimeout,

    #[error("cassandra.hosts must list at least one host")]
    NoHosts,
}

/// Read consistency level applied to every storage query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Consistency {
    Any,
    One,
    Two,
    Three,
    #[default]
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    LocalOne,
}

impl FromStr for Consistency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(Consistency::Any),
            "one" => Ok(Consistency::One),
            "two" => Ok(Consistency::Two),
            "three" => Ok(Consistency::Three),
            "quorum" => Ok(Consistency::Quorum),
            "all" => Ok(Consistency::All),
            "localquorum" => Ok(Consistency::LocalQuorum),
            "eachquorum" => Ok(Consistency::EachQuorum),
            "localone" => Ok(Consistency::LocalOne),
            _ => Err(ValidationError::UnsupportedConsistency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Consistency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Cassandra {
    pub port: u16,
    pub consistency: Consistency,
    pub hosts: Vec<String>,
    pub local_dc: Option<String>,
}

impl Default for Cassandra {
    fn default() -> Self {
        Cassandra {
            port: 9042,
            consistency: Consistency::default(),
            hosts: vec!["localhost".into()],
            local_dc: None,
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_uri: String,
    pub listen_address: String,
    pub listen_port: u16,
    /// Per-request storage deadline in milliseconds.
    pub context_timeout: u64,
    pub cassandra: Cassandra,
    pub admin_listener: Option<Listener>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_uri: "/metrics/unique-devices".into(),
            listen_address: "localhost".into(),
            listen_port: 8080,
            context_timeout: 40,
            cassandra: Cassandra::default(),
            admin_listener: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listen_port == 0 {
            return Err(ValidationError::ZeroPort("listen_port"));
        }
        if self.context_timeout == 0 {
            return Err(ValidationError::ZeroTimeout);
        }
        if self.cassandra.port == 0 {
            return Err(ValidationError::ZeroPort("cassandra.port"));
        }
        if self.cassandra.hosts.is_empty() {
            return Err(ValidationError::NoHosts);
        }
        if let Some(admin) = &self.admin_listener {
            if admin.port == 0 {
                return Err(ValidationError::ZeroPort("admin_listener.port"));
            }
        }
        Ok(())
    }

    /// `base_uri` with a leading slash and without a trailing one. Empty when
    /// the service is mounted at the root.
    pub fn route_prefix(&self) -> String {
        let trimmed = self.base_uri.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.context_timeout)
    }
}
