//! Coordination Service Client
//!
//! Boundary to the coordination service (etcd) shared by drivers that need
//! cluster-wide state, such as index rotation locks. The selector only hands
//! the client to drivers and never calls it.

use std::fmt::Debug;

use crate::config::ConfigSource;
use crate::constants::CONFIG_ETCD_SERVERS_KEY;

/// Handle on the coordination service.
pub trait CoordinationClient: Send + Sync + Debug {
    /// Endpoints the client talks to.
    fn endpoints(&self) -> &[String];
}

/// Client with a fixed list of endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCoordinationClient {
    endpoints: Vec<String>,
}

impl StaticCoordinationClient {
    /// Create a client for the given endpoints.
    ///
    /// # Panics
    /// Panics if `endpoints` is empty.
    #[must_use]
    pub fn new(endpoints: Vec<String>) -> Self {
        assert!(!endpoints.is_empty(), "coordination client needs an endpoint");
        Self { endpoints }
    }

    /// Build a client from `etcd.servers`. `None` when no server is set.
    #[must_use]
    pub fn from_config(config: &dyn ConfigSource) -> Option<Self> {
        let endpoints = config.get_string_list(CONFIG_ETCD_SERVERS_KEY);
        if endpoints.is_empty() {
            return None;
        }
        Some(Self::new(endpoints))
    }
}

impl CoordinationClient for StaticCoordinationClient {
    fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_from_config() {
        let config = Config::new().with("etcd.servers", "http://a:2379, http://b:2379");
        let client = StaticCoordinationClient::from_config(&config).unwrap();
        assert_eq!(client.endpoints(), ["http://a:2379", "http://b:2379"]);
    }

    #[test]
    fn test_from_config_without_servers() {
        assert!(StaticCoordinationClient::from_config(&Config::new()).is_none());
    }
}
