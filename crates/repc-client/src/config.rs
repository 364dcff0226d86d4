//! Configuration types for sessions and the HTTP transport

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::id::IdStrategy;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Endpoint the session is bound to
    pub endpoint: String,

    /// Default headers merged into every request
    pub headers: HashMap<String, String>,

    /// Built-in id strategy
    pub id_strategy: IdStrategy,
}

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout
    #[serde(with = "duration_serde")]
    pub timeout: Duration,

    /// User agent string
    pub user_agent: Option<String>,

    /// Headers sent with every request; session and per-call headers take precedence
    pub headers: HashMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/rpc".to_string(),
            headers: HashMap::new(),
            id_strategy: IdStrategy::Sequential,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: Some(format!("repc/{}", env!("CARGO_PKG_VERSION"))),
            headers: HashMap::new(),
        }
    }
}

impl SessionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

// Helper module for Duration serialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_serialization() {
        let config = HttpConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout"], json!(30_000));

        let deserialized: HttpConfig = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_session_config_partial() {
        let config: SessionConfig = serde_json::from_value(json!({
            "endpoint": "http://rpc.internal:9000",
            "id_strategy": "uuid"
        }))
        .unwrap();

        assert_eq!(config.endpoint, "http://rpc.internal:9000");
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
        assert!(config.headers.is_empty());
    }
}
