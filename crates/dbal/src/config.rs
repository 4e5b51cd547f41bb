//! Connection configuration.
//!
//! Connection settings are stored as a map of named configurations, commonly
//! loaded from JSON. Which named entry is active is selected on the
//! [`crate::Db`] handle via `connection(name)`; actually dialing the server
//! is the [`crate::connection::Connector`] implementor's business.

use crate::error::DbalResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings for one named database connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl ConnectionConfig {
    /// Parse a single configuration from a JSON object string.
    ///
    /// # Example
    /// ```ignore
    /// let cfg = ConnectionConfig::from_json(
    ///     r#"{"host":"db1","database":"app","username":"svc","password":"secret"}"#,
    /// )?;
    /// ```
    pub fn from_json(json: &str) -> DbalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parse a map of named connection configurations from JSON.
pub fn parse_connection_map(json: &str) -> DbalResult<HashMap<String, ConnectionConfig>> {
    Ok(serde_json::from_str(json)?)
}
