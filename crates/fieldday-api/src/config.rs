//! Server configuration read from the environment.

use std::net::SocketAddr;

use fieldday_core::identity::EditorIdentity;

use crate::error::AppError;

/// Identifier of the fallback editor when requests carry no editor headers.
pub const DEFAULT_EDITOR_ID: &str = "organizer";

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// `PostgreSQL` connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    /// Display name of the fallback editor.
    pub default_editor: String,
}

impl ApiConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let database_max_connections = match non_empty("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?,
            None => 10,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_max_connections,
            default_editor: non_empty("FIELDDAY_DEFAULT_EDITOR")
                .unwrap_or_else(|| "Organizer".to_string()),
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// The identity used when a request names no editor.
    #[must_use]
    pub fn default_editor(&self) -> EditorIdentity {
        EditorIdentity::new(DEFAULT_EDITOR_ID, self.default_editor.clone())
    }
}
