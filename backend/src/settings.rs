//! Application settings loaded via OrthoConfig.
//!
//! Values come from `CAMPUS_QA_*` environment variables, command-line flags,
//! or a configuration file, in OrthoConfig's usual precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_EMAIL_PATTERN, EmailPolicy};

/// Server and persistence settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS_QA")]
pub struct AppSettings {
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Regular expression accepted institutional emails must match.
    pub email_pattern: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
}

impl AppSettings {
    /// Listen address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    /// Configured connection string, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Compile the configured email pattern.
    ///
    /// # Errors
    /// Returns the regex error when the pattern does not compile.
    pub fn email_policy(&self) -> Result<EmailPolicy, regex::Error> {
        EmailPolicy::new(self.email_pattern.as_deref().unwrap_or(DEFAULT_EMAIL_PATTERN))
    }
}
