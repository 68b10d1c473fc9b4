use prana_core::payload::{PayloadDefaults, DEFAULT_BODY, DEFAULT_TITLE};

/// Server configuration loaded from environment variables.
///
/// Every field has a default suitable for local development. Push delivery is
/// configured separately by [`prana_events::FcmConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Upper bound on one trigger invocation, in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Shared secret expected in the `x-trigger-secret` header. Unset means
    /// triggers are accepted from anyone who can reach the server.
    pub trigger_secret: Option<String>,
    /// Title and body used for alerts that carry none.
    pub payload_defaults: PayloadDefaults,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default               |
    /// |------------------------|-----------------------|
    /// | `HOST`                 | `0.0.0.0`             |
    /// | `PORT`                 | `3000`                |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                  |
    /// | `TRIGGER_SECRET`       | unset                 |
    /// | `ALERT_DEFAULT_TITLE`  | `PRANA-G Alert`       |
    /// | `ALERT_DEFAULT_BODY`   | `New alert received.` |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let trigger_secret = std::env::var("TRIGGER_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let payload_defaults = PayloadDefaults {
            title: non_empty_var("ALERT_DEFAULT_TITLE").unwrap_or_else(|| DEFAULT_TITLE.into()),
            body: non_empty_var("ALERT_DEFAULT_BODY").unwrap_or_else(|| DEFAULT_BODY.into()),
        };

        Self {
            host,
            port,
            request_timeout_secs,
            trigger_secret,
            payload_defaults,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
