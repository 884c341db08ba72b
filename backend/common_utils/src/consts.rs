/// Suffix every gateway implementation type name carries.
pub const GATEWAY_TYPE_SUFFIX: &str = "Gateway";

/// Message attached to a successful response when the backend reports no status.
pub const OK_MESSAGE: &str = "OK";

/// Prefix for environment variables overriding configuration.
pub const ENV_PREFIX: &str = "GATEWAY";

/// Environment variable selecting the configuration file.
pub const RUN_ENV: &str = "GATEWAY_ENV";

/// Length of vault ids generated by a backend when the caller supplies none.
pub const VAULT_ID_LENGTH: usize = 8;

/// Length of card tokens generated by a backend.
pub const CARD_TOKEN_LENGTH: usize = 6;

/// Length of transaction ids generated by a backend.
pub const TRANSACTION_ID_LENGTH: usize = 8;

/// Deployment environment of the service process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Env {
    #[default]
    Development,
    Sandbox,
    Production,
}

impl Env {
    /// Reads the environment from `GATEWAY_ENV`, falling back to development.
    pub fn current_env() -> Self {
        match std::env::var(RUN_ENV).as_deref() {
            Ok("production") => Self::Production,
            Ok("sandbox") => Self::Sandbox,
            _ => Self::Development,
        }
    }

    pub const fn config_path(self) -> &'static str {
        match self {
            Self::Development => "development.toml",
            Self::Sandbox => "sandbox.toml",
            Self::Production => "production.toml",
        }
    }
}

impl std::fmt::Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Sandbox => write!(f, "sandbox"),
            Self::Production => write!(f, "production"),
        }
    }
}
