use hyperswitch_masking::Secret;
use serde::Deserialize;

use crate::mode::ModeContext;

/// Per-backend configuration, one field per registered adapter family.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Gateways {
    #[serde(default)]
    pub offline: OfflineConfig,
    pub braintree: Option<BraintreeConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct OfflineConfig {}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BraintreeEnvironment {
    Development,
    Qa,
    Sandbox,
    Production,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BraintreeConfig {
    pub merchant_id: Secret<String>,
    pub public_key: Secret<String>,
    pub private_key: Secret<String>,
    pub merchant_account_id: Option<String>,
    pub environment: Option<BraintreeEnvironment>,
}

impl BraintreeConfig {
    pub fn new(
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: Secret::new(merchant_id.into()),
            public_key: Secret::new(public_key.into()),
            private_key: Secret::new(private_key.into()),
            merchant_account_id: None,
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: BraintreeEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_merchant_account_id(mut self, merchant_account_id: impl Into<String>) -> Self {
        self.merchant_account_id = Some(merchant_account_id.into());
        self
    }

    /// An explicit environment wins; otherwise it follows the gateway mode.
    pub fn resolve_environment(&self, mode: &ModeContext) -> BraintreeEnvironment {
        self.environment.unwrap_or(if mode.is_test() {
            BraintreeEnvironment::Sandbox
        } else {
            BraintreeEnvironment::Production
        })
    }
}
