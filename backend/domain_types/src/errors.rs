/// Raised when a symbolic gateway name has no registered implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to load gateway `{name}`: no implementation named {type_name}")]
pub struct UnknownGatewayError {
    pub name: String,
    pub type_name: String,
}

impl UnknownGatewayError {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Configuration and construction faults. Transaction outcomes never use
/// this type; they always become a failed `Response`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Unknown gateway `{name}`")]
    UnknownGateway { name: String },
    #[error("Missing credentials for gateway `{gateway}`")]
    MissingCredentials { gateway: &'static str },
    #[error("No remote transport configured for gateway `{gateway}`")]
    MissingTransport { gateway: &'static str },
}

impl From<UnknownGatewayError> for GatewayError {
    fn from(error: UnknownGatewayError) -> Self {
        Self::UnknownGateway { name: error.name }
    }
}
