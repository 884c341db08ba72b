use common_enums::GatewayAction;
use domain_types::router_response_types::{AvsResult, CvvResult, Params};

/// Stable references a backend call produced or acted upon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct References {
    pub vault_id: Option<String>,
    pub transaction_id: Option<String>,
}

impl References {
    pub fn vault(vault_id: impl Into<String>) -> Self {
        Self {
            vault_id: Some(vault_id.into()),
            transaction_id: None,
        }
    }

    pub fn transaction(transaction_id: impl Into<String>) -> Self {
        Self {
            vault_id: None,
            transaction_id: Some(transaction_id.into()),
        }
    }

    /// The most specific reference for follow-up calls: vault-oriented
    /// actions prefer the vault id, all others the transaction id.
    pub fn authorization_for(&self, action: GatewayAction) -> Option<String> {
        let (preferred, fallback) = if action.is_vault_oriented() {
            (&self.vault_id, &self.transaction_id)
        } else {
            (&self.transaction_id, &self.vault_id)
        };
        preferred.clone().or_else(|| fallback.clone())
    }
}

/// Everything a backend exposed about the entity it operated on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    pub params: Params,
    pub references: References,
    /// Backend-provided status text, e.g. a processor response.
    pub status_message: Option<String>,
    pub avs_result: AvsResult,
    pub cvv_result: CvvResult,
}

impl Entity {
    pub fn new(params: Params, references: References) -> Self {
        Self {
            params,
            references,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclinationSource {
    Transaction,
    Verification,
}

/// A processor business-rule rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declination {
    pub source: DeclinationSource,
    pub code: String,
    pub text: String,
}

impl Declination {
    pub fn message(&self) -> String {
        match self.source {
            DeclinationSource::Transaction => format!("{} {}", self.code, self.text),
            DeclinationSource::Verification => {
                format!("Processor declined: {} ({})", self.text, self.code)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationKind {
    Invalid,
    /// The resource already exists under duplicate prevention.
    Duplicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub code: String,
    pub description: String,
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn message(&self) -> String {
        format!("{}. ({})", self.description.trim_end_matches('.'), self.code)
    }
}

/// Closed set of outcomes an adapter classifies each backend call into.
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayOutcome {
    SuccessWithEntity(Entity),
    Declined {
        declination: Declination,
        entity: Entity,
    },
    NotFound {
        fault: &'static str,
    },
    AuthFailure {
        fault: &'static str,
    },
    Validation {
        errors: Vec<ValidationError>,
        references: References,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_prefers_vault_id_for_vault_actions() {
        let references = References {
            vault_id: Some("V1".to_string()),
            transaction_id: Some("txn".to_string()),
        };
        assert_eq!(
            references.authorization_for(GatewayAction::Store).as_deref(),
            Some("V1")
        );
        assert_eq!(
            references.authorization_for(GatewayAction::Purchase).as_deref(),
            Some("txn")
        );
        assert_eq!(
            References::vault("V1")
                .authorization_for(GatewayAction::Purchase)
                .as_deref(),
            Some("V1")
        );
    }

    #[test]
    fn declination_messages_depend_on_source() {
        let mut declination = Declination {
            source: DeclinationSource::Transaction,
            code: "2000".to_string(),
            text: "Do Not Honor".to_string(),
        };
        assert_eq!(declination.message(), "2000 Do Not Honor");
        declination.source = DeclinationSource::Verification;
        assert_eq!(declination.message(), "Processor declined: Do Not Honor (2000)");
    }

    #[test]
    fn validation_message_carries_code_suffix() {
        let error = ValidationError {
            code: "81724".to_string(),
            description: "Duplicate card exists in the vault".to_string(),
            kind: ValidationKind::Duplicate,
        };
        assert_eq!(error.message(), "Duplicate card exists in the vault. (81724)");
    }
}
