use common_enums::{FailureKind, GatewayAction, GatewayId};
use common_utils::consts::OK_MESSAGE;
use domain_types::router_response_types::Response;

use crate::outcome::{Entity, GatewayOutcome, ValidationError, ValidationKind};

/// Converts a classified backend outcome into the unified [`Response`].
#[derive(Clone, Copy, Debug)]
pub struct ErrorTranslator {
    gateway: GatewayId,
    test: bool,
}

impl ErrorTranslator {
    pub fn new(gateway: GatewayId, test: bool) -> Self {
        Self { gateway, test }
    }

    pub fn classify(&self, action: GatewayAction, outcome: GatewayOutcome) -> Response {
        match outcome {
            GatewayOutcome::SuccessWithEntity(entity) => {
                let message = entity
                    .status_message
                    .clone()
                    .unwrap_or_else(|| OK_MESSAGE.to_string());
                tracing::debug!(gateway = %self.gateway, %action, "backend call succeeded");
                self.with_entity(action, true, message, entity)
            }
            GatewayOutcome::Declined {
                declination,
                entity,
            } => {
                let message = declination.message();
                tracing::info!(
                    gateway = %self.gateway,
                    %action,
                    code = %declination.code,
                    "processor declined"
                );
                self.with_entity(action, false, message, entity)
                    .with_failure_kind(FailureKind::ProcessorDeclined)
            }
            GatewayOutcome::NotFound { fault } => {
                tracing::info!(
                    gateway = %self.gateway,
                    %action,
                    fault,
                    "referenced resource not found"
                );
                self.failure(action, fault, FailureKind::NotFound)
            }
            GatewayOutcome::AuthFailure { fault } => {
                tracing::warn!(
                    gateway = %self.gateway,
                    %action,
                    fault,
                    "backend rejected credentials"
                );
                self.failure(action, fault, FailureKind::Authentication)
            }
            GatewayOutcome::Validation { errors, references } => {
                let message = validation_message(&errors);
                let duplicate = errors
                    .iter()
                    .any(|error| error.kind == ValidationKind::Duplicate);
                tracing::info!(
                    gateway = %self.gateway,
                    %action,
                    duplicate,
                    %message,
                    "validation failed"
                );
                self.failure(action, message, FailureKind::Validation)
                    .with_authorization(references.authorization_for(action))
            }
        }
    }

    fn with_entity(
        &self,
        action: GatewayAction,
        success: bool,
        message: String,
        entity: Entity,
    ) -> Response {
        let authorization = entity.references.authorization_for(action);
        Response::new(self.gateway, action, success, message)
            .with_params(entity.params)
            .with_authorization(authorization)
            .with_avs_result(entity.avs_result)
            .with_cvv_result(entity.cvv_result)
            .with_test(self.test)
    }

    fn failure(
        &self,
        action: GatewayAction,
        message: impl Into<String>,
        kind: FailureKind,
    ) -> Response {
        Response::new(self.gateway, action, false, message)
            .with_failure_kind(kind)
            .with_test(self.test)
    }
}

fn validation_message(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join(" ")
}
