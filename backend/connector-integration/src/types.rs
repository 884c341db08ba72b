use std::sync::Arc;

use common_enums::GatewayKind;
use common_utils::CustomResult;
use domain_types::{errors::GatewayError, mode::ModeContext, types::Gateways};
use error_stack::report;
use interfaces::gateway_types::BoxedGateway;

use crate::connectors::{self, braintree::BraintreeTransport};

/// Remote services the adapters talk to, injected by the embedding process.
#[derive(Clone, Default)]
pub struct Transports {
    pub braintree: Option<Arc<dyn BraintreeTransport>>,
}

/// Everything gateway construction reads.
#[derive(Clone, Default)]
pub struct GatewayContext {
    pub mode: ModeContext,
    pub gateways: Gateways,
    pub transports: Transports,
}

pub struct GatewayData {
    pub gateway: BoxedGateway,
    pub gateway_kind: GatewayKind,
}

impl GatewayData {
    pub fn get_gateway_by_name(
        gateway_kind: GatewayKind,
        context: &GatewayContext,
    ) -> CustomResult<Self, GatewayError> {
        let gateway = Self::convert_gateway(gateway_kind, context)?;
        tracing::debug!(
            gateway = gateway_kind.type_name(),
            test = context.mode.is_test(),
            "constructed gateway"
        );
        Ok(Self {
            gateway,
            gateway_kind,
        })
    }

    fn convert_gateway(
        gateway_kind: GatewayKind,
        context: &GatewayContext,
    ) -> CustomResult<BoxedGateway, GatewayError> {
        match gateway_kind {
            GatewayKind::Offline => Ok(Box::new(connectors::Offline::new(&context.mode))),
            GatewayKind::Braintree | GatewayKind::BraintreeBlue | GatewayKind::BraintreeVault => {
                let config = context.gateways.braintree.as_ref().ok_or_else(|| {
                    report!(GatewayError::MissingCredentials {
                        gateway: gateway_kind.type_name(),
                    })
                    .attach_printable("no [gateways.braintree] section configured")
                })?;
                let transport = context.transports.braintree.as_ref().ok_or_else(|| {
                    report!(GatewayError::MissingTransport {
                        gateway: gateway_kind.type_name(),
                    })
                })?;
                Ok(Box::new(connectors::Braintree::connect(
                    transport.as_ref(),
                    config,
                    &context.mode,
                )))
            }
        }
    }
}
