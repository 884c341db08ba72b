//! Process-facing entry point: operating mode and gateway lookup.

use std::sync::Arc;

use common_enums::{GatewayKind, Mode};
use common_utils::CustomResult;
use connector_integration::{
    connectors::braintree::BraintreeTransport,
    registry,
    types::{GatewayContext, GatewayData, Transports},
};
use domain_types::{
    errors::{GatewayError, UnknownGatewayError},
    mode::ModeContext,
    types::Gateways,
};
use error_stack::ResultExt;
use interfaces::gateway_types::BoxedGateway;

use crate::configs::Config;

/// Owns the mode context, the configured credentials and the remote
/// transports. Gateways built from it capture the gateway mode current at
/// construction time.
#[derive(Clone, Default)]
pub struct Base {
    context: GatewayContext,
}

impl Base {
    pub fn new(mode: Mode) -> Self {
        Self {
            context: GatewayContext {
                mode: ModeContext::new(mode),
                ..Default::default()
            },
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            context: GatewayContext {
                mode: ModeContext::from(&config.mode),
                gateways: config.gateways.clone(),
                transports: Transports::default(),
            },
        }
    }

    pub fn with_gateways(mut self, gateways: Gateways) -> Self {
        self.context.gateways = gateways;
        self
    }

    pub fn with_braintree_transport(mut self, transport: Arc<dyn BraintreeTransport>) -> Self {
        self.context.transports.braintree = Some(transport);
        self
    }

    pub fn mode(&self) -> Mode {
        self.context.mode.mode()
    }

    /// Sets every mode axis at once.
    pub fn set_mode(&mut self, mode: Mode) {
        tracing::info!(%mode, "switching operating mode");
        self.context.mode.set_mode(mode);
    }

    pub fn gateway_mode(&self) -> Mode {
        self.context.mode.gateway_mode()
    }

    pub fn set_gateway_mode(&mut self, mode: Mode) {
        self.context.mode.set_gateway_mode(mode);
    }

    pub fn integration_mode(&self) -> Mode {
        self.context.mode.integration_mode()
    }

    pub fn set_integration_mode(&mut self, mode: Mode) {
        self.context.mode.set_integration_mode(mode);
    }

    pub fn mode_context(&self) -> &ModeContext {
        &self.context.mode
    }

    /// Resolves a symbolic gateway name to its implementation.
    pub fn gateway(&self, name: &str) -> CustomResult<GatewayKind, UnknownGatewayError> {
        registry::resolve(name)
    }

    /// Resolves `name` and constructs the adapter for the current mode.
    pub fn build_gateway(&self, name: &str) -> CustomResult<BoxedGateway, GatewayError> {
        let kind = self.gateway(name).map_err(|report| {
            let context = GatewayError::from(report.current_context().clone());
            report.change_context(context)
        })?;
        GatewayData::get_gateway_by_name(kind, &self.context)
            .attach_printable_lazy(|| format!("while building gateway `{name}`"))
            .map(|data| data.gateway)
    }
}
