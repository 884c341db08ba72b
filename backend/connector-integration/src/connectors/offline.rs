use common_enums::{GatewayAction, GatewayId};
use common_utils::MinorUnit;
use domain_types::{
    mode::ModeContext,
    payment_method_data::{CreditCard, PaymentSource, VaultId},
    router_request_types::GatewayOptions,
    router_response_types::{Params, Response},
};
use interfaces::gateway_types::{Gateway, GatewayCommon};
use serde_json::Value;

/// Gateway that never talks to a backend. Every operation succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline {
    test: bool,
}

impl Offline {
    pub fn new(mode: &ModeContext) -> Self {
        Self {
            test: mode.is_test(),
        }
    }

    fn respond(&self, action: GatewayAction) -> Response {
        tracing::debug!(gateway = %GatewayId::Offline, %action, "offline gateway call");
        let mut params = Params::new();
        params.insert("raw_response".to_string(), Value::String(String::new()));
        Response::new(GatewayId::Offline, action, true, "")
            .with_params(params)
            .with_test(self.test)
    }
}

impl GatewayCommon for Offline {
    fn id(&self) -> GatewayId {
        GatewayId::Offline
    }

    fn display_name(&self) -> &'static str {
        "Offline"
    }
}

impl Gateway for Offline {
    fn authorize(
        &self,
        _money: MinorUnit,
        _source: &PaymentSource,
        _options: &GatewayOptions,
    ) -> Response {
        self.respond(GatewayAction::Authorize)
    }

    fn purchase(
        &self,
        _money: MinorUnit,
        _source: &PaymentSource,
        _options: &GatewayOptions,
    ) -> Response {
        self.respond(GatewayAction::Purchase)
    }

    fn capture(
        &self,
        _money: Option<MinorUnit>,
        _authorization: &str,
        _options: &GatewayOptions,
    ) -> Response {
        self.respond(GatewayAction::Capture)
    }

    fn refund(
        &self,
        _money: Option<MinorUnit>,
        _authorization: &str,
        _options: &GatewayOptions,
    ) -> Response {
        self.respond(GatewayAction::Refund)
    }

    fn void(&self, _authorization: &str, _options: &GatewayOptions) -> Response {
        self.respond(GatewayAction::Void)
    }

    fn store(&self, _card: &CreditCard, _options: &GatewayOptions) -> Response {
        self.respond(GatewayAction::Store)
    }

    fn unstore(&self, _vault_id: &VaultId, _options: &GatewayOptions) -> Response {
        self.respond(GatewayAction::Unstore)
    }

    fn update(
        &self,
        _vault_id: &VaultId,
        _card: &CreditCard,
        _options: &GatewayOptions,
    ) -> Response {
        self.respond(GatewayAction::Update)
    }

    fn verify(&self, _vault_id: &VaultId, _token: &str) -> Response {
        self.respond(GatewayAction::Verify)
    }

    fn find_customer(&self, _vault_id: &VaultId) -> Response {
        self.respond(GatewayAction::FindCustomer)
    }
}
