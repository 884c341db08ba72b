use common_enums::GatewayId;
use common_utils::MinorUnit;
use domain_types::{
    payment_method_data::{CreditCard, PaymentSource, VaultId},
    router_request_types::GatewayOptions,
    router_response_types::Response,
};

/// Identity shared by every adapter.
pub trait GatewayCommon {
    fn id(&self) -> GatewayId;

    fn display_name(&self) -> &'static str;
}

/// The uniform operation set.
///
/// Every operation is total: transaction failures come back as an
/// unsuccessful [`Response`], never as an error or a panic.
pub trait Gateway: GatewayCommon + Send + Sync {
    fn authorize(
        &self,
        money: MinorUnit,
        source: &PaymentSource,
        options: &GatewayOptions,
    ) -> Response;

    fn purchase(&self, money: MinorUnit, source: &PaymentSource, options: &GatewayOptions)
        -> Response;

    /// `money: None` settles the full authorized amount.
    fn capture(
        &self,
        money: Option<MinorUnit>,
        authorization: &str,
        options: &GatewayOptions,
    ) -> Response;

    /// `money: None` refunds the full remaining amount.
    fn refund(
        &self,
        money: Option<MinorUnit>,
        authorization: &str,
        options: &GatewayOptions,
    ) -> Response;

    fn void(&self, authorization: &str, options: &GatewayOptions) -> Response;

    fn store(&self, card: &CreditCard, options: &GatewayOptions) -> Response;

    fn unstore(&self, vault_id: &VaultId, options: &GatewayOptions) -> Response;

    fn update(&self, vault_id: &VaultId, card: &CreditCard, options: &GatewayOptions) -> Response;

    fn verify(&self, vault_id: &VaultId, token: &str) -> Response;

    fn find_customer(&self, vault_id: &VaultId) -> Response;

    fn delete(&self, vault_id: &VaultId, options: &GatewayOptions) -> Response {
        self.unstore(vault_id, options)
    }
}

pub type BoxedGateway = Box<dyn Gateway>;
