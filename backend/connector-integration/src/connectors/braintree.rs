#[cfg(any(test, feature = "sandbox"))]
pub mod sandbox;
pub mod transformers;

use std::sync::Arc;

use common_enums::{GatewayAction, GatewayId};
use common_utils::{MinorUnit, StringMajorUnit};
use domain_types::{
    mode::ModeContext,
    normalizer::{self, CREDIT_CARD, OPTIONS},
    payment_method_data::{CreditCard, PaymentSource, VaultId},
    router_request_types::{AddressInput, GatewayOptions, StoreOption},
    router_response_types::{Params, Response},
    types::{BraintreeConfig, BraintreeEnvironment},
};
use interfaces::{
    gateway_types::{Gateway, GatewayCommon},
    outcome::{Entity, GatewayOutcome, References},
    translator::ErrorTranslator,
};
use serde_json::{json, Value};
use transformers::{
    classify_result, customer_hash, insert_some, transaction_hash, verification_hash,
    BraintreeFault, BraintreeResult,
};

pub const DISPLAY_NAME: &str = "Braintree (Blue Platform)";

type ApiResult = Result<BraintreeResult, BraintreeFault>;

/// Calls of the Braintree client library this adapter relies on.
///
/// Request bodies are passed as parameter mappings in the shape the client
/// library accepts; results come back as native Braintree objects.
pub trait BraintreeApi: Send + Sync {
    fn customer_find(&self, customer_id: &str) -> ApiResult;

    fn customer_create(&self, params: &Params) -> ApiResult;

    fn customer_update(&self, customer_id: &str, params: &Params) -> ApiResult;

    fn customer_delete(&self, customer_id: &str) -> ApiResult;

    fn credit_card_create(&self, params: &Params) -> ApiResult;

    fn credit_card_verify(&self, customer_id: &str, token: &str) -> ApiResult;

    fn transaction_sale(&self, params: &Params) -> ApiResult;

    fn transaction_submit_for_settlement(
        &self,
        transaction_id: &str,
        amount: Option<&StringMajorUnit>,
    ) -> ApiResult;

    fn transaction_void(&self, transaction_id: &str) -> ApiResult;

    fn transaction_refund(
        &self,
        transaction_id: &str,
        amount: Option<&StringMajorUnit>,
    ) -> ApiResult;
}

/// Opens an API client for a set of credentials.
pub trait BraintreeTransport: Send + Sync {
    fn connect(
        &self,
        config: &BraintreeConfig,
        environment: BraintreeEnvironment,
    ) -> Arc<dyn BraintreeApi>;
}

pub struct Braintree {
    api: Arc<dyn BraintreeApi>,
    merchant_account_id: Option<String>,
    translator: ErrorTranslator,
}

impl Braintree {
    pub fn new(api: Arc<dyn BraintreeApi>, config: &BraintreeConfig, mode: &ModeContext) -> Self {
        Self {
            api,
            merchant_account_id: config.merchant_account_id.clone(),
            translator: ErrorTranslator::new(GatewayId::BraintreeVault, mode.is_test()),
        }
    }

    /// Connects through `transport` against the environment the
    /// credentials and gateway mode select.
    pub fn connect(
        transport: &dyn BraintreeTransport,
        config: &BraintreeConfig,
        mode: &ModeContext,
    ) -> Self {
        let environment = config.resolve_environment(mode);
        tracing::debug!(%environment, "connecting braintree client");
        Self::new(transport.connect(config, environment), config, mode)
    }

    fn sale(
        &self,
        action: GatewayAction,
        money: MinorUnit,
        source: &PaymentSource,
        options: &GatewayOptions,
    ) -> Response {
        let _span = self.span(action);
        let submit_for_settlement = action == GatewayAction::Purchase;
        let params = self.sale_params(money, source, options, submit_for_settlement);
        let store_requested = options
            .store
            .as_ref()
            .is_some_and(StoreOption::is_requested);

        let outcome = classify_result(
            self.api.transaction_sale(&params),
            References::default(),
            |result| sale_entity(result, store_requested),
        );
        self.translator.classify(action, outcome)
    }

    fn sale_params(
        &self,
        money: MinorUnit,
        source: &PaymentSource,
        options: &GatewayOptions,
        submit_for_settlement: bool,
    ) -> Params {
        let store_requested = options
            .store
            .as_ref()
            .is_some_and(StoreOption::is_requested);

        let mut customer = Params::new();
        insert_some(
            &mut customer,
            "id",
            options
                .store
                .as_ref()
                .and_then(StoreOption::vault_id)
                .map(|id| Value::String(id.to_string())),
        );
        insert_some(&mut customer, "email", options.email.to_json());

        let mut params = Params::new();
        params.insert(
            "amount".to_string(),
            Value::String(money.to_major_unit_string().to_string()),
        );
        insert_some(
            &mut params,
            "order_id",
            options.order_id.clone().map(Value::String),
        );

        match source {
            PaymentSource::Card(card) => {
                insert_some(
                    &mut customer,
                    "first_name",
                    card.first_name.clone().map(Value::String),
                );
                insert_some(
                    &mut customer,
                    "last_name",
                    card.last_name.clone().map(Value::String),
                );
                params.insert(
                    CREDIT_CARD.to_string(),
                    Value::Object(normalizer::card_params(card, None).into_params()),
                );
            }
            PaymentSource::Vault(vault_id) => {
                params.insert(
                    "customer_id".to_string(),
                    Value::String(vault_id.to_string()),
                );
            }
        }

        params.insert("customer".to_string(), Value::Object(customer));
        params.insert(
            OPTIONS.to_string(),
            json!({
                "store_in_vault": store_requested,
                "submit_for_settlement": submit_for_settlement,
            }),
        );
        if options.recurring == Some(true) {
            params.insert("recurring".to_string(), Value::Bool(true));
        }
        insert_some(
            &mut params,
            "merchant_account_id",
            options
                .merchant_account_id
                .clone()
                .or_else(|| self.merchant_account_id.clone())
                .map(Value::String),
        );
        insert_some(&mut params, "billing", address_block(&options.billing_address));
        insert_some(
            &mut params,
            "shipping",
            address_block(&options.shipping_address),
        );
        params
    }

    /// Adds the card to an existing customer, or creates the customer with
    /// the card when `options.id` is not yet in the vault.
    fn store_card(&self, card: &CreditCard, options: &GatewayOptions) -> GatewayOutcome {
        let references = options
            .id
            .as_ref()
            .map(|id| References::vault(id.as_str()))
            .unwrap_or_default();

        let existing = match options.id.as_ref() {
            Some(id) => match self.api.customer_find(id.as_str()) {
                Ok(result) => result.customer,
                Err(BraintreeFault::NotFound) => None,
                Err(fault) => return fault.into(),
            },
            None => None,
        };

        match existing {
            Some(customer) => {
                tracing::debug!(customer_id = %customer.id, "adding card to existing customer");
                let card_params = credit_card_object(&normalizer::merge_credit_card_options(
                    &wrap_credit_card(
                        normalizer::card_params(card, options.id.as_ref()).into_params(),
                    ),
                    options,
                ));
                let result = self.api.credit_card_create(&card_params).map(|mut result| {
                    if let Some(new_card) = result.credit_card.clone() {
                        let mut owner = customer.clone();
                        owner.credit_cards.push(new_card);
                        result.customer = Some(owner);
                    }
                    result
                });
                classify_result(result, references.clone(), |result| {
                    vault_entity(result, references)
                })
            }
            None => {
                let mut params = Params::new();
                insert_some(
                    &mut params,
                    "id",
                    options.id.as_ref().map(|id| Value::String(id.to_string())),
                );
                insert_some(&mut params, "email", options.email.to_json());
                insert_some(
                    &mut params,
                    "first_name",
                    card.first_name.clone().map(Value::String),
                );
                insert_some(
                    &mut params,
                    "last_name",
                    card.last_name.clone().map(Value::String),
                );
                params.insert(
                    CREDIT_CARD.to_string(),
                    Value::Object(normalizer::card_params(card, None).into_params()),
                );
                let params = normalizer::merge_credit_card_options(&params, options);
                classify_result(
                    self.api.customer_create(&params),
                    references.clone(),
                    |result| vault_entity(result, references),
                )
            }
        }
    }

    fn update_customer(
        &self,
        vault_id: &VaultId,
        card: &CreditCard,
        options: &GatewayOptions,
    ) -> GatewayOutcome {
        let references = References::vault(vault_id.as_str());
        let customer = match self.api.customer_find(vault_id.as_str()) {
            Ok(result) => result.customer,
            Err(fault) => return fault.into(),
        };
        let Some(token) = customer
            .as_ref()
            .and_then(|customer| customer.default_credit_card())
            .map(|card| card.token.clone())
        else {
            tracing::info!(customer_id = %vault_id, "customer has no default card to update");
            return BraintreeFault::NotFound.into();
        };

        let mut card_params = normalizer::card_params(card, None).into_params();
        card_params.insert(
            OPTIONS.to_string(),
            json!({ "update_existing_token": token }),
        );

        let mut params = Params::new();
        insert_some(
            &mut params,
            "first_name",
            card.first_name.clone().map(Value::String),
        );
        insert_some(
            &mut params,
            "last_name",
            card.last_name.clone().map(Value::String),
        );
        insert_some(&mut params, "email", options.email.to_json());
        params.insert(CREDIT_CARD.to_string(), Value::Object(card_params));
        let params = normalizer::merge_credit_card_options(&params, options);

        classify_result(
            self.api.customer_update(vault_id.as_str(), &params),
            references.clone(),
            |result| vault_entity(result, references),
        )
    }

    fn transaction_call(
        &self,
        action: GatewayAction,
        authorization: &str,
        result: ApiResult,
    ) -> Response {
        let references = References::transaction(authorization);
        let outcome = classify_result(result, references.clone(), |result| {
            transaction_entity(result, references)
        });
        self.translator.classify(action, outcome)
    }

    fn span(&self, action: GatewayAction) -> tracing::span::EnteredSpan {
        tracing::info_span!("gateway_call", gateway = %GatewayId::BraintreeVault, %action).entered()
    }
}

impl GatewayCommon for Braintree {
    fn id(&self) -> GatewayId {
        GatewayId::BraintreeVault
    }

    fn display_name(&self) -> &'static str {
        DISPLAY_NAME
    }
}

impl Gateway for Braintree {
    fn authorize(
        &self,
        money: MinorUnit,
        source: &PaymentSource,
        options: &GatewayOptions,
    ) -> Response {
        self.sale(GatewayAction::Authorize, money, source, options)
    }

    fn purchase(
        &self,
        money: MinorUnit,
        source: &PaymentSource,
        options: &GatewayOptions,
    ) -> Response {
        self.sale(GatewayAction::Purchase, money, source, options)
    }

    fn capture(
        &self,
        money: Option<MinorUnit>,
        authorization: &str,
        _options: &GatewayOptions,
    ) -> Response {
        let _span = self.span(GatewayAction::Capture);
        let amount = money.map(MinorUnit::to_major_unit_string);
        let result = self
            .api
            .transaction_submit_for_settlement(authorization, amount.as_ref());
        self.transaction_call(GatewayAction::Capture, authorization, result)
    }

    fn refund(
        &self,
        money: Option<MinorUnit>,
        authorization: &str,
        _options: &GatewayOptions,
    ) -> Response {
        let _span = self.span(GatewayAction::Refund);
        let amount = money.map(MinorUnit::to_major_unit_string);
        let result = self.api.transaction_refund(authorization, amount.as_ref());
        self.transaction_call(GatewayAction::Refund, authorization, result)
    }

    fn void(&self, authorization: &str, _options: &GatewayOptions) -> Response {
        let _span = self.span(GatewayAction::Void);
        let result = self.api.transaction_void(authorization);
        self.transaction_call(GatewayAction::Void, authorization, result)
    }

    fn store(&self, card: &CreditCard, options: &GatewayOptions) -> Response {
        let _span = self.span(GatewayAction::Store);
        let outcome = self.store_card(card, options);
        self.translator.classify(GatewayAction::Store, outcome)
    }

    fn unstore(&self, vault_id: &VaultId, _options: &GatewayOptions) -> Response {
        let _span = self.span(GatewayAction::Unstore);
        let references = References::vault(vault_id.as_str());
        let outcome = classify_result(
            self.api.customer_delete(vault_id.as_str()),
            references.clone(),
            |_| Entity::new(Params::new(), references),
        );
        self.translator.classify(GatewayAction::Unstore, outcome)
    }

    fn update(&self, vault_id: &VaultId, card: &CreditCard, options: &GatewayOptions) -> Response {
        let _span = self.span(GatewayAction::Update);
        let outcome = self.update_customer(vault_id, card, options);
        self.translator.classify(GatewayAction::Update, outcome)
    }

    fn verify(&self, vault_id: &VaultId, token: &str) -> Response {
        let _span = self.span(GatewayAction::Verify);
        let references = References::vault(vault_id.as_str());
        let outcome = classify_result(
            self.api.credit_card_verify(vault_id.as_str(), token),
            references.clone(),
            |result| {
                let mut params = Params::new();
                params.insert(
                    "customer_vault_id".to_string(),
                    Value::String(vault_id.to_string()),
                );
                params.insert("token".to_string(), Value::String(token.to_string()));
                insert_some(
                    &mut params,
                    "verification",
                    result.verification.as_ref().map(verification_hash),
                );
                Entity::new(params, references)
            },
        );
        self.translator.classify(GatewayAction::Verify, outcome)
    }

    fn find_customer(&self, vault_id: &VaultId) -> Response {
        let _span = self.span(GatewayAction::FindCustomer);
        let references = References::vault(vault_id.as_str());
        let outcome = classify_result(
            self.api.customer_find(vault_id.as_str()),
            references.clone(),
            |result| {
                let mut params = Params::new();
                insert_some(
                    &mut params,
                    "customer",
                    result.customer.as_ref().map(customer_hash),
                );
                Entity::new(params, references)
            },
        );
        self.translator.classify(GatewayAction::FindCustomer, outcome)
    }
}

fn address_block(address: &Option<AddressInput>) -> Option<Value> {
    address
        .as_ref()
        .filter(|address| !address.is_empty())
        .map(|address| Value::Object(normalizer::address_params(address)))
}

fn wrap_credit_card(card: Params) -> Params {
    let mut params = Params::new();
    params.insert(CREDIT_CARD.to_string(), Value::Object(card));
    params
}

fn credit_card_object(params: &Params) -> Params {
    params
        .get(CREDIT_CARD)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn sale_entity(result: BraintreeResult, store_requested: bool) -> Entity {
    let Some(transaction) = result.transaction else {
        return Entity::default();
    };
    let mut params = Params::new();
    params.insert(
        "braintree_transaction".to_string(),
        transaction_hash(&transaction),
    );
    if store_requested {
        insert_some(
            &mut params,
            "customer_vault_id",
            transaction
                .customer_details
                .id
                .clone()
                .map(Value::String),
        );
    }
    Entity {
        status_message: Some(transaction.status_message()),
        avs_result: transaction.avs_result(),
        cvv_result: transaction.cvv_result(),
        ..Entity::new(params, References::transaction(transaction.id.as_str()))
    }
}

fn transaction_entity(result: BraintreeResult, references: References) -> Entity {
    match result.transaction {
        Some(transaction) => {
            let mut params = Params::new();
            params.insert(
                "braintree_transaction".to_string(),
                transaction_hash(&transaction),
            );
            Entity::new(params, References::transaction(transaction.id.as_str()))
        }
        None => Entity::new(Params::new(), references),
    }
}

/// Params for store and update: the customer when one came back, the
/// verification when the card was checked.
fn vault_entity(result: BraintreeResult, references: References) -> Entity {
    let mut params = Params::new();
    let references = match result.customer.as_ref() {
        Some(customer) => {
            let token = result
                .credit_card
                .as_ref()
                .or_else(|| customer.default_credit_card())
                .map(|card| Value::String(card.token.clone()));
            params.insert("customer".to_string(), customer_hash(customer));
            params.insert(
                "customer_vault_id".to_string(),
                Value::String(customer.id.clone()),
            );
            insert_some(&mut params, "token", token);
            References::vault(customer.id.as_str())
        }
        None => {
            insert_some(
                &mut params,
                "customer_vault_id",
                references.vault_id.clone().map(Value::String),
            );
            references
        }
    };
    insert_some(
        &mut params,
        "verification",
        result.verification.as_ref().map(verification_hash),
    );
    Entity::new(params, references)
}

#[cfg(test)]
mod tests {
    use common_utils::types::StringMajorUnit;
    use domain_types::presence::Presence;
    use parking_lot::Mutex;

    use super::{
        transformers::{
            BraintreeAddress, BraintreeCreditCard, BraintreeCreditCardDetails, BraintreeCustomer,
            BraintreeTransaction, BraintreeTransactionCustomer, BraintreeTransactionStatus,
            BraintreeTransactionType,
        },
        *,
    };

    /// Records every request and answers with canned results.
    #[derive(Default)]
    struct RecordingApi {
        requests: Mutex<Vec<(&'static str, Value)>>,
        customer: Option<BraintreeCustomer>,
    }

    impl RecordingApi {
        fn with_customer(customer: BraintreeCustomer) -> Self {
            Self {
                customer: Some(customer),
                ..Default::default()
            }
        }

        fn record(&self, call: &'static str, request: Value) {
            self.requests.lock().push((call, request));
        }

        fn last(&self, call: &str) -> Value {
            self.requests
                .lock()
                .iter()
                .rev()
                .find(|(name, _)| *name == call)
                .map(|(_, request)| request.clone())
                .unwrap_or(Value::Null)
        }

        fn transaction(id: &str) -> ApiResult {
            Ok(BraintreeResult {
                transaction: Some(BraintreeTransaction {
                    id: id.to_string(),
                    kind: BraintreeTransactionType::Sale,
                    status: BraintreeTransactionStatus::Authorized,
                    amount: StringMajorUnit::new("1.00".to_string()),
                    order_id: None,
                    merchant_account_id: None,
                    processor_response_code: "1000".to_string(),
                    processor_response_text: "Approved".to_string(),
                    avs_street_address_response_code: None,
                    avs_postal_code_response_code: None,
                    cvv_response_code: None,
                    credit_card_details: BraintreeCreditCardDetails::default(),
                    customer_details: BraintreeTransactionCustomer::default(),
                    billing_details: BraintreeAddress::default(),
                    shipping_details: BraintreeAddress::default(),
                    vault_customer: None,
                    refunded_transaction_id: None,
                }),
                ..Default::default()
            })
        }

        fn new_card(customer_id: &str) -> BraintreeCreditCard {
            BraintreeCreditCard {
                token: "123ygh".to_string(),
                bin: "401288".to_string(),
                last_4: "1881".to_string(),
                card_type: "Visa".to_string(),
                expiration_month: "09".to_string(),
                expiration_year: "2014".to_string(),
                cardholder_name: Some("Longbob Longsen".to_string()),
                customer_id: customer_id.to_string(),
                default: true,
                billing_address: None,
            }
        }
    }

    impl BraintreeApi for RecordingApi {
        fn customer_find(&self, customer_id: &str) -> ApiResult {
            self.record("customer_find", json!(customer_id));
            match &self.customer {
                Some(customer) if customer.id == customer_id => Ok(BraintreeResult {
                    customer: Some(customer.clone()),
                    ..Default::default()
                }),
                _ => Err(BraintreeFault::NotFound),
            }
        }

        fn customer_create(&self, params: &Params) -> ApiResult {
            self.record("customer_create", Value::Object(params.clone()));
            Ok(BraintreeResult {
                customer: Some(BraintreeCustomer {
                    id: "123".to_string(),
                    credit_cards: vec![Self::new_card("123")],
                    ..Default::default()
                }),
                ..Default::default()
            })
        }

        fn customer_update(&self, customer_id: &str, params: &Params) -> ApiResult {
            self.record("customer_update", json!([customer_id, params]));
            Ok(BraintreeResult {
                customer: self.customer.clone(),
                ..Default::default()
            })
        }

        fn customer_delete(&self, customer_id: &str) -> ApiResult {
            self.record("customer_delete", json!(customer_id));
            Ok(BraintreeResult::default())
        }

        fn credit_card_create(&self, params: &Params) -> ApiResult {
            self.record("credit_card_create", Value::Object(params.clone()));
            Ok(BraintreeResult {
                credit_card: Some(Self::new_card("123")),
                ..Default::default()
            })
        }

        fn credit_card_verify(&self, customer_id: &str, token: &str) -> ApiResult {
            self.record("credit_card_verify", json!([customer_id, token]));
            Ok(BraintreeResult::default())
        }

        fn transaction_sale(&self, params: &Params) -> ApiResult {
            self.record("transaction_sale", Value::Object(params.clone()));
            Self::transaction("transaction_id")
        }

        fn transaction_submit_for_settlement(
            &self,
            transaction_id: &str,
            amount: Option<&StringMajorUnit>,
        ) -> ApiResult {
            self.record(
                "transaction_submit_for_settlement",
                json!([transaction_id, amount.map(StringMajorUnit::get_amount_as_string)]),
            );
            Self::transaction(transaction_id)
        }

        fn transaction_void(&self, transaction_id: &str) -> ApiResult {
            self.record("transaction_void", json!(transaction_id));
            Self::transaction("void_transaction_id")
        }

        fn transaction_refund(
            &self,
            transaction_id: &str,
            amount: Option<&StringMajorUnit>,
        ) -> ApiResult {
            self.record(
                "transaction_refund",
                json!([transaction_id, amount.map(StringMajorUnit::get_amount_as_string)]),
            );
            Self::transaction("refund_transaction_id")
        }
    }

    fn gateway(api: Arc<RecordingApi>) -> Braintree {
        gateway_with_config(api, BraintreeConfig::new("test", "test", "test"))
    }

    fn gateway_with_config(api: Arc<RecordingApi>, config: BraintreeConfig) -> Braintree {
        Braintree::new(api, &config, &ModeContext::default())
    }

    fn card() -> CreditCard {
        CreditCard::new("41111111111111111111", 9, 2014)
            .with_cvc("123")
            .with_name("Longbob", "Longsen")
    }

    fn purchase_with(
        api: &Arc<RecordingApi>,
        gateway: &Braintree,
        options: GatewayOptions,
    ) -> Value {
        gateway.purchase(MinorUnit::new(100), &card().into(), &options);
        api.last("transaction_sale")
    }

    #[test]
    fn refund_forwards_amount_only_when_given() {
        let api = Arc::new(RecordingApi::default());
        let gateway = gateway(api.clone());

        let response = gateway.refund(None, "transaction_id", &GatewayOptions::default());
        assert_eq!(response.authorization(), Some("refund_transaction_id"));
        assert_eq!(
            api.last("transaction_refund"),
            json!(["transaction_id", null])
        );

        gateway.refund(
            Some(MinorUnit::new(1000)),
            "transaction_id",
            &GatewayOptions::default(),
        );
        assert_eq!(
            api.last("transaction_refund"),
            json!(["transaction_id", "10.00"])
        );
    }

    #[test]
    fn void_authorization_is_the_voided_transaction() {
        let api = Arc::new(RecordingApi::default());
        let response = gateway(api).void("transaction_id", &GatewayOptions::default());
        assert_eq!(response.authorization(), Some("void_transaction_id"));
        assert_eq!(response.action(), GatewayAction::Void);
    }

    #[test]
    fn merchant_account_id_precedence() {
        let api = Arc::new(RecordingApi::default());
        let plain = gateway(api.clone());
        let sale = purchase_with(&api, &plain, GatewayOptions::default());
        assert!(sale.get("merchant_account_id").is_none());

        let configured = gateway_with_config(
            api.clone(),
            BraintreeConfig::new("test", "test", "test").with_merchant_account_id("present"),
        );
        let sale = purchase_with(&api, &configured, GatewayOptions::default());
        assert_eq!(sale["merchant_account_id"], json!("present"));

        let options = GatewayOptions {
            merchant_account_id: Some("account_on_transaction".to_string()),
            ..Default::default()
        };
        let sale = purchase_with(&api, &configured, options);
        assert_eq!(sale["merchant_account_id"], json!("account_on_transaction"));
    }

    #[test]
    fn recurring_flag_is_only_sent_when_requested() {
        let api = Arc::new(RecordingApi::default());
        let gateway = gateway(api.clone());
        let options = GatewayOptions {
            recurring: Some(true),
            ..Default::default()
        };
        assert_eq!(purchase_with(&api, &gateway, options)["recurring"], json!(true));
        assert!(purchase_with(&api, &gateway, GatewayOptions::default())
            .get("recurring")
            .is_none());
    }

    #[test]
    fn sale_carries_card_customer_and_settlement_flag() {
        let api = Arc::new(RecordingApi::default());
        let gateway = gateway(api.clone());
        let options = GatewayOptions {
            order_id: Some("1".to_string()),
            email: Presence::Value("customer@example.com".to_string()),
            ..Default::default()
        };
        let response = gateway.authorize(MinorUnit::new(100), &card().into(), &options);
        assert_eq!(response.message(), "1000 Approved");
        assert_eq!(response.authorization(), Some("transaction_id"));
        assert_eq!(
            api.last("transaction_sale"),
            json!({
                "amount": "1.00",
                "order_id": "1",
                "credit_card": {
                    "number": "41111111111111111111",
                    "cvv": "123",
                    "expiration_month": "09",
                    "expiration_year": "2014",
                    "cardholder_name": "Longbob Longsen"
                },
                "customer": {
                    "email": "customer@example.com",
                    "first_name": "Longbob",
                    "last_name": "Longsen"
                },
                "options": {"store_in_vault": false, "submit_for_settlement": false}
            })
        );
    }

    #[test]
    fn vault_source_uses_customer_id() {
        let api = Arc::new(RecordingApi::default());
        let gateway = gateway(api.clone());
        gateway.purchase(
            MinorUnit::new(100),
            &VaultId::from(2383282u64).into(),
            &GatewayOptions::default(),
        );
        let sale = api.last("transaction_sale");
        assert_eq!(sale["customer_id"], json!("2383282"));
        assert!(sale.get("credit_card").is_none());
        assert_eq!(sale["options"]["submit_for_settlement"], json!(true));
    }

    #[test]
    fn address_country_handling() {
        let api = Arc::new(RecordingApi::default());
        let gateway = gateway(api.clone());
        let cases: [(AddressInput, &str, Value); 5] = [
            (
                AddressInput {
                    country: Presence::Value("US".to_string()),
                    ..Default::default()
                },
                "country_code_alpha2",
                json!("US"),
            ),
            (
                AddressInput {
                    country_code_alpha2: Presence::Value("US".to_string()),
                    ..Default::default()
                },
                "country_code_alpha2",
                json!("US"),
            ),
            (
                AddressInput {
                    country_name: Presence::Value("United States of America".to_string()),
                    ..Default::default()
                },
                "country_name",
                json!("United States of America"),
            ),
            (
                AddressInput {
                    country_code_alpha3: Presence::Value("USA".to_string()),
                    ..Default::default()
                },
                "country_code_alpha3",
                json!("USA"),
            ),
            (
                AddressInput {
                    country_code_numeric: Presence::Value(840),
                    ..Default::default()
                },
                "country_code_numeric",
                json!(840),
            ),
        ];
        for (address, key, expected) in cases {
            let options = GatewayOptions::default().with_billing_address(address);
            let sale = purchase_with(&api, &gateway, options);
            assert_eq!(sale["billing"][key], expected);
        }
    }

    #[test]
    fn store_on_new_customer_creates_it_with_verify_flag() {
        let api = Arc::new(RecordingApi::default());
        let options = GatewayOptions {
            verify_card: Some(false),
            ..GatewayOptions::default().with_id("123")
        };
        let response = gateway(api.clone()).store(&card(), &options);

        let request = api.last("customer_create");
        assert_eq!(request["id"], json!("123"));
        assert_eq!(request["credit_card"]["options"]["verify_card"], json!(false));
        assert_eq!(response.param("customer_vault_id"), Some(&json!("123")));
        assert_eq!(response.param("token"), Some(&json!("123ygh")));
        assert_eq!(response.authorization(), Some("123"));
        assert_eq!(response.message(), "OK");
    }

    #[test]
    fn store_with_billing_address_sends_it_on_the_card() {
        let api = Arc::new(RecordingApi::default());
        let options = GatewayOptions::default()
            .with_id("123")
            .with_billing_address(AddressInput::street("1 E Main St"));
        gateway(api.clone()).store(&card(), &options);
        assert_eq!(
            api.last("customer_create")["credit_card"]["billing_address"]["street_address"],
            json!("1 E Main St")
        );
    }

    #[test]
    fn store_existing_customer_adds_card() {
        let api = Arc::new(RecordingApi::with_customer(BraintreeCustomer {
            id: "123".to_string(),
            email: Some("john@smith.com".to_string()),
            first_name: Some("John".to_string()),
            last_name: Some("Smith".to_string()),
            credit_cards: Vec::new(),
        }));
        let options = GatewayOptions {
            verify_card: Some(true),
            ..GatewayOptions::default().with_id("123")
        };
        let response = gateway(api.clone()).store(&card(), &options);

        assert_eq!(
            api.last("credit_card_create"),
            json!({
                "number": "41111111111111111111",
                "cvv": "123",
                "expiration_month": "09",
                "expiration_year": "2014",
                "cardholder_name": "Longbob Longsen",
                "customer_id": "123",
                "options": {"verify_card": true}
            })
        );
        let customer = response.param("customer").cloned().unwrap_or_default();
        assert_eq!(customer["email"], json!("john@smith.com"));
        assert_eq!(customer["credit_cards"][0]["token"], json!("123ygh"));
        assert_eq!(response.param("token"), Some(&json!("123ygh")));
        assert_eq!(response.authorization(), Some("123"));
    }

    #[test]
    fn update_sends_cvv_verify_flag_and_existing_token() {
        let mut stored = RecordingApi::new_card("vault_id");
        stored.token = "token".to_string();
        let api = Arc::new(RecordingApi::with_customer(BraintreeCustomer {
            id: "vault_id".to_string(),
            credit_cards: vec![stored],
            ..Default::default()
        }));
        let options = GatewayOptions {
            verify_card: Some(true),
            ..Default::default()
        };
        let card = CreditCard::new("41111111111111111111", 9, 2014).with_cvc("567");
        let response = gateway(api.clone()).update(&VaultId::from("vault_id"), &card, &options);
        assert!(response.is_success());

        let request = api.last("customer_update");
        assert_eq!(request[0], json!("vault_id"));
        assert_eq!(request[1]["credit_card"]["cvv"], json!("567"));
        assert_eq!(
            request[1]["credit_card"]["options"],
            json!({"update_existing_token": "token", "verify_card": true})
        );
    }

    #[test]
    fn update_without_default_card_is_not_found() {
        let api = Arc::new(RecordingApi::with_customer(BraintreeCustomer {
            id: "vault_id".to_string(),
            ..Default::default()
        }));
        let response = gateway(api.clone()).update(
            &VaultId::from("vault_id"),
            &card(),
            &GatewayOptions::default(),
        );
        assert!(!response.is_success());
        assert_eq!(response.message(), "Braintree::NotFoundError");
        assert_eq!(api.last("customer_update"), Value::Null);
    }

    #[test]
    fn find_customer_failure_is_not_found() {
        let api = Arc::new(RecordingApi::default());
        let response = gateway(api).find_customer(&VaultId::from("123"));
        assert!(!response.is_success());
        assert_eq!(response.action(), GatewayAction::FindCustomer);
        assert_eq!(response.message(), "Braintree::NotFoundError");
    }
}
