#![allow(dead_code)]

use std::sync::Arc;

use connector_integration::connectors::braintree::sandbox::BraintreeSandbox;
use domain_types::{
    payment_method_data::CreditCard,
    router_request_types::GatewayOptions,
    types::{BraintreeConfig, Gateways},
};
use gateway_service::Base;
use interfaces::gateway_types::BoxedGateway;
use serde_json::Value;

pub const MERCHANT_ID: &str = "integration_merchant";
pub const PUBLIC_KEY: &str = "integration_public_key";
pub const PRIVATE_KEY: &str = "integration_private_key";

pub fn braintree_config() -> BraintreeConfig {
    BraintreeConfig::new(MERCHANT_ID, PUBLIC_KEY, PRIVATE_KEY)
}

pub fn sandbox() -> BraintreeSandbox {
    BraintreeSandbox::new(braintree_config())
}

/// A `Base` whose Braintree credentials are `config`, talking to `sandbox`.
pub fn base_with(sandbox: &BraintreeSandbox, config: BraintreeConfig) -> Base {
    Base::default()
        .with_gateways(Gateways {
            braintree: Some(config),
            ..Default::default()
        })
        .with_braintree_transport(Arc::new(sandbox.clone()))
}

pub fn braintree_gateway(sandbox: &BraintreeSandbox) -> BoxedGateway {
    base_with(sandbox, braintree_config())
        .build_gateway("braintree_blue")
        .unwrap()
}

/// Test card in the usual shape: expiry 09/2030, cvv 123, cardholder name set.
pub fn credit_card(number: &str) -> CreditCard {
    CreditCard::new(number, 9, 2030)
        .with_cvc("123")
        .with_name("Longbob", "Longsen")
}

pub fn options(value: Value) -> GatewayOptions {
    serde_json::from_value(value).unwrap()
}

pub fn address() -> Value {
    serde_json::json!({
        "address1": "1234 My Street",
        "address2": "Apt 1",
        "company": "Widgets Inc",
        "city": "Ottawa",
        "state": "ON",
        "zip_code": "K1C2N6",
        "country": "CA"
    })
}

pub fn default_options() -> Value {
    let mut billing_address = address();
    billing_address["country_name"] = Value::from("United States of America");
    serde_json::json!({
        "order_id": "1",
        "billing_address": billing_address,
        "description": "Store Purchase"
    })
}

/// `base` merged with the top-level keys of `overrides`.
pub fn merge(mut base: Value, overrides: Value) -> Value {
    if let (Some(base), Value::Object(overrides)) = (base.as_object_mut(), overrides) {
        base.extend(overrides);
    }
    base
}
