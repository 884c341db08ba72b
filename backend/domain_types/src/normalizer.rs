//! Builds the canonical nested parameter mapping a backend call expects out
//! of partially specified caller input.
//!
//! Every function here is pure: inputs are borrowed and the output shares no
//! structure with them.

use hyperswitch_masking::{ExposeInterface, Secret};
use serde_json::Value;

use crate::{
    payment_method_data::{CreditCard, VaultId},
    presence::Presence,
    router_request_types::{AddressInput, GatewayOptions},
    router_response_types::Params,
};

pub const CREDIT_CARD: &str = "credit_card";
pub const OPTIONS: &str = "options";
pub const BILLING_ADDRESS: &str = "billing_address";
pub const VERIFY_CARD: &str = "verify_card";
pub const FAIL_ON_DUPLICATE_PAYMENT_METHOD: &str = "fail_on_duplicate_payment_method";

const COUNTRY_CODE_ALPHA2: &str = "country_code_alpha2";
const COUNTRY_CODE_ALPHA3: &str = "country_code_alpha3";
const COUNTRY_CODE_NUMERIC: &str = "country_code_numeric";
const COUNTRY_NAME: &str = "country_name";

/// Card fields in the shape a vault backend stores them.
#[derive(Clone, Debug)]
pub struct NormalizedCardParams {
    pub number: Secret<String>,
    pub cvv: Option<Secret<String>>,
    pub expiration_month: String,
    pub expiration_year: String,
    pub cardholder_name: Option<String>,
    pub customer_id: Option<VaultId>,
    pub options: Params,
    pub billing_address: Option<Params>,
}

impl NormalizedCardParams {
    /// Exposes the card data into a backend parameter mapping. Optional
    /// fields that were never supplied are left out.
    pub fn into_params(self) -> Params {
        let mut params = Params::new();
        params.insert("number".to_string(), Value::String(self.number.expose()));
        if let Some(cvv) = self.cvv {
            params.insert("cvv".to_string(), Value::String(cvv.expose()));
        }
        params.insert(
            "expiration_month".to_string(),
            Value::String(self.expiration_month),
        );
        params.insert(
            "expiration_year".to_string(),
            Value::String(self.expiration_year),
        );
        if let Some(name) = self.cardholder_name {
            params.insert("cardholder_name".to_string(), Value::String(name));
        }
        if let Some(customer_id) = self.customer_id {
            params.insert(
                "customer_id".to_string(),
                Value::String(customer_id.into_inner()),
            );
        }
        if !self.options.is_empty() {
            params.insert(OPTIONS.to_string(), Value::Object(self.options));
        }
        if let Some(address) = self.billing_address {
            params.insert(BILLING_ADDRESS.to_string(), Value::Object(address));
        }
        params
    }
}

pub fn card_params(card: &CreditCard, customer_id: Option<&VaultId>) -> NormalizedCardParams {
    NormalizedCardParams {
        number: card.card_number.clone(),
        cvv: card.card_cvc.clone(),
        expiration_month: card.get_expiry_month_2_digit(),
        expiration_year: card.get_expiry_year_4_digit(),
        cardholder_name: card.cardholder_name(),
        customer_id: customer_id.cloned(),
        options: Params::new(),
        billing_address: None,
    }
}

/// Merges the card-related caller options into `params`.
///
/// The result always carries `credit_card.options` (possibly empty).
/// `verify_card` and `fail_on_duplicate_payment_method` appear only when the
/// caller supplied them, and `billing_address` only when at least one address
/// field was supplied. Existing entries are preserved.
pub fn merge_credit_card_options(params: &Params, options: &GatewayOptions) -> Params {
    let mut merged = params.clone();
    let mut credit_card = object_at(&merged, CREDIT_CARD);

    let mut card_options = object_at(&credit_card, OPTIONS);
    if let Some(verify_card) = options.verify_card {
        card_options.insert(VERIFY_CARD.to_string(), Value::Bool(verify_card));
    }
    if let Some(fail_on_duplicate) = options.fail_on_duplicate_payment_method {
        card_options.insert(
            FAIL_ON_DUPLICATE_PAYMENT_METHOD.to_string(),
            Value::Bool(fail_on_duplicate),
        );
    }
    credit_card.insert(OPTIONS.to_string(), Value::Object(card_options));

    if let Some(address) = options
        .billing_address
        .as_ref()
        .filter(|address| !address.is_empty())
    {
        credit_card.insert(
            BILLING_ADDRESS.to_string(),
            Value::Object(address_params(address)),
        );
    }
    merged.insert(CREDIT_CARD.to_string(), Value::Object(credit_card));
    merged
}

/// Translates caller address fields into the canonical address shape.
///
/// Unsupplied fields are omitted, with the exception of `company`, which is
/// always present so a partial update clears it rather than keeping a stale
/// value. Exactly one country representation is forwarded.
pub fn address_params(input: &AddressInput) -> Params {
    let mut params = Params::new();
    insert_presence(&mut params, "street_address", &input.address1);
    insert_presence(&mut params, "extended_address", &input.address2);
    insert_presence(
        &mut params,
        "company",
        &input.company.clone().or(Presence::Null),
    );
    insert_presence(&mut params, "locality", &input.city);
    insert_presence(&mut params, "region", &input.state);
    insert_presence(&mut params, "postal_code", &input.zip_code);
    if let Some((key, value)) = resolve_country(input) {
        params.insert(key.to_string(), value);
    }
    params
}

/// Picks the country representation to forward. Supplied values beat
/// explicit nulls; within each group alpha-2 (explicit key before the
/// `country` alias) wins over alpha-3, numeric, and name in that order.
fn resolve_country(input: &AddressInput) -> Option<(&'static str, Value)> {
    let numeric = match input.supplied_country_code_numeric() {
        Some(code) => Presence::Value(Value::from(code)),
        None => Presence::Unset,
    };
    let candidates = [
        (COUNTRY_CODE_ALPHA2, string_presence(&input.country_code_alpha2)),
        (COUNTRY_CODE_ALPHA2, string_presence(&input.country)),
        (COUNTRY_CODE_ALPHA3, string_presence(&input.country_code_alpha3)),
        (COUNTRY_CODE_NUMERIC, numeric),
        (COUNTRY_NAME, string_presence(&input.country_name)),
    ];

    candidates
        .iter()
        .find_map(|(key, candidate)| candidate.value().map(|value| (*key, value.clone())))
        .or_else(|| {
            candidates
                .iter()
                .find(|(_, candidate)| candidate.is_null())
                .map(|(key, _)| (*key, Value::Null))
        })
}

fn string_presence(field: &Presence<String>) -> Presence<Value> {
    field.clone().map(Value::String)
}

fn insert_presence(params: &mut Params, key: &str, field: &Presence<String>) {
    if let Some(value) = field.to_json() {
        params.insert(key.to_string(), value);
    }
}

/// Copy of the object stored under `key`; anything else reads as empty.
fn object_at(params: &Params, key: &str) -> Params {
    params
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
