//! In-process Braintree sandbox.
//!
//! Reproduces the processing rules of the Braintree sandbox environment
//! (test card numbers, decline amounts, AVS/CVV trigger values and the
//! transaction state machine) behind [`BraintreeApi`], so every adapter flow
//! can run without network access.

use std::{collections::HashMap, str::FromStr, sync::Arc};

use cards::CardNumber;
use common_utils::{
    consts::{CARD_TOKEN_LENGTH, TRANSACTION_ID_LENGTH, VAULT_ID_LENGTH},
    generate_alphanumeric_id, generate_numeric_id, MinorUnit, StringMajorUnit,
};
use domain_types::{
    presence::Presence,
    router_response_types::Params,
    types::{BraintreeConfig, BraintreeEnvironment},
};
use hyperswitch_masking::PeekInterface;
use parking_lot::{Mutex, MutexGuard};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use super::{
    transformers::{
        BraintreeAddress, BraintreeCreditCard, BraintreeCreditCardDetails, BraintreeCustomer,
        BraintreeFault, BraintreeResult, BraintreeTransaction, BraintreeTransactionCustomer,
        BraintreeTransactionStatus, BraintreeTransactionType, BraintreeValidationError,
        BraintreeVerification, BraintreeVerificationStatus, DUPLICATE_PAYMENT_METHOD_CODE,
    },
    ApiResult, BraintreeApi, BraintreeTransport,
};

/// Card number the sandbox processor refuses to verify.
pub const UNVERIFIABLE_CARD_NUMBER: &str = "4000111111111115";

const DECLINE_AMOUNTS: std::ops::RangeInclusive<i64> = 2000_00..=2999_99;
const FAILURE_AMOUNTS: std::ops::RangeInclusive<i64> = 3000_00..=3000_99;
const CVV_DECLINE_CODE: i64 = 2010;

/// Validation rules the sandbox enforces, with Braintree's error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    MalformedRequest,
    AmountRequired,
    AmountInvalid,
    AmountNotPositive,
    CardNumberRequired,
    CardNumberInvalid,
    ExpirationMonthInvalid,
    ExpirationYearInvalid,
    EmailInvalid,
    DuplicateCard,
    CustomerIdTaken,
    CustomerIdRequired,
    CardCustomerIdInvalid,
    UpdateExistingTokenInvalid,
    SaleCustomerIdInvalid,
    CustomerHasNoCard,
    PaymentMethodMissing,
    VoidNotAllowed,
    SettlementNotAllowed,
    SettlementTooLarge,
    RefundNotAllowed,
    RefundTooLarge,
}

impl Rule {
    fn error(self) -> BraintreeValidationError {
        let (attribute, code, message) = match self {
            Self::MalformedRequest => ("base", "91500", "Request parameters are invalid."),
            Self::AmountRequired => ("amount", "81502", "Amount is required."),
            Self::AmountInvalid => ("amount", "81503", "Amount is an invalid format."),
            Self::AmountNotPositive => ("amount", "81531", "Amount must be greater than zero."),
            Self::CardNumberRequired => ("number", "81714", "Credit card number is required."),
            Self::CardNumberInvalid => ("number", "81715", "Credit card number is invalid."),
            Self::ExpirationMonthInvalid => {
                ("expiration_month", "81712", "Expiration month is invalid.")
            }
            Self::ExpirationYearInvalid => {
                ("expiration_year", "81713", "Expiration year is invalid.")
            }
            Self::EmailInvalid => ("email", "81604", "Email is an invalid format."),
            Self::DuplicateCard => (
                "number",
                DUPLICATE_PAYMENT_METHOD_CODE,
                "Duplicate card exists in the vault.",
            ),
            Self::CustomerIdTaken => ("id", "91609", "Customer ID has already been taken."),
            Self::CustomerIdRequired => ("customer_id", "91704", "Customer ID is required."),
            Self::CardCustomerIdInvalid => ("customer_id", "91705", "Customer ID is invalid."),
            Self::UpdateExistingTokenInvalid => (
                "update_existing_token",
                "91723",
                "Update Existing Token is invalid.",
            ),
            Self::SaleCustomerIdInvalid => ("customer_id", "91510", "Customer ID is invalid."),
            Self::CustomerHasNoCard => (
                "customer_id",
                "91511",
                "Customer does not have any credit cards.",
            ),
            Self::PaymentMethodMissing => (
                "base",
                "91508",
                "Cannot determine payment method.",
            ),
            Self::VoidNotAllowed => (
                "base",
                "91504",
                "Transaction can only be voided if status is authorized or submitted_for_settlement.",
            ),
            Self::SettlementNotAllowed => (
                "base",
                "91507",
                "Cannot submit for settlement unless status is authorized.",
            ),
            Self::SettlementTooLarge => (
                "amount",
                "91522",
                "Settlement amount cannot be more than the authorized amount.",
            ),
            Self::RefundNotAllowed => (
                "base",
                "91506",
                "Cannot refund a transaction unless it is settled.",
            ),
            Self::RefundTooLarge => ("amount", "91521", "Refund amount is too large."),
        };
        BraintreeValidationError::new(attribute, code, message)
    }

    fn result(self) -> BraintreeResult {
        BraintreeResult::with_errors(vec![self.error()])
    }
}

fn decline_text(code: i64) -> &'static str {
    match code {
        2000 => "Do Not Honor",
        2001 => "Insufficient Funds",
        2002 => "Limit Exceeded",
        2003 => "Cardholder's Activity Limit Exceeded",
        2004 => "Expired Card",
        2005 => "Invalid Credit Card Number",
        2006 => "Invalid Expiration Date",
        2007 => "No Account",
        2008 => "Card Account Length Error",
        2009 => "No Such Issuer",
        2010 => "Card Issuer Declined CVV",
        _ => "Processor Declined",
    }
}

fn avs_street_code(street_address: Option<&str>) -> &'static str {
    match street_address {
        None => "I",
        Some(street) if street.starts_with("200 ") => "N",
        Some(street) if street.starts_with("201 ") => "U",
        Some(_) => "M",
    }
}

fn avs_postal_code(postal_code: Option<&str>) -> &'static str {
    match postal_code {
        None => "I",
        Some("20000") => "N",
        Some("20001") => "U",
        Some(_) => "M",
    }
}

fn cvv_code(cvv: Option<&str>) -> &'static str {
    match cvv {
        None => "I",
        Some("200") => "N",
        Some("201") => "U",
        Some("301") => "S",
        Some(_) => "M",
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AddressRequest {
    street_address: Presence<String>,
    extended_address: Presence<String>,
    company: Presence<String>,
    locality: Presence<String>,
    region: Presence<String>,
    postal_code: Presence<String>,
    country_name: Presence<String>,
    country_code_alpha2: Presence<String>,
    country_code_alpha3: Presence<String>,
    country_code_numeric: Presence<u16>,
}

impl AddressRequest {
    fn apply_to(&self, current: BraintreeAddress) -> BraintreeAddress {
        BraintreeAddress {
            street_address: self.street_address.clone().apply_to(current.street_address),
            extended_address: self
                .extended_address
                .clone()
                .apply_to(current.extended_address),
            company: self.company.clone().apply_to(current.company),
            locality: self.locality.clone().apply_to(current.locality),
            region: self.region.clone().apply_to(current.region),
            postal_code: self.postal_code.clone().apply_to(current.postal_code),
            country_name: self.country_name.clone().apply_to(current.country_name),
            country_code_alpha2: self
                .country_code_alpha2
                .clone()
                .apply_to(current.country_code_alpha2),
            country_code_alpha3: self
                .country_code_alpha3
                .clone()
                .apply_to(current.country_code_alpha3),
            country_code_numeric: self
                .country_code_numeric
                .map(|code| code.to_string())
                .apply_to(current.country_code_numeric),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreditCardOptions {
    verify_card: Option<bool>,
    fail_on_duplicate_payment_method: Option<bool>,
    update_existing_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreditCardRequest {
    number: Option<String>,
    cvv: Option<String>,
    expiration_month: Option<String>,
    expiration_year: Option<String>,
    cardholder_name: Option<String>,
    customer_id: Option<String>,
    options: CreditCardOptions,
    billing_address: Option<AddressRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CustomerRequest {
    id: Option<String>,
    email: Presence<String>,
    first_name: Presence<String>,
    last_name: Presence<String>,
    credit_card: Option<CreditCardRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaleOptions {
    store_in_vault: bool,
    submit_for_settlement: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaleRequest {
    amount: Option<String>,
    order_id: Option<String>,
    merchant_account_id: Option<String>,
    customer: CustomerRequest,
    customer_id: Option<String>,
    credit_card: Option<CreditCardRequest>,
    options: SaleOptions,
    billing: Option<AddressRequest>,
    shipping: Option<AddressRequest>,
}

fn parse<T: DeserializeOwned>(params: &Params) -> Result<T, BraintreeResult> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|error| {
        tracing::debug!(%error, "rejecting malformed braintree request");
        Rule::MalformedRequest.result()
    })
}

/// Card data that passed validation.
#[derive(Clone, Debug)]
struct CardData {
    number: CardNumber,
    cvv: Option<String>,
    expiration_month: String,
    expiration_year: String,
    cardholder_name: Option<String>,
}

impl CardData {
    fn validate(
        request: &CreditCardRequest,
        errors: &mut Vec<BraintreeValidationError>,
    ) -> Option<Self> {
        let number = match request.number.as_deref().map(CardNumber::from_str) {
            Some(Ok(number)) => Some(number),
            Some(Err(_)) => {
                errors.push(Rule::CardNumberInvalid.error());
                None
            }
            None => {
                errors.push(Rule::CardNumberRequired.error());
                None
            }
        };
        let expiration_month = request
            .expiration_month
            .as_deref()
            .and_then(|month| month.parse::<u8>().ok())
            .filter(|month| (1..=12).contains(month));
        if expiration_month.is_none() {
            errors.push(Rule::ExpirationMonthInvalid.error());
        }
        let expiration_year = request
            .expiration_year
            .clone()
            .filter(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()));
        if expiration_year.is_none() {
            errors.push(Rule::ExpirationYearInvalid.error());
        }

        Some(Self {
            number: number?,
            cvv: request.cvv.clone(),
            expiration_month: format!("{:02}", expiration_month?),
            expiration_year: expiration_year?,
            cardholder_name: request.cardholder_name.clone(),
        })
    }

    fn card_type(&self) -> String {
        self.number
            .get_card_issuer()
            .map_or_else(|| "Unknown".to_string(), |issuer| issuer.to_string())
    }

    fn details(&self, token: Option<String>) -> BraintreeCreditCardDetails {
        BraintreeCreditCardDetails {
            token,
            bin: self.number.get_card_isin(),
            last_4: self.number.get_last4(),
            card_type: self.card_type(),
            expiration_month: self.expiration_month.clone(),
            expiration_year: self.expiration_year.clone(),
            cardholder_name: self.cardholder_name.clone(),
        }
    }

    fn vaulted(
        &self,
        token: String,
        customer_id: &str,
        default: bool,
        billing_address: Option<BraintreeAddress>,
    ) -> BraintreeCreditCard {
        BraintreeCreditCard {
            token,
            bin: self.number.get_card_isin(),
            last_4: self.number.get_last4(),
            card_type: self.card_type(),
            expiration_month: self.expiration_month.clone(),
            expiration_year: self.expiration_year.clone(),
            cardholder_name: self.cardholder_name.clone(),
            customer_id: customer_id.to_string(),
            default,
            billing_address,
        }
    }
}

fn verify(
    number: &CardNumber,
    cvv: Option<&str>,
    billing_address: Option<&BraintreeAddress>,
    reject_cvv_mismatch: bool,
) -> BraintreeVerification {
    let (status, code) = if number.get_card_no() == UNVERIFIABLE_CARD_NUMBER {
        (BraintreeVerificationStatus::ProcessorDeclined, 2000)
    } else if reject_cvv_mismatch && cvv_code(cvv) == "N" {
        (BraintreeVerificationStatus::GatewayRejected, CVV_DECLINE_CODE)
    } else {
        (BraintreeVerificationStatus::Verified, 1000)
    };
    let text = if status.is_declined() {
        decline_text(code)
    } else {
        "Approved"
    };
    BraintreeVerification {
        id: generate_alphanumeric_id(TRANSACTION_ID_LENGTH),
        status,
        processor_response_code: code.to_string(),
        processor_response_text: text.to_string(),
        cvv_response_code: Some(cvv_code(cvv).to_string()),
        avs_street_address_response_code: Some(
            avs_street_code(billing_address.and_then(|address| address.street_address.as_deref()))
                .to_string(),
        ),
        avs_postal_code_response_code: Some(
            avs_postal_code(billing_address.and_then(|address| address.postal_code.as_deref()))
                .to_string(),
        ),
    }
}

#[derive(Debug)]
struct LedgerEntry {
    transaction: BraintreeTransaction,
    /// Amount that may still be settled or refunded in total.
    authorized: MinorUnit,
    refunded: MinorUnit,
}

#[derive(Debug, Default)]
struct State {
    customers: HashMap<String, BraintreeCustomer>,
    card_numbers: HashMap<String, CardNumber>,
    transactions: HashMap<String, LedgerEntry>,
}

impl State {
    fn fresh_customer_id(&self) -> String {
        loop {
            let id = generate_numeric_id(VAULT_ID_LENGTH);
            if !self.customers.contains_key(&id) {
                break id;
            }
        }
    }

    fn fresh_token(&self) -> String {
        loop {
            let token = generate_alphanumeric_id(CARD_TOKEN_LENGTH);
            if !self.card_numbers.contains_key(&token) {
                break token;
            }
        }
    }

    fn fresh_transaction_id(&self) -> String {
        loop {
            let id = generate_alphanumeric_id(TRANSACTION_ID_LENGTH);
            if !self.transactions.contains_key(&id) {
                break id;
            }
        }
    }

    fn is_vaulted(&self, number: &CardNumber, except_token: Option<&str>) -> bool {
        self.card_numbers
            .iter()
            .any(|(token, stored)| stored == number && Some(token.as_str()) != except_token)
    }

    /// Validates a card and, when requested, rejects numbers already vaulted.
    fn validate_card(
        &self,
        request: &CreditCardRequest,
        except_token: Option<&str>,
        errors: &mut Vec<BraintreeValidationError>,
    ) -> Option<CardData> {
        let card = CardData::validate(request, errors)?;
        if request.options.fail_on_duplicate_payment_method == Some(true)
            && self.is_vaulted(&card.number, except_token)
        {
            errors.push(Rule::DuplicateCard.error());
        }
        Some(card)
    }

    fn vault_card(
        &mut self,
        customer: &mut BraintreeCustomer,
        card: &CardData,
        billing_address: Option<BraintreeAddress>,
    ) -> BraintreeCreditCard {
        let token = self.fresh_token();
        let stored = card.vaulted(
            token.clone(),
            &customer.id,
            customer.credit_cards.is_empty(),
            billing_address,
        );
        self.card_numbers.insert(token, card.number.clone());
        customer.credit_cards.push(stored.clone());
        stored
    }

    fn record(&mut self, transaction: BraintreeTransaction, authorized: MinorUnit) {
        self.transactions.insert(
            transaction.id.clone(),
            LedgerEntry {
                transaction,
                authorized,
                refunded: MinorUnit::zero(),
            },
        );
    }
}

/// Customer as the API reports it: most recently added card first.
fn customer_view(customer: &BraintreeCustomer) -> BraintreeCustomer {
    let mut view = customer.clone();
    view.credit_cards.reverse();
    view
}

fn email_errors(email: &Presence<String>, errors: &mut Vec<BraintreeValidationError>) {
    if email.value().is_some_and(|email| !is_valid_email(email)) {
        errors.push(Rule::EmailInvalid.error());
    }
}

fn parse_amount(amount: &StringMajorUnit) -> Result<MinorUnit, Rule> {
    match amount.to_minor_unit() {
        Ok(amount) if amount > MinorUnit::zero() => Ok(amount),
        Ok(_) => Err(Rule::AmountNotPositive),
        Err(_) => Err(Rule::AmountInvalid),
    }
}

/// A sandbox merchant account. Clones share the same vault and ledger.
#[derive(Clone)]
pub struct BraintreeSandbox {
    account: Arc<BraintreeConfig>,
    verify_cards_by_default: bool,
    reject_cvv_mismatch: bool,
    state: Arc<Mutex<State>>,
}

impl BraintreeSandbox {
    pub fn new(account: BraintreeConfig) -> Self {
        Self {
            account: Arc::new(account),
            verify_cards_by_default: false,
            reject_cvv_mismatch: false,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Account policy for card verification when a request does not say.
    pub fn with_card_verification_by_default(mut self, enabled: bool) -> Self {
        self.verify_cards_by_default = enabled;
        self
    }

    /// Account rule that rejects cards whose CVV does not match (`N`),
    /// both on verification and on sale.
    pub fn with_cvv_rejection(mut self, enabled: bool) -> Self {
        self.reject_cvv_mismatch = enabled;
        self
    }

    pub fn client(
        &self,
        config: &BraintreeConfig,
        environment: BraintreeEnvironment,
    ) -> SandboxClient {
        let authenticated = self.accepts(config, environment);
        if !authenticated {
            tracing::debug!(%environment, "sandbox rejected credentials");
        }
        SandboxClient {
            sandbox: self.clone(),
            authenticated,
        }
    }

    /// Moves a transaction submitted for settlement to `settled`, as the
    /// nightly batch would.
    pub fn settle(
        &self,
        transaction_id: &str,
    ) -> Result<BraintreeTransactionStatus, BraintreeFault> {
        let mut state = self.state.lock();
        let entry = state
            .transactions
            .get_mut(transaction_id)
            .ok_or(BraintreeFault::NotFound)?;
        if entry.transaction.status == BraintreeTransactionStatus::SubmittedForSettlement {
            entry.transaction.status = BraintreeTransactionStatus::Settled;
        }
        Ok(entry.transaction.status)
    }

    fn accepts(&self, config: &BraintreeConfig, environment: BraintreeEnvironment) -> bool {
        environment == BraintreeEnvironment::Sandbox
            && config.merchant_id.peek() == self.account.merchant_id.peek()
            && config.public_key.peek() == self.account.public_key.peek()
            && config.private_key.peek() == self.account.private_key.peek()
    }
}

impl BraintreeTransport for BraintreeSandbox {
    fn connect(
        &self,
        config: &BraintreeConfig,
        environment: BraintreeEnvironment,
    ) -> Arc<dyn BraintreeApi> {
        Arc::new(self.client(config, environment))
    }
}

/// API client bound to one set of credentials.
pub struct SandboxClient {
    sandbox: BraintreeSandbox,
    authenticated: bool,
}

impl SandboxClient {
    fn state(&self) -> Result<MutexGuard<'_, State>, BraintreeFault> {
        if self.authenticated {
            Ok(self.sandbox.state.lock())
        } else {
            Err(BraintreeFault::Authentication)
        }
    }

    fn should_verify(&self, options: &CreditCardOptions) -> bool {
        options
            .verify_card
            .unwrap_or(self.sandbox.verify_cards_by_default)
    }

    fn verify(
        &self,
        number: &CardNumber,
        cvv: Option<&str>,
        billing_address: Option<&BraintreeAddress>,
    ) -> BraintreeVerification {
        verify(number, cvv, billing_address, self.sandbox.reject_cvv_mismatch)
    }
}

impl BraintreeApi for SandboxClient {
    fn customer_find(&self, customer_id: &str) -> ApiResult {
        let state = self.state()?;
        let customer = state
            .customers
            .get(customer_id)
            .ok_or(BraintreeFault::NotFound)?;
        Ok(BraintreeResult {
            customer: Some(customer_view(customer)),
            ..Default::default()
        })
    }

    fn customer_create(&self, params: &Params) -> ApiResult {
        let mut state = self.state()?;
        let request: CustomerRequest = match parse(params) {
            Ok(request) => request,
            Err(result) => return Ok(result),
        };

        let mut errors = Vec::new();
        if request
            .id
            .as_ref()
            .is_some_and(|id| state.customers.contains_key(id))
        {
            errors.push(Rule::CustomerIdTaken.error());
        }
        email_errors(&request.email, &mut errors);
        let card = request
            .credit_card
            .as_ref()
            .and_then(|card| state.validate_card(card, None, &mut errors));
        if !errors.is_empty() {
            return Ok(BraintreeResult::with_errors(errors));
        }

        let card_request = request.credit_card.as_ref();
        let billing_address = card_request
            .and_then(|card| card.billing_address.as_ref())
            .map(|address| address.apply_to(BraintreeAddress::default()));
        let verification = card
            .as_ref()
            .zip(card_request)
            .filter(|(_, request)| self.should_verify(&request.options))
            .map(|(card, _)| {
                self.verify(&card.number, card.cvv.as_deref(), billing_address.as_ref())
            });
        if verification
            .as_ref()
            .is_some_and(|verification| verification.status.is_declined())
        {
            return Ok(BraintreeResult {
                verification,
                ..Default::default()
            });
        }

        let mut customer = BraintreeCustomer {
            id: request.id.clone().unwrap_or_else(|| state.fresh_customer_id()),
            email: request.email.into_value(),
            first_name: request.first_name.into_value(),
            last_name: request.last_name.into_value(),
            credit_cards: Vec::new(),
        };
        let credit_card = card.map(|card| state.vault_card(&mut customer, &card, billing_address));
        state.customers.insert(customer.id.clone(), customer.clone());
        tracing::debug!(customer_id = %customer.id, "sandbox created customer");

        Ok(BraintreeResult {
            customer: Some(customer_view(&customer)),
            credit_card,
            verification,
            ..Default::default()
        })
    }

    fn customer_update(&self, customer_id: &str, params: &Params) -> ApiResult {
        let mut state = self.state()?;
        let mut customer = state
            .customers
            .get(customer_id)
            .cloned()
            .ok_or(BraintreeFault::NotFound)?;
        let request: CustomerRequest = match parse(params) {
            Ok(request) => request,
            Err(result) => return Ok(result),
        };

        let mut errors = Vec::new();
        email_errors(&request.email, &mut errors);
        let existing_token = request
            .credit_card
            .as_ref()
            .and_then(|card| card.options.update_existing_token.clone());
        let existing_index = existing_token.as_ref().and_then(|token| {
            customer
                .credit_cards
                .iter()
                .position(|card| &card.token == token)
        });
        if existing_token.is_some() && existing_index.is_none() {
            errors.push(Rule::UpdateExistingTokenInvalid.error());
        }
        let card = request.credit_card.as_ref().and_then(|card| {
            state.validate_card(card, existing_token.as_deref(), &mut errors)
        });
        if !errors.is_empty() {
            return Ok(BraintreeResult::with_errors(errors));
        }

        let card_request = request.credit_card.as_ref();
        let current_billing = existing_index
            .and_then(|index| customer.credit_cards.get(index))
            .and_then(|card| card.billing_address.clone());
        let billing_address = match card_request.and_then(|card| card.billing_address.as_ref()) {
            Some(address) => Some(address.apply_to(current_billing.unwrap_or_default())),
            None => current_billing,
        };
        let verification = card
            .as_ref()
            .zip(card_request)
            .filter(|(_, request)| self.should_verify(&request.options))
            .map(|(card, _)| {
                self.verify(&card.number, card.cvv.as_deref(), billing_address.as_ref())
            });
        if verification
            .as_ref()
            .is_some_and(|verification| verification.status.is_declined())
        {
            return Ok(BraintreeResult {
                verification,
                ..Default::default()
            });
        }

        customer.email = request.email.apply_to(customer.email);
        customer.first_name = request.first_name.apply_to(customer.first_name);
        customer.last_name = request.last_name.apply_to(customer.last_name);

        let credit_card = match (card, existing_index) {
            (Some(card), Some(index)) => customer.credit_cards.get_mut(index).map(|stored| {
                *stored = card.vaulted(
                    stored.token.clone(),
                    &stored.customer_id,
                    stored.default,
                    billing_address,
                );
                state
                    .card_numbers
                    .insert(stored.token.clone(), card.number.clone());
                stored.clone()
            }),
            (Some(card), None) => Some(state.vault_card(&mut customer, &card, billing_address)),
            (None, _) => None,
        };
        state.customers.insert(customer.id.clone(), customer.clone());

        Ok(BraintreeResult {
            customer: Some(customer_view(&customer)),
            credit_card,
            verification,
            ..Default::default()
        })
    }

    fn customer_delete(&self, customer_id: &str) -> ApiResult {
        let mut state = self.state()?;
        let customer = state
            .customers
            .remove(customer_id)
            .ok_or(BraintreeFault::NotFound)?;
        for card in &customer.credit_cards {
            state.card_numbers.remove(&card.token);
        }
        tracing::debug!(customer_id, "sandbox deleted customer");
        Ok(BraintreeResult::default())
    }

    fn credit_card_create(&self, params: &Params) -> ApiResult {
        let mut state = self.state()?;
        let request: CreditCardRequest = match parse(params) {
            Ok(request) => request,
            Err(result) => return Ok(result),
        };

        let mut errors = Vec::new();
        let customer = match request.customer_id.as_ref() {
            Some(id) => {
                let customer = state.customers.get(id).cloned();
                if customer.is_none() {
                    errors.push(Rule::CardCustomerIdInvalid.error());
                }
                customer
            }
            None => {
                errors.push(Rule::CustomerIdRequired.error());
                None
            }
        };
        let card = state.validate_card(&request, None, &mut errors);
        let (Some(mut customer), Some(card), true) = (customer, card, errors.is_empty()) else {
            return Ok(BraintreeResult::with_errors(errors));
        };

        let billing_address = request
            .billing_address
            .as_ref()
            .map(|address| address.apply_to(BraintreeAddress::default()));
        let verification = self
            .should_verify(&request.options)
            .then(|| self.verify(&card.number, card.cvv.as_deref(), billing_address.as_ref()));
        if verification
            .as_ref()
            .is_some_and(|verification| verification.status.is_declined())
        {
            return Ok(BraintreeResult {
                verification,
                ..Default::default()
            });
        }

        let credit_card = state.vault_card(&mut customer, &card, billing_address);
        state.customers.insert(customer.id.clone(), customer);
        Ok(BraintreeResult {
            credit_card: Some(credit_card),
            verification,
            ..Default::default()
        })
    }

    fn credit_card_verify(&self, customer_id: &str, token: &str) -> ApiResult {
        let state = self.state()?;
        let card = state
            .customers
            .get(customer_id)
            .and_then(|customer| customer.credit_cards.iter().find(|card| card.token == token))
            .ok_or(BraintreeFault::NotFound)?;
        let number = state
            .card_numbers
            .get(token)
            .ok_or(BraintreeFault::NotFound)?;
        let verification = self.verify(number, None, card.billing_address.as_ref());
        let verified = !verification.status.is_declined();
        Ok(BraintreeResult {
            credit_card: verified.then(|| card.clone()),
            verification: Some(verification),
            ..Default::default()
        })
    }

    fn transaction_sale(&self, params: &Params) -> ApiResult {
        let mut state = self.state()?;
        let request: SaleRequest = match parse(params) {
            Ok(request) => request,
            Err(result) => return Ok(result),
        };

        let mut errors = Vec::new();
        let amount = match request.amount.clone().map(StringMajorUnit::new) {
            Some(amount) => parse_amount(&amount)
                .map_err(|rule| errors.push(rule.error()))
                .ok(),
            None => {
                errors.push(Rule::AmountRequired.error());
                None
            }
        };
        email_errors(&request.customer.email, &mut errors);

        enum Funding {
            Card(CardData),
            Vaulted(BraintreeCustomer, BraintreeCreditCard),
        }
        let funding = match (request.credit_card.as_ref(), request.customer_id.as_ref()) {
            (Some(card), _) => CardData::validate(card, &mut errors).map(Funding::Card),
            (None, Some(customer_id)) => match state.customers.get(customer_id) {
                Some(customer) => match customer.default_credit_card() {
                    Some(card) => Some(Funding::Vaulted(customer.clone(), card.clone())),
                    None => {
                        errors.push(Rule::CustomerHasNoCard.error());
                        None
                    }
                },
                None => {
                    errors.push(Rule::SaleCustomerIdInvalid.error());
                    None
                }
            },
            (None, None) => {
                errors.push(Rule::PaymentMethodMissing.error());
                None
            }
        };
        let store_in_vault =
            request.options.store_in_vault && matches!(funding, Some(Funding::Card(_)));
        if store_in_vault
            && request
                .customer
                .id
                .as_ref()
                .is_some_and(|id| state.customers.contains_key(id))
        {
            errors.push(Rule::CustomerIdTaken.error());
        }
        let (Some(amount), Some(funding), true) = (amount, funding, errors.is_empty()) else {
            return Ok(BraintreeResult::with_errors(errors));
        };

        let minor = amount.get_amount_as_i64();
        let cvv_mismatch = self.sandbox.reject_cvv_mismatch
            && matches!(&funding, Funding::Card(card) if cvv_code(card.cvv.as_deref()) == "N");
        let (status, code, text) = if DECLINE_AMOUNTS.contains(&minor) {
            let code = minor / 100;
            (
                BraintreeTransactionStatus::ProcessorDeclined,
                code.to_string(),
                decline_text(code),
            )
        } else if FAILURE_AMOUNTS.contains(&minor) {
            (
                BraintreeTransactionStatus::Failed,
                "3000".to_string(),
                "Processor Network Unavailable - Try Again",
            )
        } else if cvv_mismatch {
            (
                BraintreeTransactionStatus::GatewayRejected,
                CVV_DECLINE_CODE.to_string(),
                decline_text(CVV_DECLINE_CODE),
            )
        } else if request.options.submit_for_settlement {
            (
                BraintreeTransactionStatus::SubmittedForSettlement,
                "1000".to_string(),
                "Approved",
            )
        } else {
            (
                BraintreeTransactionStatus::Authorized,
                "1000".to_string(),
                "Approved",
            )
        };

        let billing_details = match (&request.billing, &funding) {
            (Some(address), _) => address.apply_to(BraintreeAddress::default()),
            (None, Funding::Vaulted(_, card)) => card.billing_address.clone().unwrap_or_default(),
            (None, Funding::Card(_)) => BraintreeAddress::default(),
        };
        let shipping_details = request
            .shipping
            .as_ref()
            .map(|address| address.apply_to(BraintreeAddress::default()))
            .unwrap_or_default();

        let mut customer_details = BraintreeTransactionCustomer {
            id: None,
            email: request.customer.email.value().cloned(),
            first_name: request.customer.first_name.value().cloned(),
            last_name: request.customer.last_name.value().cloned(),
        };
        let mut vault_customer = None;
        let (credit_card_details, cvv) = match funding {
            Funding::Vaulted(customer, card) => {
                customer_details.id = Some(customer.id.clone());
                customer_details.email = customer_details.email.or(customer.email);
                (BraintreeCreditCardDetails::from(&card), None)
            }
            Funding::Card(card) if store_in_vault && !status.is_declined() => {
                let mut customer = BraintreeCustomer {
                    id: request
                        .customer
                        .id
                        .clone()
                        .unwrap_or_else(|| state.fresh_customer_id()),
                    email: customer_details.email.clone(),
                    first_name: customer_details.first_name.clone(),
                    last_name: customer_details.last_name.clone(),
                    credit_cards: Vec::new(),
                };
                let billing = request.billing.is_some().then(|| billing_details.clone());
                let stored = state.vault_card(&mut customer, &card, billing);
                state.customers.insert(customer.id.clone(), customer.clone());
                customer_details.id = Some(customer.id.clone());
                vault_customer = Some(customer_view(&customer));
                (card.details(Some(stored.token)), card.cvv)
            }
            Funding::Card(card) => (card.details(None), card.cvv),
        };

        let transaction = BraintreeTransaction {
            id: state.fresh_transaction_id(),
            kind: BraintreeTransactionType::Sale,
            status,
            amount: amount.to_major_unit_string(),
            order_id: request.order_id,
            merchant_account_id: request.merchant_account_id,
            processor_response_code: code,
            processor_response_text: text.to_string(),
            avs_street_address_response_code: Some(
                avs_street_code(billing_details.street_address.as_deref()).to_string(),
            ),
            avs_postal_code_response_code: Some(
                avs_postal_code(billing_details.postal_code.as_deref()).to_string(),
            ),
            cvv_response_code: Some(cvv_code(cvv.as_deref()).to_string()),
            credit_card_details,
            customer_details,
            billing_details,
            shipping_details,
            vault_customer,
            refunded_transaction_id: None,
        };
        tracing::debug!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            "sandbox processed sale"
        );
        state.record(transaction.clone(), amount);
        Ok(BraintreeResult {
            transaction: Some(transaction),
            ..Default::default()
        })
    }

    fn transaction_submit_for_settlement(
        &self,
        transaction_id: &str,
        amount: Option<&StringMajorUnit>,
    ) -> ApiResult {
        let mut state = self.state()?;
        let entry = state
            .transactions
            .get_mut(transaction_id)
            .ok_or(BraintreeFault::NotFound)?;
        if entry.transaction.status != BraintreeTransactionStatus::Authorized {
            return Ok(Rule::SettlementNotAllowed.result());
        }
        let amount = match amount.map(parse_amount) {
            Some(Ok(amount)) => amount,
            Some(Err(rule)) => return Ok(rule.result()),
            None => entry.authorized,
        };
        if amount > entry.authorized {
            return Ok(Rule::SettlementTooLarge.result());
        }

        entry.transaction.status = BraintreeTransactionStatus::SubmittedForSettlement;
        entry.transaction.amount = amount.to_major_unit_string();
        entry.authorized = amount;
        Ok(BraintreeResult {
            transaction: Some(entry.transaction.clone()),
            ..Default::default()
        })
    }

    fn transaction_void(&self, transaction_id: &str) -> ApiResult {
        let mut state = self.state()?;
        let entry = state
            .transactions
            .get_mut(transaction_id)
            .ok_or(BraintreeFault::NotFound)?;
        if !matches!(
            entry.transaction.status,
            BraintreeTransactionStatus::Authorized
                | BraintreeTransactionStatus::SubmittedForSettlement
        ) {
            return Ok(Rule::VoidNotAllowed.result());
        }
        entry.transaction.status = BraintreeTransactionStatus::Voided;
        Ok(BraintreeResult {
            transaction: Some(entry.transaction.clone()),
            ..Default::default()
        })
    }

    fn transaction_refund(
        &self,
        transaction_id: &str,
        amount: Option<&StringMajorUnit>,
    ) -> ApiResult {
        let mut state = self.state()?;
        let entry = state
            .transactions
            .get_mut(transaction_id)
            .ok_or(BraintreeFault::NotFound)?;
        if entry.transaction.kind != BraintreeTransactionType::Sale
            || entry.transaction.status != BraintreeTransactionStatus::Settled
        {
            return Ok(Rule::RefundNotAllowed.result());
        }
        let remaining = entry.authorized - entry.refunded;
        let amount = match amount.map(parse_amount) {
            Some(Ok(amount)) => amount,
            Some(Err(rule)) => return Ok(rule.result()),
            None => remaining,
        };
        if amount > remaining {
            return Ok(Rule::RefundTooLarge.result());
        }
        entry.refunded = entry.refunded + amount;
        let original = entry.transaction.clone();

        let refund = BraintreeTransaction {
            id: state.fresh_transaction_id(),
            kind: BraintreeTransactionType::Credit,
            status: BraintreeTransactionStatus::SubmittedForSettlement,
            amount: amount.to_major_unit_string(),
            processor_response_code: "1002".to_string(),
            processor_response_text: "Processed".to_string(),
            avs_street_address_response_code: None,
            avs_postal_code_response_code: None,
            cvv_response_code: None,
            vault_customer: None,
            refunded_transaction_id: Some(original.id.clone()),
            ..original
        };
        state.record(refund.clone(), amount);
        Ok(BraintreeResult {
            transaction: Some(refund),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn account() -> BraintreeConfig {
        BraintreeConfig::new("merchant", "public", "private")
    }

    fn sandbox() -> BraintreeSandbox {
        BraintreeSandbox::new(account())
    }

    fn client(sandbox: &BraintreeSandbox) -> SandboxClient {
        sandbox.client(&account(), BraintreeEnvironment::Sandbox)
    }

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    fn card(number: &str) -> Value {
        json!({"number": number, "expiration_month": "09", "expiration_year": "2030"})
    }

    fn codes(result: &BraintreeResult) -> Vec<&str> {
        result.errors.iter().map(|error| error.code.as_str()).collect()
    }

    fn sale(client: &SandboxClient, amount: &str, extra: Value) -> BraintreeResult {
        let mut request = params(json!({
            "amount": amount,
            "credit_card": card("4012888888881881"),
            "options": {"submit_for_settlement": false}
        }));
        request.extend(params(extra));
        client.transaction_sale(&request).unwrap()
    }

    #[test]
    fn wrong_keys_or_environment_fail_authentication() {
        let sandbox = sandbox();
        let wrong_keys = sandbox.client(
            &BraintreeConfig::new("invalid", "invalid", "invalid"),
            BraintreeEnvironment::Sandbox,
        );
        assert_eq!(
            wrong_keys.customer_find("1"),
            Err(BraintreeFault::Authentication)
        );
        let production = sandbox.client(&account(), BraintreeEnvironment::Production);
        assert_eq!(
            production.transaction_void("1"),
            Err(BraintreeFault::Authentication)
        );
    }

    #[test]
    fn customer_create_validates_card_and_email() {
        let sandbox = sandbox();
        let client = client(&sandbox);
        let result = client
            .customer_create(&params(json!({
                "email": "invalid_email",
                "credit_card": card("4012888887881881")
            })))
            .unwrap();
        assert_eq!(codes(&result), vec!["81604", "81715"]);
        assert!(result.customer.is_none());
    }

    #[test]
    fn customer_ids_are_generated_and_unique() {
        let sandbox = sandbox();
        let client = client(&sandbox);
        let result = client
            .customer_create(&params(json!({"credit_card": card("4012888888881881")})))
            .unwrap();
        let customer = result.customer.unwrap();
        assert_eq!(customer.id.len(), VAULT_ID_LENGTH);
        assert_eq!(customer.credit_cards[0].card_type, "Visa");
        assert_eq!(customer.credit_cards[0].masked_number(), "401288******1881");

        let taken = client
            .customer_create(&params(json!({"id": customer.id})))
            .unwrap();
        assert_eq!(codes(&taken), vec!["91609"]);
    }

    #[test]
    fn duplicate_cards_rejected_only_on_request() {
        let sandbox = sandbox();
        let client = client(&sandbox);
        client
            .customer_create(&params(json!({"id": "1", "credit_card": card("4012888888881881")})))
            .unwrap();

        let mut request = params(card("4012888888881881"));
        request.insert("customer_id".to_string(), json!("1"));
        assert!(client.credit_card_create(&request).unwrap().errors.is_empty());

        request.insert(
            "options".to_string(),
            json!({"fail_on_duplicate_payment_method": true}),
        );
        let result = client.credit_card_create(&request).unwrap();
        assert_eq!(codes(&result), vec![DUPLICATE_PAYMENT_METHOD_CODE]);
    }

    #[test]
    fn verification_follows_request_then_account_default() {
        let unverifiable = json!({"id": "1", "credit_card": card(UNVERIFIABLE_CARD_NUMBER)});

        let lenient = sandbox();
        let result = client(&lenient).customer_create(&params(unverifiable.clone())).unwrap();
        assert!(result.is_success());

        let strict = sandbox().with_card_verification_by_default(true);
        let result = client(&strict).customer_create(&params(unverifiable)).unwrap();
        let verification = result.verification.unwrap();
        assert_eq!(verification.status, BraintreeVerificationStatus::ProcessorDeclined);
        assert_eq!(verification.processor_response_code, "2000");
        assert!(result.customer.is_none());

        let mut opted_out = card(UNVERIFIABLE_CARD_NUMBER);
        opted_out["options"] = json!({"verify_card": false});
        let result = client(&strict)
            .customer_create(&params(json!({"id": "2", "credit_card": opted_out})))
            .unwrap();
        assert!(result.is_success());
    }

    #[test]
    fn decline_amounts_and_card_checks() {
        let sandbox = sandbox();
        let client = client(&sandbox);

        let declined = sale(&client, "2000.00", json!({}));
        let transaction = declined.transaction.unwrap();
        assert_eq!(transaction.status, BraintreeTransactionStatus::ProcessorDeclined);
        assert_eq!(transaction.status_message(), "2000 Do Not Honor");

        let insufficient = sale(&client, "2001.50", json!({})).transaction.unwrap();
        assert_eq!(insufficient.status_message(), "2001 Insufficient Funds");

        let approved = sale(
            &client,
            "1.00",
            json!({"billing": {"street_address": "200 E Main St", "postal_code": "60622"}}),
        )
        .transaction
        .unwrap();
        assert_eq!(approved.status, BraintreeTransactionStatus::Authorized);
        assert_eq!(approved.avs_street_address_response_code.as_deref(), Some("N"));
        assert_eq!(approved.avs_postal_code_response_code.as_deref(), Some("M"));
        assert_eq!(approved.cvv_response_code.as_deref(), Some("I"));
    }

    #[test]
    fn cvv_rejection_and_processor_failures() {
        let strict = sandbox()
            .with_card_verification_by_default(true)
            .with_cvv_rejection(true);
        let strict_client = client(&strict);

        let mut mismatched = card("4111111111111111");
        mismatched["cvv"] = json!("200");
        let result = strict_client
            .customer_create(&params(json!({"id": "1", "credit_card": mismatched.clone()})))
            .unwrap();
        let verification = result.verification.clone().unwrap();
        assert_eq!(verification.status, BraintreeVerificationStatus::GatewayRejected);
        assert_eq!(verification.processor_response_code, "2010");
        assert!(!result.is_success());
        assert!(result.customer.is_none());

        let rejected = sale(&strict_client, "10.00", json!({"credit_card": mismatched}));
        assert!(!rejected.is_success());
        let transaction = rejected.transaction.unwrap();
        assert_eq!(transaction.status, BraintreeTransactionStatus::GatewayRejected);
        assert_eq!(transaction.status_message(), "2010 Card Issuer Declined CVV");

        let failed = sale(&strict_client, "3000.00", json!({}));
        assert!(!failed.is_success());
        let transaction = failed.transaction.unwrap();
        assert_eq!(transaction.status, BraintreeTransactionStatus::Failed);
        assert_eq!(transaction.status_message(), "3000 Processor Network Unavailable - Try Again");

        let lenient = sandbox();
        let mut mismatched = card("4111111111111111");
        mismatched["cvv"] = json!("200");
        let accepted = sale(&client(&lenient), "10.00", json!({"credit_card": mismatched}));
        assert!(accepted.is_success());
    }

    #[test]
    fn sale_rejects_unknown_customer_and_bad_amounts() {
        let sandbox = sandbox();
        let client = client(&sandbox);
        let result = client
            .transaction_sale(&params(json!({"amount": "1.00", "customer_id": "missing"})))
            .unwrap();
        assert_eq!(codes(&result), vec!["91510"]);

        let result = sale(&client, "abc", json!({}));
        assert_eq!(codes(&result), vec!["81503"]);
    }

    #[test]
    fn transaction_state_machine() {
        let sandbox = sandbox();
        let client = client(&sandbox);
        let id = sale(&client, "10.00", json!({})).transaction.unwrap().id;

        let too_much = StringMajorUnit::new("20.00".to_string());
        let result = client
            .transaction_submit_for_settlement(&id, Some(&too_much))
            .unwrap();
        assert_eq!(codes(&result), vec!["91522"]);

        let refund = client.transaction_refund(&id, None).unwrap();
        assert_eq!(codes(&refund), vec!["91506"]);

        let settled = client.transaction_submit_for_settlement(&id, None).unwrap();
        assert_eq!(
            settled.transaction.unwrap().status,
            BraintreeTransactionStatus::SubmittedForSettlement
        );
        assert_eq!(
            sandbox.settle(&id),
            Ok(BraintreeTransactionStatus::Settled)
        );
        assert_eq!(codes(&client.transaction_void(&id).unwrap()), vec!["91504"]);

        let partial = StringMajorUnit::new("4.00".to_string());
        let refund = client.transaction_refund(&id, Some(&partial)).unwrap();
        let refund = refund.transaction.unwrap();
        assert_eq!(refund.kind, BraintreeTransactionType::Credit);
        assert_eq!(refund.refunded_transaction_id.as_deref(), Some(id.as_str()));

        let rest = StringMajorUnit::new("6.01".to_string());
        let result = client.transaction_refund(&id, Some(&rest)).unwrap();
        assert_eq!(codes(&result), vec!["91521"]);

        assert_eq!(
            client.transaction_void("missing"),
            Err(BraintreeFault::NotFound)
        );
    }

    #[test]
    fn customer_update_honours_presence() {
        let sandbox = sandbox();
        let client = client(&sandbox);
        let created = client
            .customer_create(&params(json!({
                "id": "1",
                "email": "old@example.com",
                "first_name": "Old",
                "credit_card": card("4111111111111111")
            })))
            .unwrap();
        let token = created.customer.unwrap().credit_cards[0].token.clone();

        let mut new_card = card("4012888888881881");
        new_card["options"] = json!({"update_existing_token": token});
        let updated = client
            .customer_update(
                "1",
                &params(json!({"email": null, "last_name": "New", "credit_card": new_card})),
            )
            .unwrap();
        let customer = updated.customer.unwrap();
        assert_eq!(customer.email, None);
        assert_eq!(customer.first_name.as_deref(), Some("Old"));
        assert_eq!(customer.last_name.as_deref(), Some("New"));
        assert_eq!(customer.credit_cards.len(), 1);
        assert_eq!(customer.credit_cards[0].token, token);
        assert_eq!(customer.credit_cards[0].bin, "401288");

        let mut unknown = card("4012888888881881");
        unknown["options"] = json!({"update_existing_token": "nope"});
        let result = client
            .customer_update("1", &params(json!({"credit_card": unknown})))
            .unwrap();
        assert_eq!(codes(&result), vec!["91723"]);
    }

    #[test]
    fn find_lists_newest_card_first_and_delete_forgets_customer() {
        let sandbox = sandbox();
        let client = client(&sandbox);
        client
            .customer_create(&params(json!({"id": "1", "credit_card": card("4012888888881881")})))
            .unwrap();
        let mut second = params(card("4217651111111119"));
        second.insert("customer_id".to_string(), json!("1"));
        client.credit_card_create(&second).unwrap();

        let customer = client.customer_find("1").unwrap().customer.unwrap();
        assert_eq!(customer.credit_cards[0].last_4, "1119");
        assert_eq!(customer.credit_cards[1].last_4, "1881");
        assert_eq!(
            customer.default_credit_card().map(|card| card.last_4.as_str()),
            Some("1881")
        );

        assert!(client.customer_delete("1").is_ok());
        assert_eq!(client.customer_find("1"), Err(BraintreeFault::NotFound));
        assert_eq!(client.customer_delete("1"), Err(BraintreeFault::NotFound));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("customer@example.com"));
        assert!(!is_valid_email("invalid_email"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@example.com"));
    }
}
