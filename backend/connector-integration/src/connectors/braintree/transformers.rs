use common_utils::types::StringMajorUnit;
use domain_types::router_response_types::{AvsResult, CvvResult, Params};
use interfaces::outcome::{
    Declination, DeclinationSource, Entity, GatewayOutcome, References, ValidationError,
    ValidationKind,
};
use serde_json::{json, Value};

pub const DUPLICATE_PAYMENT_METHOD_CODE: &str = "81724";

/// Faults the Braintree client raises instead of returning a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BraintreeFault {
    #[error("Braintree::NotFoundError")]
    NotFound,
    #[error("Braintree::AuthenticationError")]
    Authentication,
}

impl BraintreeFault {
    /// Fully qualified name of the native fault class.
    pub fn name(self) -> &'static str {
        match self {
            Self::NotFound => "Braintree::NotFoundError",
            Self::Authentication => "Braintree::AuthenticationError",
        }
    }
}

impl From<BraintreeFault> for GatewayOutcome {
    fn from(fault: BraintreeFault) -> Self {
        match fault {
            BraintreeFault::NotFound => Self::NotFound { fault: fault.name() },
            BraintreeFault::Authentication => Self::AuthFailure { fault: fault.name() },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BraintreeAddress {
    pub street_address: Option<String>,
    pub extended_address: Option<String>,
    pub company: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country_name: Option<String>,
    pub country_code_alpha2: Option<String>,
    pub country_code_alpha3: Option<String>,
    pub country_code_numeric: Option<String>,
}

/// A card stored in the vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BraintreeCreditCard {
    pub token: String,
    pub bin: String,
    pub last_4: String,
    pub card_type: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub cardholder_name: Option<String>,
    pub customer_id: String,
    pub default: bool,
    pub billing_address: Option<BraintreeAddress>,
}

impl BraintreeCreditCard {
    pub fn masked_number(&self) -> String {
        masked_number(&self.bin, &self.last_4)
    }

    pub fn expiration_date(&self) -> String {
        format!("{}/{}", self.expiration_month, self.expiration_year)
    }
}

/// Card as it appears on a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BraintreeCreditCardDetails {
    pub token: Option<String>,
    pub bin: String,
    pub last_4: String,
    pub card_type: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub cardholder_name: Option<String>,
}

impl BraintreeCreditCardDetails {
    pub fn masked_number(&self) -> String {
        masked_number(&self.bin, &self.last_4)
    }
}

impl From<&BraintreeCreditCard> for BraintreeCreditCardDetails {
    fn from(card: &BraintreeCreditCard) -> Self {
        Self {
            token: Some(card.token.clone()),
            bin: card.bin.clone(),
            last_4: card.last_4.clone(),
            card_type: card.card_type.clone(),
            expiration_month: card.expiration_month.clone(),
            expiration_year: card.expiration_year.clone(),
            cardholder_name: card.cardholder_name.clone(),
        }
    }
}

fn masked_number(bin: &str, last_4: &str) -> String {
    format!("{bin}******{last_4}")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BraintreeCustomer {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub credit_cards: Vec<BraintreeCreditCard>,
}

impl BraintreeCustomer {
    pub fn default_credit_card(&self) -> Option<&BraintreeCreditCard> {
        self.credit_cards.iter().find(|card| card.default)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BraintreeVerificationStatus {
    Verified,
    ProcessorDeclined,
    GatewayRejected,
}

impl BraintreeVerificationStatus {
    pub fn is_declined(self) -> bool {
        !matches!(self, Self::Verified)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BraintreeVerification {
    pub id: String,
    pub status: BraintreeVerificationStatus,
    pub processor_response_code: String,
    pub processor_response_text: String,
    pub cvv_response_code: Option<String>,
    pub avs_street_address_response_code: Option<String>,
    pub avs_postal_code_response_code: Option<String>,
}

impl BraintreeVerification {
    pub fn declination(&self) -> Declination {
        Declination {
            source: DeclinationSource::Verification,
            code: self.processor_response_code.clone(),
            text: self.processor_response_text.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BraintreeTransactionStatus {
    Authorized,
    SubmittedForSettlement,
    Settled,
    Voided,
    ProcessorDeclined,
    GatewayRejected,
    Failed,
}

impl BraintreeTransactionStatus {
    pub fn is_declined(self) -> bool {
        matches!(
            self,
            Self::ProcessorDeclined | Self::GatewayRejected | Self::Failed
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BraintreeTransactionType {
    Sale,
    Credit,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BraintreeTransactionCustomer {
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BraintreeTransaction {
    pub id: String,
    pub kind: BraintreeTransactionType,
    pub status: BraintreeTransactionStatus,
    pub amount: StringMajorUnit,
    pub order_id: Option<String>,
    pub merchant_account_id: Option<String>,
    pub processor_response_code: String,
    pub processor_response_text: String,
    pub avs_street_address_response_code: Option<String>,
    pub avs_postal_code_response_code: Option<String>,
    pub cvv_response_code: Option<String>,
    pub credit_card_details: BraintreeCreditCardDetails,
    pub customer_details: BraintreeTransactionCustomer,
    pub billing_details: BraintreeAddress,
    pub shipping_details: BraintreeAddress,
    pub vault_customer: Option<BraintreeCustomer>,
    pub refunded_transaction_id: Option<String>,
}

impl BraintreeTransaction {
    /// Processor response rendered as `"<code> <text>"`.
    pub fn status_message(&self) -> String {
        format!(
            "{} {}",
            self.processor_response_code, self.processor_response_text
        )
    }

    pub fn declination(&self) -> Declination {
        Declination {
            source: DeclinationSource::Transaction,
            code: self.processor_response_code.clone(),
            text: self.processor_response_text.clone(),
        }
    }

    pub fn avs_result(&self) -> AvsResult {
        AvsResult::from_matches(
            self.avs_street_address_response_code.clone(),
            self.avs_postal_code_response_code.clone(),
        )
    }

    pub fn cvv_result(&self) -> CvvResult {
        CvvResult::new(self.cvv_response_code.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BraintreeValidationError {
    pub attribute: String,
    pub code: String,
    pub message: String,
}

impl BraintreeValidationError {
    pub fn new(attribute: &str, code: &str, message: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<BraintreeValidationError> for ValidationError {
    fn from(error: BraintreeValidationError) -> Self {
        let kind = if error.code == DUPLICATE_PAYMENT_METHOD_CODE {
            ValidationKind::Duplicate
        } else {
            ValidationKind::Invalid
        };
        Self {
            code: error.code,
            description: error.message,
            kind,
        }
    }
}

/// Result object returned by every Braintree client call that did not fault.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BraintreeResult {
    pub customer: Option<BraintreeCustomer>,
    pub credit_card: Option<BraintreeCreditCard>,
    pub transaction: Option<BraintreeTransaction>,
    pub verification: Option<BraintreeVerification>,
    pub errors: Vec<BraintreeValidationError>,
}

impl BraintreeResult {
    pub fn with_errors(errors: Vec<BraintreeValidationError>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
            && self
                .verification
                .as_ref()
                .map_or(true, |verification| !verification.status.is_declined())
            && self
                .transaction
                .as_ref()
                .map_or(true, |transaction| !transaction.status.is_declined())
    }
}

/// Sorts a client call into the closed outcome set. Validation errors win
/// over a declined verification, which wins over a declined transaction.
/// `build_entity` supplies the params for both successes and declines.
pub fn classify_result<F>(
    result: Result<BraintreeResult, BraintreeFault>,
    references: References,
    build_entity: F,
) -> GatewayOutcome
where
    F: FnOnce(BraintreeResult) -> Entity,
{
    let result = match result {
        Ok(result) => result,
        Err(fault) => return fault.into(),
    };

    if !result.errors.is_empty() {
        return GatewayOutcome::Validation {
            errors: result.errors.into_iter().map(ValidationError::from).collect(),
            references,
        };
    }

    let declination = result
        .verification
        .as_ref()
        .filter(|verification| verification.status.is_declined())
        .map(BraintreeVerification::declination)
        .or_else(|| {
            result
                .transaction
                .as_ref()
                .filter(|transaction| transaction.status.is_declined())
                .map(BraintreeTransaction::declination)
        });

    match declination {
        Some(declination) => GatewayOutcome::Declined {
            declination,
            entity: build_entity(result),
        },
        None => GatewayOutcome::SuccessWithEntity(build_entity(result)),
    }
}

pub fn customer_hash(customer: &BraintreeCustomer) -> Value {
    json!({
        "email": customer.email,
        "first_name": customer.first_name,
        "last_name": customer.last_name,
        "credit_cards": customer.credit_cards.iter().map(credit_card_hash).collect::<Vec<_>>(),
        "id": customer.id,
    })
}

fn credit_card_hash(card: &BraintreeCreditCard) -> Value {
    json!({
        "bin": card.bin,
        "expiration_date": card.expiration_date(),
        "token": card.token,
        "last_4": card.last_4,
        "card_type": card.card_type,
        "masked_number": card.masked_number(),
        "cardholder_name": card.cardholder_name,
        "billing_address": card.billing_address.as_ref().map(|address| json!({
            "street_address": address.street_address,
            "extended_address": address.extended_address,
            "city": address.locality,
            "state": address.region,
            "postal_code": address.postal_code,
        })),
    })
}

pub fn transaction_hash(transaction: &BraintreeTransaction) -> Value {
    let card = &transaction.credit_card_details;
    json!({
        "order_id": transaction.order_id,
        "status": transaction.status.to_string(),
        "credit_card_details": {
            "masked_number": card.masked_number(),
            "bin": card.bin,
            "last_4": card.last_4,
            "card_type": card.card_type,
            "token": card.token,
        },
        "customer_details": {
            "id": transaction.customer_details.id,
            "email": transaction.customer_details.email,
        },
        "billing_details": address_details(&transaction.billing_details),
        "shipping_details": address_details(&transaction.shipping_details),
        "vault_customer": transaction.vault_customer.as_ref().map(customer_hash),
        "merchant_account_id": transaction.merchant_account_id,
        "amount": transaction.amount.get_amount_as_string(),
    })
}

fn address_details(address: &BraintreeAddress) -> Value {
    json!({
        "street_address": address.street_address,
        "extended_address": address.extended_address,
        "company": address.company,
        "locality": address.locality,
        "region": address.region,
        "postal_code": address.postal_code,
        "country_name": address.country_name,
    })
}

pub fn verification_hash(verification: &BraintreeVerification) -> Value {
    json!({
        "id": verification.id,
        "status": verification.status.to_string(),
        "processor_response_code": verification.processor_response_code,
        "processor_response_text": verification.processor_response_text,
        "cvv_response_code": verification.cvv_response_code,
        "avs_street_address_response_code": verification.avs_street_address_response_code,
        "avs_postal_code_response_code": verification.avs_postal_code_response_code,
    })
}

/// Inserts `key` only when `value` is present.
pub(crate) fn insert_some(params: &mut Params, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value);
    }
}
