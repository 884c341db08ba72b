use serde::Deserialize;

use crate::{payment_method_data::VaultId, presence::Presence};

/// Caller-side option surface shared by every operation.
///
/// Deserializing from a JSON object ignores keys this crate does not know,
/// so the surface can grow without breaking callers.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GatewayOptions {
    /// Vault id to store under.
    pub id: Option<VaultId>,
    /// `None` leaves verification to the backend's default policy.
    pub verify_card: Option<bool>,
    pub fail_on_duplicate_payment_method: Option<bool>,
    pub billing_address: Option<AddressInput>,
    pub shipping_address: Option<AddressInput>,
    pub merchant_account_id: Option<String>,
    pub order_id: Option<String>,
    #[serde(default)]
    pub email: Presence<String>,
    pub description: Option<String>,
    pub recurring: Option<bool>,
    /// Provision a vault entry while purchasing.
    pub store: Option<StoreOption>,
    pub submit_for_settlement: Option<bool>,
}

impl GatewayOptions {
    pub fn with_billing_address(mut self, address: AddressInput) -> Self {
        self.billing_address = Some(address);
        self
    }

    pub fn with_id(mut self, id: impl Into<VaultId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StoreOption {
    /// `true` lets the backend generate the vault id.
    Flag(bool),
    Id(VaultId),
}

impl StoreOption {
    pub fn is_requested(&self) -> bool {
        !matches!(self, Self::Flag(false))
    }

    /// Caller-chosen vault id, if any.
    pub fn vault_id(&self) -> Option<&VaultId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Flag(_) => None,
        }
    }
}

/// Address fields in the caller's vocabulary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressInput {
    pub address1: Presence<String>,
    pub address2: Presence<String>,
    pub company: Presence<String>,
    pub city: Presence<String>,
    pub state: Presence<String>,
    pub zip_code: Presence<String>,
    /// Two-letter country code.
    pub country: Presence<String>,
    pub country_name: Presence<String>,
    pub country_code_alpha2: Presence<String>,
    pub country_code_alpha3: Presence<String>,
    pub country_code_numeric: Presence<u16>,
}

impl AddressInput {
    /// True when the caller supplied no address field at all.
    pub fn is_empty(&self) -> bool {
        let Self {
            address1,
            address2,
            company,
            city,
            state,
            zip_code,
            country,
            country_name,
            country_code_alpha2,
            country_code_alpha3,
            country_code_numeric,
        } = self;
        [
            address1,
            address2,
            company,
            city,
            state,
            zip_code,
            country,
            country_name,
            country_code_alpha2,
            country_code_alpha3,
        ]
        .iter()
        .all(|field| field.is_unset())
            && Self::numeric_country(country_code_numeric).is_none()
    }

    /// The numeric country code, if one was supplied. `0` and explicit
    /// null count as absent.
    pub fn supplied_country_code_numeric(&self) -> Option<u16> {
        Self::numeric_country(&self.country_code_numeric)
    }

    fn numeric_country(code: &Presence<u16>) -> Option<u16> {
        code.value().copied().filter(|code| *code != 0)
    }

    pub fn street(address1: &str) -> Self {
        Self {
            address1: Presence::Value(address1.to_string()),
            ..Default::default()
        }
    }
}
