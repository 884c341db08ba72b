use std::fmt;

use hyperswitch_masking::Secret;
use serde::{Deserialize, Deserializer, Serialize};

/// Card data as supplied by the caller.
#[derive(Clone, Debug, Deserialize)]
pub struct CreditCard {
    pub card_number: Secret<String>,
    pub card_exp_month: u8,
    pub card_exp_year: u16,
    #[serde(default)]
    pub card_cvc: Option<Secret<String>>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl CreditCard {
    pub fn new(card_number: impl Into<String>, card_exp_month: u8, card_exp_year: u16) -> Self {
        Self {
            card_number: Secret::new(card_number.into()),
            card_exp_month,
            card_exp_year,
            card_cvc: None,
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_cvc(mut self, cvc: impl Into<String>) -> Self {
        self.card_cvc = Some(Secret::new(cvc.into()));
        self
    }

    pub fn with_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn get_expiry_month_2_digit(&self) -> String {
        format!("{:02}", self.card_exp_month)
    }

    pub fn get_expiry_year_4_digit(&self) -> String {
        if self.card_exp_year < 100 {
            format!("20{:02}", self.card_exp_year)
        } else {
            self.card_exp_year.to_string()
        }
    }

    /// First and last name joined, when either is known.
    pub fn cardholder_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Identifier of a customer in a backend's vault.
///
/// Callers may hand over numeric ids; they are carried as strings so the
/// canonical form always round-trips as a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VaultId(String);

impl VaultId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VaultId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VaultId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for VaultId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for VaultId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawVaultId {
            Text(String),
            Number(u64),
        }

        Ok(match RawVaultId::deserialize(deserializer)? {
            RawVaultId::Text(id) => Self(id),
            RawVaultId::Number(id) => Self(id.to_string()),
        })
    }
}

/// What a sale is charged against: a fresh card or a vaulted customer.
#[derive(Clone, Debug)]
pub enum PaymentSource {
    Card(CreditCard),
    Vault(VaultId),
}

impl From<CreditCard> for PaymentSource {
    fn from(card: CreditCard) -> Self {
        Self::Card(card)
    }
}

impl From<VaultId> for PaymentSource {
    fn from(vault_id: VaultId) -> Self {
        Self::Vault(vault_id)
    }
}
