use std::{fmt, str::FromStr, sync::LazyLock};

use hyperswitch_masking::{PeekInterface, Secret, Strategy, WithType};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("not a valid credit card number")]
pub struct CCValError;

/// Card number that passed the Luhn check.
#[derive(Clone, Debug)]
pub struct CardNumber(Secret<String, CardNumberStrategy>);

impl CardNumber {
    /// First six digits, the issuer identification number.
    pub fn get_card_isin(&self) -> String {
        self.0.peek().chars().take(6).collect::<String>()
    }

    pub fn get_card_no(&self) -> String {
        self.0.peek().clone()
    }

    pub fn get_last4(&self) -> String {
        let number = self.0.peek();
        number
            .get(number.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_string()
    }

    pub fn get_card_issuer(&self) -> Option<CardIssuer> {
        CARD_REGEX
            .iter()
            .find(|(_, regex)| regex.is_match(self.0.peek()))
            .map(|(issuer, _)| *issuer)
    }
}

impl PartialEq for CardNumber {
    fn eq(&self, other: &Self) -> bool {
        self.0.peek() == other.0.peek()
    }
}

impl Eq for CardNumber {}

impl FromStr for CardNumber {
    type Err = CCValError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cc_no_whitespace: String = s.split_whitespace().collect();
        let well_formed = (12..=19).contains(&cc_no_whitespace.len())
            && cc_no_whitespace.bytes().all(|b| b.is_ascii_digit());
        if well_formed && luhn::valid(&cc_no_whitespace) {
            Ok(Self(Secret::new(cc_no_whitespace)))
        } else {
            Err(CCValError)
        }
    }
}

impl<'de> Deserialize<'de> for CardNumber {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub enum CardNumberStrategy {}

impl<T> Strategy<T> for CardNumberStrategy
where
    T: AsRef<str>,
{
    fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val_str: &str = val.as_ref();

        if val_str.len() < 15 || val_str.len() > 19 {
            return WithType::fmt(val, f);
        }

        match val_str.get(..6) {
            Some(value) => write!(f, "{}{}", value, "*".repeat(val_str.len() - 6)),
            None => WithType::fmt(val, f),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq, strum::Display)]
pub enum CardIssuer {
    #[strum(serialize = "American Express")]
    AmericanExpress,
    #[strum(serialize = "MasterCard")]
    Master,
    Maestro,
    Visa,
    Discover,
    #[strum(serialize = "Diners Club")]
    DinersClub,
    #[strum(serialize = "JCB")]
    Jcb,
    #[strum(serialize = "Carte Blanche")]
    CarteBlanche,
}

static CARD_REGEX: LazyLock<Vec<(CardIssuer, Regex)>> = LazyLock::new(|| {
    [
        (CardIssuer::Master, r"^5[1-5][0-9]{14}$"),
        (CardIssuer::AmericanExpress, r"^3[47][0-9]{13}$"),
        (CardIssuer::Visa, r"^4[0-9]{12}(?:[0-9]{3})?$"),
        (
            CardIssuer::Discover,
            r"^(65[4-9][0-9]{13}|64[4-9][0-9]{13}|6011[0-9]{12})$",
        ),
        (
            CardIssuer::Maestro,
            r"^(5018|5020|5038|5893|6304|6759|6761|6762|6763)[0-9]{8,15}$",
        ),
        (CardIssuer::CarteBlanche, r"^389[0-9]{11}$"),
        (CardIssuer::DinersClub, r"^3(?:0[0-5]|[68][0-9])[0-9]{11}$"),
        (
            CardIssuer::Jcb,
            r"^(3(?:088|096|112|158|337|5(?:2[89]|[3-8][0-9]))\d{12})$",
        ),
    ]
    .into_iter()
    .filter_map(|(issuer, pattern)| Regex::new(pattern).ok().map(|regex| (issuer, regex)))
    .collect()
});
