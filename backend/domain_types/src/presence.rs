//! Presence-aware optional values.
//!
//! Backends with partial-update semantics treat an absent field as "leave
//! unchanged" and an explicit `null` as "clear". A plain `Option` cannot carry
//! that distinction through normalization, so caller input that may be
//! forwarded to such a backend is modelled as [`Presence`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Presence<T> {
    /// Not supplied by the caller.
    #[default]
    Unset,
    /// Supplied as an explicit null.
    Null,
    /// Supplied with a value.
    Value(T),
}

impl<T> Presence<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Presence<U> {
        match self {
            Self::Unset => Presence::Unset,
            Self::Null => Presence::Null,
            Self::Value(value) => Presence::Value(f(value)),
        }
    }

    /// Keeps the current value unless it is unset, in which case `other` is used.
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Unset => other,
            supplied => supplied,
        }
    }

    /// Resolves a partial update against a stored value: unset keeps the
    /// stored value, null clears it, a value replaces it.
    pub fn apply_to(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Unset => current,
            Self::Null => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Converts into JSON for a backend payload. Unset yields `None` so the
    /// caller can omit the key entirely.
    pub fn to_json(&self) -> Option<serde_json::Value>
    where
        T: Serialize,
    {
        match self {
            Self::Unset => None,
            Self::Null => Some(serde_json::Value::Null),
            Self::Value(value) => {
                Some(serde_json::to_value(value).unwrap_or(serde_json::Value::Null))
            }
        }
    }
}

impl<T> From<Option<T>> for Presence<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

/// Unset serializes as `null`; pair with
/// `#[serde(skip_serializing_if = "Presence::is_unset")]` to omit the key.
impl<T: Serialize> Serialize for Presence<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

/// A present key deserializes to `Null` or `Value`; pair with
/// `#[serde(default)]` so a missing key becomes `Unset`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Presence<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize)]
    struct Fields {
        #[serde(default, skip_serializing_if = "Presence::is_unset")]
        company: Presence<String>,
        #[serde(default, skip_serializing_if = "Presence::is_unset")]
        region: Presence<String>,
        #[serde(default, skip_serializing_if = "Presence::is_unset")]
        locality: Presence<String>,
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        let fields: Fields =
            serde_json::from_value(json!({"company": null, "region": "Illinois"})).unwrap();
        assert_eq!(fields.company, Presence::Null);
        assert_eq!(fields.region, Presence::Value("Illinois".to_string()));
        assert_eq!(fields.locality, Presence::Unset);
    }

    #[test]
    fn serializing_omits_unset_and_keeps_explicit_null() {
        let fields = Fields {
            company: Presence::Null,
            region: Presence::Value("IL".to_string()),
            locality: Presence::Unset,
        };
        assert_eq!(
            serde_json::to_value(fields).unwrap(),
            json!({"company": null, "region": "IL"})
        );
    }

    #[test]
    fn apply_to_follows_partial_update_rules() {
        let stored = Some("Widgets Co".to_string());
        assert_eq!(Presence::Unset.apply_to(stored.clone()), stored);
        assert_eq!(Presence::<String>::Null.apply_to(stored.clone()), None);
        assert_eq!(
            Presence::Value("Acme".to_string()).apply_to(stored),
            Some("Acme".to_string())
        );
    }

    #[test]
    fn or_prefers_supplied_values() {
        let fallback = Presence::Value(1);
        assert_eq!(Presence::Unset.or(fallback.clone()), fallback);
        assert_eq!(Presence::Null.or(fallback), Presence::Null);
    }
}
