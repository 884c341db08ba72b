//! Name resolution for gateway implementations.
//!
//! A symbolic name such as `braintree_blue`, `BraintreeBlue` or
//! `braintree-blue` is canonicalised, turned into the `<Name>Gateway` type
//! name and looked up in the compile-time table of [`GatewayKind`]s.

use common_enums::GatewayKind;
use common_utils::{consts::GATEWAY_TYPE_SUFFIX, CustomResult};
use domain_types::errors::UnknownGatewayError;
use error_stack::report;
use strum::IntoEnumIterator;

/// Lower-case, underscored form of a gateway name.
pub fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.trim().chars() {
        match c {
            ' ' | '-' | '_' => {
                if previous.is_some_and(|p| p != '_') {
                    canonical.push('_');
                }
                previous = Some('_');
                continue;
            }
            c if c.is_uppercase() => {
                if previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                    canonical.push('_');
                }
                canonical.extend(c.to_lowercase());
            }
            c => canonical.push(c),
        }
        previous = Some(c);
    }
    canonical.trim_end_matches('_').to_string()
}

/// `braintree_vault` -> `BraintreeVaultGateway`.
pub fn type_name(canonical: &str) -> String {
    let mut type_name: String = canonical
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect();
    type_name.push_str(GATEWAY_TYPE_SUFFIX);
    type_name
}

/// Resolves `name` to the registered implementation.
pub fn resolve(name: &str) -> CustomResult<GatewayKind, UnknownGatewayError> {
    let canonical = canonical_name(name);
    if canonical.is_empty() {
        return Err(report!(UnknownGatewayError::new(name, GATEWAY_TYPE_SUFFIX))
            .attach_printable("gateway name is empty"));
    }

    let wanted = type_name(&canonical);
    match GatewayKind::iter().find(|kind| kind.type_name() == wanted) {
        Some(kind) => {
            tracing::debug!(name, gateway = kind.type_name(), "resolved gateway");
            Ok(kind)
        }
        None => Err(report!(UnknownGatewayError::new(name, wanted))
            .attach_printable(format!("canonical name `{canonical}` is not registered"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalises_spellings() {
        assert_eq!(canonical_name("braintree_blue"), "braintree_blue");
        assert_eq!(canonical_name("BraintreeBlue"), "braintree_blue");
        assert_eq!(canonical_name(" braintree-blue "), "braintree_blue");
        assert_eq!(canonical_name("Braintree Vault"), "braintree_vault");
        assert_eq!(canonical_name("OFFLINE"), "offline");
        assert_eq!(canonical_name("   "), "");
    }

    #[test]
    fn derives_type_names() {
        assert_eq!(type_name("braintree_vault"), "BraintreeVaultGateway");
        assert_eq!(type_name("offline"), "OfflineGateway");
    }

    #[test]
    fn resolves_every_registered_name() {
        assert_eq!(resolve("offline").ok(), Some(GatewayKind::Offline));
        assert_eq!(resolve("braintree").ok(), Some(GatewayKind::Braintree));
        assert_eq!(resolve("BraintreeBlue").ok(), Some(GatewayKind::BraintreeBlue));
        assert_eq!(
            resolve("braintree_vault").ok(),
            Some(GatewayKind::BraintreeVault)
        );
        for kind in GatewayKind::iter() {
            let resolved = resolve(kind.type_name().trim_end_matches(GATEWAY_TYPE_SUFFIX));
            assert_eq!(resolved.ok(), Some(kind));
            assert!(!kind.display_name().is_empty());
        }
    }

    #[test]
    fn unknown_and_empty_names_fail() {
        let error = resolve("nonexistent_gateway").unwrap_err();
        assert_eq!(
            error.current_context(),
            &UnknownGatewayError::new("nonexistent_gateway", "NonexistentGatewayGateway")
        );
        assert!(resolve("").is_err());
        assert!(resolve("  ").is_err());
        assert!(resolve("braintree_classic").is_err());
    }
}
