/// Operating environment of the process.
///
/// Gateways and payment-form integrations read their own axis of the mode
/// context, both defaulting to the global value.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    #[default]
    Test,
    Production,
    Development,
    Staging,
}

impl Mode {
    pub fn is_test(self) -> bool {
        matches!(self, Self::Test)
    }
}

/// The uniform operation set every gateway adapter implements.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GatewayAction {
    Authorize,
    Capture,
    Purchase,
    Refund,
    Void,
    Store,
    Unstore,
    Update,
    Verify,
    FindCustomer,
}

impl GatewayAction {
    /// Operations whose primary reference is a vault (customer) id rather
    /// than a transaction id.
    pub fn is_vault_oriented(self) -> bool {
        match self {
            Self::Store | Self::Update | Self::Unstore | Self::FindCustomer | Self::Verify => true,
            Self::Authorize | Self::Capture | Self::Purchase | Self::Refund | Self::Void => false,
        }
    }
}

/// Stable identity of the adapter that produced a response.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GatewayId {
    Offline,
    BraintreeVault,
}

/// Every gateway implementation type known to the registry.
///
/// The registry never grows at runtime: resolution is a scan over this
/// enumeration's variants.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GatewayKind {
    Offline,
    Braintree,
    BraintreeBlue,
    BraintreeVault,
}

impl GatewayKind {
    /// Implementation type name, following the `<Name>Gateway` convention.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Offline => "OfflineGateway",
            Self::Braintree => "BraintreeGateway",
            Self::BraintreeBlue => "BraintreeBlueGateway",
            Self::BraintreeVault => "BraintreeVaultGateway",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Offline => "Offline",
            Self::Braintree | Self::BraintreeBlue | Self::BraintreeVault => {
                "Braintree (Blue Platform)"
            }
        }
    }

    pub fn gateway_id(self) -> GatewayId {
        match self {
            Self::Offline => GatewayId::Offline,
            Self::Braintree | Self::BraintreeBlue | Self::BraintreeVault => {
                GatewayId::BraintreeVault
            }
        }
    }
}

/// Classes of transaction failure that are recovered inside an adapter and
/// surfaced on a failed response.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    Validation,
    NotFound,
    Authentication,
    ProcessorDeclined,
}
