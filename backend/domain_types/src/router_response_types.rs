use common_enums::{FailureKind, GatewayAction, GatewayId};
use serde::Serialize;
use serde_json::Value;

/// Ordered, canonical nested representation of what a backend exposed.
pub type Params = serde_json::Map<String, Value>;

/// Address verification outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AvsResult {
    pub code: Option<String>,
    pub message: Option<String>,
    pub street_match: Option<String>,
    pub postal_match: Option<String>,
}

impl AvsResult {
    /// Result for backends that only report per-field matches.
    pub fn from_matches(street_match: Option<String>, postal_match: Option<String>) -> Self {
        Self {
            code: None,
            message: None,
            street_match,
            postal_match,
        }
    }
}

/// Card verification value outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CvvResult {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl CvvResult {
    pub fn new(code: Option<&str>) -> Self {
        let code = code.map(str::to_uppercase).filter(|code| !code.is_empty());
        let message = code.as_deref().and_then(cvv_message).map(str::to_string);
        Self { code, message }
    }
}

fn cvv_message(code: &str) -> Option<&'static str> {
    match code {
        "M" => Some("Match"),
        "N" => Some("No Match"),
        "P" => Some("Not Processed"),
        "S" => Some("Should have been present"),
        "U" => Some("Issuer unable to process request"),
        _ => None,
    }
}

/// Immutable outcome of a single gateway operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    success: bool,
    message: String,
    params: Option<Params>,
    authorization: Option<String>,
    avs_result: AvsResult,
    cvv_result: CvvResult,
    gateway: GatewayId,
    action: GatewayAction,
    failure_kind: Option<FailureKind>,
    test: bool,
}

impl Response {
    pub fn new(
        gateway: GatewayId,
        action: GatewayAction,
        success: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success,
            message: message.into(),
            params: None,
            authorization: None,
            avs_result: AvsResult::default(),
            cvv_result: CvvResult::default(),
            gateway,
            action,
            failure_kind: None,
            test: false,
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_authorization(mut self, authorization: Option<String>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn with_avs_result(mut self, avs_result: AvsResult) -> Self {
        self.avs_result = avs_result;
        self
    }

    pub fn with_cvv_result(mut self, cvv_result: CvvResult) -> Self {
        self.cvv_result = cvv_result;
        self
    }

    pub fn with_failure_kind(mut self, failure_kind: FailureKind) -> Self {
        self.failure_kind = Some(failure_kind);
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Top-level params lookup; `None` when absent or when the response
    /// carries no params at all.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|params| params.get(key))
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn avs_result(&self) -> &AvsResult {
        &self.avs_result
    }

    pub fn cvv_result(&self) -> &CvvResult {
        &self.cvv_result
    }

    pub fn gateway(&self) -> GatewayId {
        self.gateway
    }

    pub fn action(&self) -> GatewayAction {
        self.action
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure_kind
    }

    pub fn is_test(&self) -> bool {
        self.test
    }
}
