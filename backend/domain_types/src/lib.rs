pub mod errors;
pub mod mode;
pub mod normalizer;
pub mod payment_method_data;
pub mod presence;
pub mod router_request_types;
pub mod router_response_types;
pub mod types;
