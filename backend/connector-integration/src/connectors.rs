pub mod braintree;
pub use self::braintree::Braintree;

pub mod offline;
pub use self::offline::Offline;
