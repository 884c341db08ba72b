mod validate;

pub use validate::{CCValError, CardIssuer, CardNumber, CardNumberStrategy};
