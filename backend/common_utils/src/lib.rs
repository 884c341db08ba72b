//! Common utilities for the gateway crates

pub mod consts;
pub mod errors;
pub mod types;

pub use errors::{CustomResult, ParsingError};
pub use types::{MinorUnit, StringMajorUnit};

use rand::{distributions::Alphanumeric, Rng};

/// Generate a random lowercase alphanumeric identifier of the given length.
pub fn generate_alphanumeric_id(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Generate a random numeric identifier of the given length with no leading zero.
pub fn generate_numeric_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|position| {
            let digit = if position == 0 {
                rng.gen_range(1..10)
            } else {
                rng.gen_range(0..10)
            };
            char::from(b'0' + digit)
        })
        .collect()
}
