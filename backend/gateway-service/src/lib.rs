pub mod base;
pub mod configs;
pub mod error;
pub mod logger;

pub use base::Base;
