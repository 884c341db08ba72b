pub mod gateway_types;
pub mod outcome;
pub mod translator;
