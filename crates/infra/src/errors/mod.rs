//! Error conversions between infrastructure libraries and domain errors

pub mod conversions;

pub use conversions::InfraError;
