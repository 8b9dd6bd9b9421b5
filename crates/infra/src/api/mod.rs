//! Resource API adapter
//!
//! Bearer-authenticated calls against the EventHorizon API. Status codes are
//! passed through untouched; interpreting them is left to
//! `eventhorizon-core`.

pub mod client;

pub use client::{form_pairs, ApiClient};
