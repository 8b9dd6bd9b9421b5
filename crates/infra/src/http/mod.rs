//! HTTP client shared by the token and resource adapters

pub mod client;

pub use client::{BufferedResponse, HttpClient, HttpClientBuilder, TransportError};
