//! Testing utilities and helpers
//!
//! - **[`mocks`]**: session store double with failure injection and a call log
//!
//! ## Usage
//!
//! ```rust
//! use eventhorizon_common::testing::{MockSessionStore, StoreOp};
//!
//! let store = MockSessionStore::new();
//! store.fail_on(StoreOp::Put);
//! ```

pub mod mocks;

pub use mocks::{MockSessionStore, StoreOp};
