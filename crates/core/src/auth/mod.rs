//! Authorization Code + PKCE login flow
//!
//! ```text
//!   ANONYMOUS ──begin_login──► AWAITING_CALLBACK ──handle_callback──► AUTHENTICATED
//!       ▲                            │   (error / mismatch /                │
//!       │                            │    exchange failure)                 │
//!       └────────────────────────────┴──────────── logout / 401 ◄───────────┘
//! ```
//!
//! The state is never cached on the controller; it is derived from the
//! session store on every call.

pub mod callback;
pub mod controller;
pub mod error;

pub use callback::CallbackParams;
pub use controller::{AuthFlowController, LoginRedirect, SessionState};
pub use error::FlowError;
