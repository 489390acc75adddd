//! Checkout flow.
//!
//! # Architecture
//!
//! - [`CheckoutSubmitter`] owns the submission state machine
//! - Collaborators ([`CredentialStore`], [`CartStore`], [`Navigator`],
//!   [`OrderGateway`]) are passed in, never looked up
//! - [`InFlightCheckouts`] stops two requests from one session submitting at once
//!
//! # Example
//!
//! ```rust,ignore
//! let mut navigation = RecordedNavigation::default();
//! let mut submitter = CheckoutSubmitter::new(state.backend());
//!
//! match submitter.submit(&form, &credentials, &cart, &mut navigation).await {
//!     Ok(confirmation) => { /* navigation.target() == Some(View::Confirmation) */ }
//!     Err(e) => { /* show e.notice() */ }
//! }
//! ```

pub mod collaborators;
pub mod guard;
pub mod submitter;

pub use collaborators::{
    CartStore, CartStoreError, CredentialStore, GatewayError, Navigator, OrderGateway,
    RecordedNavigation, View,
};
pub use guard::InFlightCheckouts;
pub use submitter::{
    CheckoutError, CheckoutPhase, CheckoutSubmitter, Confirmation, LOGIN_REQUIRED_NOTICE,
    REJECTED_FALLBACK, UNREACHABLE_NOTICE,
};
