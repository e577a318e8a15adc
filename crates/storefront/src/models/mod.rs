//! Domain models for storefront session state.

pub mod session;

pub use session::keys as session_keys;
