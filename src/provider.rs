//! Provider kinds, configuration, and the registry that turns configuration into adapters.
//!
//! `config` holds the caller-owned [`ProviderConfig`] (client credentials, HTTPS-only endpoint
//! overrides, expiry quirks) and its validating builder. `registry` maps a configured kind to
//! a constructed [`Adapter`](crate::adapter::Adapter) without performing any I/O.

pub mod builder;
pub mod config;
pub mod kind;
pub mod quirks;
pub mod registry;

pub use builder::*;
pub use config::*;
pub use kind::*;
pub use quirks::*;
pub use registry::*;
