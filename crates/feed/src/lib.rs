//! Feed-side collaborators for the straddle manager.
//!
//! Provides the in-memory tick store a websocket transport writes into,
//! option-leg symbol conventions, and nearest-expiry selection over
//! already-fetched option chains.

pub mod expiry;
pub mod store;
pub mod types;

pub use expiry::{
    nearest_expiry, ChainSummary, DteStatus, ExpiryResolver, ExpirySelection,
    StaticExpiryResolver,
};
pub use store::LiveDataStore;
pub use types::OptionRight;
