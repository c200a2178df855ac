//! Translation between the Chat Completions dialect and the Responses dialect.
//!
//! The core of the proxy: classifies an inbound body, converts legacy requests
//! into Responses requests, and converts Responses output back into the
//! `choices` shape. All translation functions are pure (no I/O).

pub mod classify;
pub mod legacy_types;
pub mod request;
pub mod response;
pub mod target_types;

pub use classify::{classify, is_target_dialect, Dialect, InboundRequest};
pub use request::legacy_to_target;
pub use response::target_to_legacy;
