//! Contract of the external audio fingerprint index.
//!
//! The index owns fingerprint data and descriptors. Tonearm only consumes it
//! through [`FingerprintIndex`]; extraction and matching live behind the
//! trait.

mod fingerprint;
mod query_match;

pub use fingerprint::FingerprintIndex;
pub use query_match::QueryMatch;
