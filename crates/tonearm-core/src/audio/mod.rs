//! Audio asset descriptors and identifiers.
//!
//! An asset is addressed two ways that are deliberately kept apart: the
//! [`AudioId`] is derived from the asset's local path and keys the
//! fingerprint index, while the remote object key is derived from the
//! [`AudioInfo`] fields. The same content registered under two paths gets
//! two identifiers, and two different paths with equal descriptors share a
//! remote key.

mod id;
mod info;

pub use id::AudioId;
pub use info::AudioInfo;
