//! Shared adapter types.

mod bucket_creation;
mod error;

pub use bucket_creation::BucketCreation;
pub(crate) use error::from_object_store;
pub use error::{BoxedError, Error, Result};
