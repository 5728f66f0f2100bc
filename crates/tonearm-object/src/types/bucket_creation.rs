//! Outcome of a bucket creation request.

/// What a [`BucketProvider::create_bucket`](crate::providers::BucketProvider::create_bucket)
/// call actually did.
///
/// Providers translate backend conflict signalling into
/// [`BucketCreation::AlreadyExists`] so that callers never see it as an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    /// The bucket was created by this call.
    Created,
    /// The bucket existed before this call.
    AlreadyExists,
}

impl BucketCreation {
    /// Returns `true` if this call created the bucket.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}
