//! Content type resolution for audio containers.

mod content_type;

pub use content_type::ContentType;
