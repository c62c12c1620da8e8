pub mod local;
#[cfg(test)]
pub(crate) mod memory;
#[cfg(feature = "lambda")]
pub mod s3;

pub use local::LocalStorage;
#[cfg(feature = "lambda")]
pub use s3::S3Storage;
