pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use adapters::storage::S3Storage;
#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use adapters::spotify::{SpotifyClient, SpotifyCredentials};
pub use adapters::storage::LocalStorage;
pub use config::PipelineSettings;
pub use core::{etl::EtlEngine, extractor::Extractor, transformer::Transformer};
pub use utils::error::{EtlError, Result};
