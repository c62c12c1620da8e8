// Adapters layer: concrete implementations of the domain ports (Spotify API,
// blob storage) and the trigger payloads the hosting runtime delivers.

pub mod spotify;
pub mod storage;
pub mod trigger;
