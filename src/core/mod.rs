pub mod archive;
pub mod etl;
pub mod extractor;
pub mod layout;
pub mod projection;
pub mod tabular;
pub mod transformer;

pub use crate::domain::model::{AlbumRecord, ArchiveScope, ArtistRecord, SongRecord};
pub use crate::domain::ports::{ConfigProvider, PlaylistSource, Storage};
pub use crate::utils::error::Result;
