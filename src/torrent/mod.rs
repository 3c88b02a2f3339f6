pub mod metadata;
pub mod infohash;

pub use infohash::{derive_info_hash, info_dict, info_hash_bytes, InfoHash, InfoHashError};
pub use metadata::{FileEntry, MetadataError, Torrent, TorrentInfo};
