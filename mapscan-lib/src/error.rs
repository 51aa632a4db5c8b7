use std::{io, path::PathBuf};

use thiserror::Error;

use crate::dump::RecordError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not open [{}]: file not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error on [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[{}] line {line}: malformed record {content:?}: {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        content: String,
        reason: RecordError,
    },

    #[error("[{}] contains no pixel records", path.display())]
    EmptyImage { path: PathBuf },

    #[error("{width}x{height} px image holds no {tile_size}x{tile_size} px tile")]
    NoTiles {
        width: u32,
        height: u32,
        tile_size: u32,
    },

    #[error("invalid tile size {0}: must be between 1 and 255 px")]
    InvalidTileSize(u32),

    #[error("map tiles are {map} px but tileset tiles are {tileset} px")]
    TileSizeMismatch { map: u32, tileset: u32 },

    #[error("map tile {map_tile_index} (column {x}, row {y}) matches no tileset tile")]
    UnmatchedTile {
        map_tile_index: usize,
        x: u32,
        y: u32,
    },

    #[error("could not allocate {bytes} bytes for a {width}x{height} px image")]
    Allocation { bytes: usize, width: u32, height: u32 },

    #[error("{field} = {value} is out of range (max {max})")]
    ValueOutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("invalid map file: {0}")]
    InvalidMapFile(String),

    #[error("image error on [{}]: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid config [{}]: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Maps an I/O error on `path`, singling out missing files.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::FileNotFound { path }
        } else {
            Error::Io { path, source }
        }
    }
}
