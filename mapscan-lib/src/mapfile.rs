//! The `.dat` map format read by the game's map loader:
//!
//! ```text
//! <width> <height> <tileset tiles> <tile size> <layers>
//! <tileset image path>
//! <tile index> ... (width values per line, height lines, per layer)
//! ```
//!
//! Every number is an unsigned byte; width and height count tiles.

use std::{
    fmt::{self, Display},
    fs,
    io::{self, Write},
    path::Path,
    str::FromStr,
};

use crate::{
    error::{Error, Result},
    tile::TileSheet,
    utils::{change_extension, UVecVec},
};

/// Tile indices of one map layer, `[row][column]`
pub type TileIndexGrid = UVecVec<u8>;

/// The matcher emits a single layer
pub const LAYER_COUNT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub width: u8,
    pub height: u8,
    pub tileset_tiles: u8,
    pub tile_size: u8,
    pub layers: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFile {
    pub header: MapHeader,
    pub tileset_path: String,
    pub layers: Vec<TileIndexGrid>,
}

fn fit_u8(field: &'static str, value: usize) -> Result<u8> {
    return u8::try_from(value).map_err(|_| Error::ValueOutOfRange {
        field,
        value,
        max: u8::MAX.into(),
    });
}

/// Game-relative path of the tileset image: the tileset input's file name
/// with a `.png` extension, under `asset_dir`. Always `/` separated.
pub fn tileset_asset_path(tileset_input: &Path, asset_dir: &str) -> String {
    let png = change_extension(tileset_input, "png");
    let file_name = png
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let asset_dir = asset_dir.trim_end_matches('/');
    if asset_dir.is_empty() {
        return file_name;
    }
    return format!("{asset_dir}/{file_name}");
}

impl MapFile {
    /// Single layer map of `indices` over `tileset`.
    pub fn new(indices: TileIndexGrid, tileset: &TileSheet, tileset_path: String) -> Result<Self> {
        let dims = indices.dims();
        let header = MapHeader {
            width: fit_u8("map width (tiles)", dims.x as usize)?,
            height: fit_u8("map height (tiles)", dims.y as usize)?,
            tileset_tiles: fit_u8("tileset tile count", tileset.len())?,
            tile_size: fit_u8("tile size", tileset.tile_size.get() as usize)?,
            layers: LAYER_COUNT,
        };
        return Ok(Self {
            header,
            tileset_path,
            layers: vec![indices],
        });
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        return write!(writer, "{self}");
    }

    /// Writes the whole file at once, so a failure never leaves half a map.
    pub fn save(&self, path: &Path) -> Result<()> {
        return fs::write(path, self.to_string()).map_err(|e| Error::io(path, e));
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        return text.parse();
    }
}

impl Display for MapFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        writeln!(
            f,
            "{} {} {} {} {}",
            h.width, h.height, h.tileset_tiles, h.tile_size, h.layers
        )?;
        writeln!(f, "{}", self.tileset_path)?;
        for layer in &self.layers {
            for row in layer.iter() {
                let row: Vec<String> = row.iter().map(u8::to_string).collect();
                writeln!(f, "{}", row.join(" "))?;
            }
        }
        Ok(())
    }
}

impl FromStr for MapFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidMapFile(reason);
        let mut lines = s.lines();

        let header_line = lines.next().ok_or_else(|| invalid("empty file".to_owned()))?;
        let values = header_line
            .split_whitespace()
            .map(|v| v.parse::<u8>())
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|e| invalid(format!("bad header {header_line:?}: {e}")))?;
        let [width, height, tileset_tiles, tile_size, layers] = values[..] else {
            return Err(invalid(format!(
                "header needs 5 values, found {}",
                values.len()
            )));
        };
        let header = MapHeader {
            width,
            height,
            tileset_tiles,
            tile_size,
            layers,
        };

        let tileset_path = lines
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("missing tileset path".to_owned()))?
            .to_owned();

        // the loader scans whitespace separated values, so line breaks are free
        let indices = lines
            .flat_map(str::split_whitespace)
            .map(|v| v.parse::<u8>())
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|e| invalid(format!("bad tile index: {e}")))?;

        let per_layer = usize::from(width) * usize::from(height);
        let expected = per_layer * usize::from(layers);
        if indices.len() != expected {
            return Err(invalid(format!(
                "expected {layers} layers of {width}x{height} indices ({expected}), found {}",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= tileset_tiles) {
            return Err(invalid(format!(
                "tile index {bad} is past the {tileset_tiles} tileset tiles"
            )));
        }

        let layers = if per_layer == 0 {
            vec![UVecVec(vec![Vec::new(); height.into()]); layers.into()]
        } else {
            indices
                .chunks(per_layer)
                .map(|layer| {
                    UVecVec(
                        layer
                            .chunks(width.into())
                            .map(<[u8]>::to_vec)
                            .collect(),
                    )
                })
                .collect()
        };

        return Ok(Self {
            header,
            tileset_path,
            layers,
        });
    }
}
