use derive_more::{Deref, From};
use glam::UVec2;

use crate::{
    error::{Error, Result},
    pixel_image::{Pixel, PixelImage},
    Area, Grid,
};

/// A unique identifier for a tile: its position in a [`TileSheet`]
pub type TileId = usize;

/// A list of type T indexable by TileId
pub type IdMap<T> = Vec<T>;

/// The actual pixel data of a tile_size x tile_size square, row major
pub type Pattern = Vec<Pixel>;

/// Edge length in pixels of the square tiles. The map format stores it in a
/// byte, so it is limited to `1..=255`.
#[derive(Deref, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSize(u32);

impl TileSize {
    pub const MAX: u32 = u8::MAX as u32;

    pub fn new(px: u32) -> Result<Self> {
        if px == 0 || px > Self::MAX {
            return Err(Error::InvalidTileSize(px));
        }
        return Ok(Self(px));
    }

    pub fn get(self) -> u32 {
        return self.0;
    }
}

impl TryFrom<u32> for TileSize {
    type Error = Error;

    fn try_from(px: u32) -> Result<Self> {
        return Self::new(px);
    }
}

/// An owned copy of one tile_size x tile_size block of an image
#[derive(Deref, From, Clone, Debug, PartialEq, Eq)]
pub struct Tile(pub Pattern);

/// The tiles of an image in row major order (`id = ty * tiles_x + tx`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSheet {
    pub tile_size: TileSize,
    /// dimensions in tiles
    pub grid: Grid,
    pub tiles: IdMap<Tile>,
}

impl TileSheet {
    pub fn tiles_x(&self) -> u32 {
        return self.grid.x;
    }

    pub fn tiles_y(&self) -> u32 {
        return self.grid.y;
    }

    pub fn len(&self) -> usize {
        return self.tiles.len();
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        return self.tiles.get(id);
    }

    /// Grid location (in tiles) of the tile with the given id
    pub fn loc_of(&self, id: TileId) -> UVec2 {
        let id = id as u32;
        return UVec2 {
            x: id % self.tiles_x(),
            y: id / self.tiles_x(),
        };
    }

    /// Pastes the tiles back together. The result is the source image
    /// truncated to a whole number of tiles.
    pub fn assemble(&self) -> Result<PixelImage> {
        let ts = self.tile_size.get();
        let mut image = PixelImage::black(*self.grid * ts)?;
        let offsets = get_tile_locs(UVec2::splat(ts), 1);
        for (id, tile) in self.tiles.iter().enumerate() {
            let origin = self.loc_of(id) * ts;
            for (&offset, &pixel) in offsets.iter().zip(tile.iter()) {
                image.set_pixel(origin + offset, pixel);
            }
        }
        return Ok(image);
    }
}

/// Splits `image` into independent tile copies, dropping the pixels right of
/// and below the last whole tile.
pub fn slice_tiles(image: &PixelImage, tile_size: TileSize) -> TileSheet {
    let ts = tile_size.get();
    let grid = Grid(image.dims() / ts);
    let tiles: IdMap<Tile> = get_tile_locs(image.dims(), ts)
        .into_iter()
        .map(|loc| Tile(pattern_at(image, loc, ts)))
        .collect();
    debug_assert_eq!(tiles.len(), grid.area() as usize);
    log::debug!(
        "sliced {}x{} px into {}x{} tiles of {ts} px",
        image.width(),
        image.height(),
        grid.x,
        grid.y
    );
    return TileSheet {
        tile_size,
        grid,
        tiles,
    };
}

/// Top left corners of every whole tile in an image of `image_dims`, row major
pub fn get_tile_locs<U: Into<UVec2>>(image_dims: U, tile_size: u32) -> Vec<UVec2> {
    let image_dims: UVec2 = image_dims.into();
    // trim edges
    let max = image_dims - (image_dims % tile_size);

    let num_tiles = (max.x / tile_size) * (max.y / tile_size);
    let mut locs = Vec::with_capacity(num_tiles as usize);

    for y in (0..max.y).step_by(tile_size as usize) {
        for x in (0..max.x).step_by(tile_size as usize) {
            locs.push(UVec2 { x, y });
        }
    }

    return locs;
}

/// Copies the tile whose top left corner is `loc`. `loc` must come from
/// [`get_tile_locs`] for this image.
pub fn pattern_at(image: &PixelImage, loc: UVec2, tile_size: u32) -> Pattern {
    get_tile_locs(UVec2::splat(tile_size), 1)
        .into_iter()
        .map(|l| l + loc)
        .map(|l| *image.get_pixel(l.x, l.y))
        .collect()
}
