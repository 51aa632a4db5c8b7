//! Compiles pixel-dump exports of a map and its tileset into the game's
//! tile-index map format.

pub mod config;
pub mod dump;
pub mod error;
pub mod mapfile;
pub mod matcher;
pub mod pipeline;
pub mod pixel_image;
pub mod tile;
pub mod utils;

use derive_more::{Deref, DerefMut, From};
use glam::UVec2;

pub use config::Config;
pub use error::{Error, Result};
pub use mapfile::{MapFile, MapHeader, TileIndexGrid};
pub use matcher::UnmatchedPolicy;
pub use pipeline::MapScan;
pub use pixel_image::{Pixel, PixelImage};
pub use tile::{Tile, TileSheet, TileSize};

/// Tile size used when neither the command line nor a config file sets one
pub const TILE_SIZE_DEFAULT: u32 = 8;

pub trait Area {
    type Output;
    fn area(&self) -> Self::Output;
}

impl Area for Grid {
    type Output = u32;

    fn area(&self) -> Self::Output {
        return self.x * self.y;
    }
}

/// Dimensions of a 2D grid of cells (pixels or tiles)
#[derive(Deref, DerefMut, From, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grid(pub UVec2);

impl Grid {
    /// Every cell location, row major
    pub fn iter_locs(&self) -> impl Iterator<Item = UVec2> {
        return UVec2Iter::new(UVec2::ZERO, self.0);
    }
}

#[derive(Clone, Debug)]
pub struct UVec2Iter {
    pub cur: UVec2,
    pub end: UVec2,
}

impl UVec2Iter {
    pub fn new(start: UVec2, end: UVec2) -> Self {
        return Self { cur: start, end };
    }
}

impl Iterator for UVec2Iter {
    type Item = UVec2;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur.x >= self.end.x || self.cur.y >= self.end.y {
            return None;
        }
        let ret = self.cur;
        self.cur.x += 1;
        if self.cur.x == self.end.x {
            self.cur.x = 0;
            self.cur.y += 1;
        }
        return Some(ret);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn iter_locs_is_row_major() {
        let locs: Vec<UVec2> = Grid(UVec2 { x: 3, y: 2 }).iter_locs().collect();
        assert_eq!(locs.len(), 6);
        assert_eq!(locs[0], UVec2 { x: 0, y: 0 });
        assert_eq!(locs[2], UVec2 { x: 2, y: 0 });
        assert_eq!(locs[3], UVec2 { x: 0, y: 1 });
        assert_eq!(locs[5], UVec2 { x: 2, y: 1 });
    }

    #[test]
    fn empty_grid_has_no_locs() {
        assert_eq!(Grid(UVec2 { x: 0, y: 4 }).iter_locs().count(), 0);
        assert_eq!(Grid(UVec2 { x: 4, y: 0 }).iter_locs().count(), 0);
        assert_eq!(Grid::default().area(), 0);
    }
}
