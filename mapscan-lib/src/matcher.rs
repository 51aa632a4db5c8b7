use derive_more::IsVariant;
use glam::UVec2;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    mapfile::TileIndexGrid,
    tile::{Tile, TileId, TileSheet},
};

/// What to emit for a map tile that matches no tileset tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IsVariant, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// abort with [`Error::UnmatchedTile`]
    #[default]
    Fail,
    /// write this tileset index instead
    Substitute(u8),
}

/// Exact comparison of every channel of every pixel
pub fn compare_tile(map_tile: &Tile, tileset_tile: &Tile) -> bool {
    return map_tile.len() == tileset_tile.len()
        && map_tile
            .iter()
            .zip(tileset_tile.iter())
            .all(|(m, t)| m.0 == t.0);
}

/// Lowest index of a tileset tile identical to `tile`
pub fn find_tile(tile: &Tile, tileset: &TileSheet) -> Option<TileId> {
    for (id, candidate) in tileset.tiles.iter().enumerate() {
        if compare_tile(tile, candidate) {
            log::trace!("> with tileset[{id:03}] match");
            return Some(id);
        }
        log::trace!("> with tileset[{id:03}] no match");
    }
    return None;
}

/// Replaces every tile of `map` by the index of the first identical tile in
/// `tileset`. Brute force: O(map tiles * tileset tiles * tile pixels).
pub fn match_tiles(
    map: &TileSheet,
    tileset: &TileSheet,
    policy: UnmatchedPolicy,
) -> Result<TileIndexGrid> {
    if map.tile_size != tileset.tile_size {
        return Err(Error::TileSizeMismatch {
            map: map.tile_size.get(),
            tileset: tileset.tile_size.get(),
        });
    }
    if let UnmatchedPolicy::Substitute(sentinel) = policy {
        if usize::from(sentinel) >= tileset.len() {
            return Err(Error::ValueOutOfRange {
                field: "fallback tile",
                value: sentinel.into(),
                max: tileset.len().saturating_sub(1),
            });
        }
    }

    let mut indices = TileIndexGrid::filled(*map.grid, 0);
    let mut substituted = 0usize;

    for (map_id, tile) in map.tiles.iter().enumerate() {
        let loc: UVec2 = map.loc_of(map_id);
        log::trace!("testing map[{map_id:04}]");

        let index = match (find_tile(tile, tileset), policy) {
            (Some(id), _) => u8::try_from(id).map_err(|_| Error::ValueOutOfRange {
                field: "tile index",
                value: id,
                max: u8::MAX.into(),
            })?,
            (None, UnmatchedPolicy::Substitute(sentinel)) => {
                log::warn!(
                    "map tile {map_id} ({}, {}) matches no tileset tile, using {sentinel}",
                    loc.x,
                    loc.y
                );
                substituted += 1;
                sentinel
            }
            (None, UnmatchedPolicy::Fail) => {
                return Err(Error::UnmatchedTile {
                    map_tile_index: map_id,
                    x: loc.x,
                    y: loc.y,
                });
            }
        };
        log::debug!("match ! [{map_id:04}][{index:03}]");
        indices[loc] = index;
    }

    log::info!(
        "matched {} map tiles against {} tileset tiles ({substituted} substituted)",
        map.len(),
        tileset.len()
    );
    return Ok(indices);
}
