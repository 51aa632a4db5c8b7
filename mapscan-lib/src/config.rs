use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    matcher::UnmatchedPolicy,
    tile::TileSize,
    TILE_SIZE_DEFAULT,
};

pub const ASSET_DIR_DEFAULT: &str = "assets/sprites/tilesets";

/// Settings of one run. Every field is optional in a config file:
///
/// ```json
/// { "tile_size": 16, "asset_dir": "assets/tilesets", "unmatched": { "substitute": 0 }, "strict": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// edge length in pixels of the square tiles of both images
    pub tile_size: u32,
    /// directory the game loads tileset images from
    pub asset_dir: String,
    pub unmatched: UnmatchedPolicy,
    /// fail on malformed dump lines instead of skipping them
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            tile_size: TILE_SIZE_DEFAULT,
            asset_dir: ASSET_DIR_DEFAULT.to_owned(),
            unmatched: UnmatchedPolicy::Fail,
            strict: false,
        };
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        return serde_json::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        });
    }

    pub fn tile_size(&self) -> Result<TileSize> {
        return TileSize::new(self.tile_size);
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        return self;
    }

    pub fn with_asset_dir(mut self, asset_dir: impl Into<String>) -> Self {
        self.asset_dir = asset_dir.into();
        return self;
    }

    pub fn with_unmatched(mut self, unmatched: UnmatchedPolicy) -> Self {
        self.unmatched = unmatched;
        return self;
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        return self;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tile_size().unwrap().get(), TILE_SIZE_DEFAULT);
    }

    #[test]
    fn reads_every_field() {
        let config: Config = serde_json::from_str(
            r#"{ "tile_size": 16, "asset_dir": "a/b", "unmatched": { "substitute": 3 }, "strict": true }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            Config::default()
                .with_tile_size(16)
                .with_asset_dir("a/b")
                .with_unmatched(UnmatchedPolicy::Substitute(3))
                .strict()
        );
        let config: Config = serde_json::from_str(r#"{ "unmatched": "fail" }"#).unwrap();
        assert!(config.unmatched.is_fail());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(serde_json::from_str::<Config>(r#"{ "tilesize": 16 }"#).is_err());
    }

    #[test]
    fn invalid_tile_size_surfaces_late() {
        let config = Config::default().with_tile_size(0);
        assert!(matches!(config.tile_size(), Err(Error::InvalidTileSize(0))));
    }

    #[test]
    fn missing_config_file() {
        let err = Config::from_json_file(Path::new("nope/mapscan.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
