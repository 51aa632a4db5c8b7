use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    dump::{self, ParseWarning},
    error::{Error, Result},
    mapfile::{tileset_asset_path, MapFile, TileIndexGrid},
    matcher::match_tiles,
    pixel_image::PixelImage,
    tile::{slice_tiles, TileSheet, TileSize},
    utils::change_extension,
    Area, Grid,
};

/// Extensions decoded as regular images instead of pixel dumps
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "bmp", "gif"];

/// An input image and the dump lines that were skipped building it
#[derive(Debug)]
pub struct LoadedImage {
    pub image: PixelImage,
    pub warnings: Vec<ParseWarning>,
}

/// Decodes `path` as an image when its extension says so, as a pixel dump
/// otherwise.
pub fn load_image(path: &Path, strict: bool) -> Result<LoadedImage> {
    let is_image = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        });
    if is_image {
        return Ok(LoadedImage {
            image: PixelImage::open(path)?,
            warnings: Vec::new(),
        });
    }
    let (image, warnings) = dump::load_dump(path, strict)?;
    return Ok(LoadedImage { image, warnings });
}

/// The map dump's path with a `.dat` extension
pub fn default_output_path(map_path: &Path) -> PathBuf {
    return change_extension(map_path, "dat");
}

/// Rebuilds the image a map layer describes out of tileset tiles
pub fn render_preview(layer: &TileIndexGrid, tileset: &TileSheet) -> Result<PixelImage> {
    let mut tiles = Vec::with_capacity(layer.iter().map(Vec::len).sum());
    for row in layer.iter() {
        for &index in row {
            let tile = tileset.get(index.into()).ok_or_else(|| {
                Error::InvalidMapFile(format!(
                    "tile index {index} is past the {} tileset tiles",
                    tileset.len()
                ))
            })?;
            tiles.push(tile.clone());
        }
    }
    let sheet = TileSheet {
        tile_size: tileset.tile_size,
        grid: Grid(layer.dims()),
        tiles,
    };
    return sheet.assemble();
}

/// Everything a run produced
#[derive(Debug)]
pub struct ScanOutput {
    pub map_file: MapFile,
    pub tileset: TileSheet,
    pub tileset_image: PixelImage,
    pub warnings: Vec<ParseWarning>,
}

/// Runs the whole compiler: load both images, slice them, match the map
/// against the tileset and build the map file.
#[derive(Debug, Clone, Default)]
pub struct MapScan {
    pub config: Config,
}

impl MapScan {
    pub fn new(config: Config) -> Self {
        return Self { config };
    }

    fn slice(&self, path: &Path, image: &PixelImage, tile_size: TileSize) -> Result<TileSheet> {
        let sheet = slice_tiles(image, tile_size);
        log::info!(
            "[{}] is {}*{} px -> {} tiles",
            path.display(),
            image.width(),
            image.height(),
            sheet.grid.area()
        );
        if sheet.is_empty() {
            return Err(Error::NoTiles {
                width: image.width(),
                height: image.height(),
                tile_size: tile_size.get(),
            });
        }
        return Ok(sheet);
    }

    pub fn run(&self, map_path: &Path, tileset_path: &Path) -> Result<ScanOutput> {
        let tile_size = self.config.tile_size()?;
        log::info!("tile size: {0}*{0} px", tile_size.get());

        let tileset = load_image(tileset_path, self.config.strict)?;
        let map = load_image(map_path, self.config.strict)?;

        let tileset_sheet = self.slice(tileset_path, &tileset.image, tile_size)?;
        let map_sheet = self.slice(map_path, &map.image, tile_size)?;

        let indices = match_tiles(&map_sheet, &tileset_sheet, self.config.unmatched)?;
        let map_file = MapFile::new(
            indices,
            &tileset_sheet,
            tileset_asset_path(tileset_path, &self.config.asset_dir),
        )?;

        let mut warnings = tileset.warnings;
        warnings.extend(map.warnings);
        return Ok(ScanOutput {
            map_file,
            tileset: tileset_sheet,
            tileset_image: tileset.image,
            warnings,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::UVecVec;
    use glam::UVec2;
    use image::Rgb;

    #[test]
    fn output_path_swaps_extension() {
        assert_eq!(
            default_output_path(Path::new("maps/town.css")),
            PathBuf::from("maps/town.dat")
        );
    }

    #[test]
    fn preview_rejects_unknown_indices() {
        let mut source = PixelImage::black(UVec2::splat(2)).unwrap();
        source.set_pixel(UVec2::ZERO, Rgb([1, 2, 3]));
        let tileset = slice_tiles(&source, TileSize::new(2).unwrap());

        let preview = render_preview(&UVecVec(vec![vec![0, 0]]), &tileset).unwrap();
        assert_eq!(preview.dims(), UVec2 { x: 4, y: 2 });
        assert_eq!(preview.pixel(UVec2 { x: 2, y: 0 }), Some(Rgb([1, 2, 3])));

        let err = render_preview(&UVecVec(vec![vec![1]]), &tileset).unwrap_err();
        assert!(matches!(err, Error::InvalidMapFile(_)));
    }

    #[test]
    fn image_inputs_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.png");
        let mut source = PixelImage::black(UVec2 { x: 2, y: 1 }).unwrap();
        source.set_pixel(UVec2 { x: 1, y: 0 }, Rgb([0, 0, 255]));
        source.save_png(&path).unwrap();

        let loaded = load_image(&path, true).unwrap();
        assert_eq!(loaded.image, source);
        assert!(loaded.warnings.is_empty());
    }
}
