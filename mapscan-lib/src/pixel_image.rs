use std::path::Path;

use derive_more::{Deref, DerefMut, From};
use glam::UVec2;
use image::{Rgb, RgbImage};

use crate::{
    error::{Error, Result},
    tile::TileSize,
};

/// An RGB pixel. Alpha is never carried.
pub type Pixel = Rgb<u8>;

pub const BLACK: Pixel = Rgb([0, 0, 0]);

/// A dense RGB image addressed by `(x, y)` with the origin at the top left.
#[derive(Deref, DerefMut, From, Clone, Debug, PartialEq, Eq)]
pub struct PixelImage(pub RgbImage);

impl PixelImage {
    /// Allocates a `dims.x * dims.y` image with every pixel black.
    ///
    /// The buffer is reserved fallibly so huge dumps fail with
    /// [`Error::Allocation`] instead of aborting the process.
    pub fn black(dims: UVec2) -> Result<Self> {
        let alloc_err = |bytes| Error::Allocation {
            bytes,
            width: dims.x,
            height: dims.y,
        };
        let bytes = (dims.x as usize)
            .checked_mul(dims.y as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| alloc_err(usize::MAX))?;

        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(bytes).map_err(|_| alloc_err(bytes))?;
        buf.resize(bytes, 0);

        return RgbImage::from_raw(dims.x, dims.y, buf)
            .map(PixelImage)
            .ok_or_else(|| alloc_err(bytes));
    }

    /// Decodes any image format the `image` crate understands, dropping alpha.
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(io) => Error::io(path, io),
            source => Error::Image {
                path: path.to_path_buf(),
                source,
            },
        })?;
        return Ok(PixelImage(decoded.to_rgb8()));
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        return self
            .0
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|source| Error::Image {
                path: path.to_path_buf(),
                source,
            });
    }

    pub fn dims(&self) -> UVec2 {
        return self.0.dimensions().into();
    }

    pub fn contains(&self, loc: UVec2) -> bool {
        let dims = self.dims();
        return loc.x < dims.x && loc.y < dims.y;
    }

    pub fn pixel(&self, loc: UVec2) -> Option<Pixel> {
        if !self.contains(loc) {
            return None;
        }
        return Some(*self.0.get_pixel(loc.x, loc.y));
    }

    /// Writes `pixel` at `loc`. Returns `false` and leaves the image untouched
    /// when `loc` lies outside of it.
    pub fn set_pixel(&mut self, loc: UVec2, pixel: Pixel) -> bool {
        if !self.contains(loc) {
            return false;
        }
        self.0.put_pixel(loc.x, loc.y, pixel);
        return true;
    }

    /// Number of whole tiles the image holds; remainder pixels don't count.
    pub fn tiles_number(&self, tile_size: TileSize) -> u32 {
        let tiles = self.dims() / tile_size.get();
        return tiles.x * tiles.y;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn black_image_is_zero_filled() {
        let img = PixelImage::black(UVec2 { x: 3, y: 2 }).unwrap();
        assert_eq!(img.dims(), UVec2 { x: 3, y: 2 });
        assert!(img.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn out_of_bounds_access_is_rejected() {
        let mut img = PixelImage::black(UVec2::splat(2)).unwrap();
        let red = Rgb([255, 0, 0]);
        assert!(img.set_pixel(UVec2 { x: 1, y: 1 }, red));
        assert!(!img.set_pixel(UVec2 { x: 2, y: 0 }, red));
        assert_eq!(img.pixel(UVec2 { x: 1, y: 1 }), Some(red));
        assert_eq!(img.pixel(UVec2 { x: 0, y: 2 }), None);
    }

    #[test]
    fn absurd_dimensions_fail_to_allocate() {
        let err = PixelImage::black(UVec2::splat(u32::MAX)).unwrap_err();
        assert!(matches!(err, Error::Allocation { .. }));
    }

    #[test]
    fn tiles_number_truncates() {
        let img = PixelImage::black(UVec2 { x: 17, y: 9 }).unwrap();
        assert_eq!(img.tiles_number(TileSize::new(8).unwrap()), 2);
        assert_eq!(img.tiles_number(TileSize::new(4).unwrap()), 8);
    }
}
