use std::{
    ops::{Index, IndexMut},
    path::{Path, PathBuf},
};

use glam::UVec2;

/// Rows of cells indexable by `UVec2 { x: column, y: row }`
#[derive(derive_more::Deref, derive_more::DerefMut, Clone, Debug, PartialEq, Eq)]
pub struct UVecVec<T>(pub Vec<Vec<T>>);

impl<T: Clone> UVecVec<T> {
    pub fn filled(dims: UVec2, value: T) -> Self {
        return UVecVec(vec![vec![value; dims.x as usize]; dims.y as usize]);
    }
}

impl<T> UVecVec<T> {
    /// `x` is the length of the first row; rows are expected to be even
    pub fn dims(&self) -> UVec2 {
        let width = self.0.first().map_or(0, |row| row.len());
        return UVec2 {
            x: width as u32,
            y: self.0.len() as u32,
        };
    }
}

impl<T> Index<UVec2> for UVecVec<T> {
    type Output = T;
    fn index(&self, index: UVec2) -> &Self::Output {
        return &self.0[index.y as usize][index.x as usize]
    }
}

impl<T> IndexMut<UVec2> for UVecVec<T> {
    fn index_mut(&mut self, index: UVec2) -> &mut Self::Output {
        return &mut self.0[index.y as usize][index.x as usize]
    }
}

/// Returns `path` with its extension replaced by `ext` (leading dot optional).
/// A path without an extension gets one appended.
pub fn change_extension<P: AsRef<Path>>(path: P, ext: &str) -> PathBuf {
    let mut changed = path.as_ref().to_path_buf();
    changed.set_extension(ext.trim_start_matches('.'));
    return changed;
}
