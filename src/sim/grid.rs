//! Spatial hash grid for broadphase neighbor lookup
//!
//! Rebuilt from scratch every tick. Buckets hold handles only; the bodies
//! themselves stay in the `BodyStore`.

use std::collections::HashMap;

use glam::Vec3;

use super::body::BodyHandle;

/// Discretized grid cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing `position` for the given cell edge length
    #[inline]
    pub fn containing(position: Vec3, cell_size: f32) -> Self {
        // `as` saturates, so far-off positions land in the edge cells
        Self {
            x: (position.x / cell_size).floor() as i32,
            y: (position.y / cell_size).floor() as i32,
        }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// This cell and its 8 surrounding cells, row by row
    pub fn neighborhood(self) -> impl Iterator<Item = CellCoord> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| self.offset(dx, dy)))
    }
}

/// Lookup key packing a cell coordinate into one integer
///
/// Each coordinate is mapped to offset binary (sign bit flipped) and the two
/// halves are concatenated, x high. Every `(x, y)` pair gets its own key, and
/// keys sort the same way the coordinates do lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey(u64);

impl CellKey {
    const SIGN_FLIP: u32 = 0x8000_0000;

    #[inline]
    pub fn from_cell(cell: CellCoord) -> Self {
        let hi = (cell.x as u32 ^ Self::SIGN_FLIP) as u64;
        let lo = (cell.y as u32 ^ Self::SIGN_FLIP) as u64;
        Self((hi << 32) | lo)
    }

    /// Recover the coordinate a key was built from
    #[inline]
    pub fn cell(self) -> CellCoord {
        let hi = (self.0 >> 32) as u32 ^ Self::SIGN_FLIP;
        let lo = self.0 as u32 ^ Self::SIGN_FLIP;
        CellCoord::new(hi as i32, lo as i32)
    }
}

impl From<CellCoord> for CellKey {
    fn from(cell: CellCoord) -> Self {
        Self::from_cell(cell)
    }
}

/// Buckets of body handles keyed by cell
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    buckets: HashMap<CellKey, Vec<BodyHandle>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Drop every bucket and adopt the cell size for the coming rebuild
    pub fn clear(&mut self, cell_size: f32) {
        self.cell_size = cell_size;
        self.buckets.clear();
    }

    #[inline]
    pub fn cell_of(&self, position: Vec3) -> CellCoord {
        CellCoord::containing(position, self.cell_size)
    }

    pub fn insert(&mut self, handle: BodyHandle, cell: CellCoord) {
        self.buckets.entry(cell.into()).or_default().push(handle);
    }

    /// Handles in a single cell
    pub fn bucket(&self, cell: CellCoord) -> &[BodyHandle] {
        self.buckets
            .get(&CellKey::from(cell))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Handles in `cell` and its 8 surrounding cells
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = BodyHandle> + '_ {
        cell.neighborhood()
            .flat_map(move |c| self.bucket(c).iter().copied())
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
