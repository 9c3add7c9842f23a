//! The device grid: which tile type occupies every cell of every die.

use crate::ids::TileTypeId;
use serde::{Deserialize, Serialize};

/// One grid cell.
///
/// Multi-cell tiles occupy several cells; the root cell has both offsets 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct GridTile {
    /// The tile type covering the cell.
    pub tile_type: TileTypeId,
    /// Column offset of this cell from the tile root.
    pub width_offset: usize,
    /// Row offset of this cell from the tile root.
    pub height_offset: usize,
}

impl GridTile {
    const EMPTY: GridTile = GridTile {
        tile_type: TileTypeId::EMPTY,
        width_offset: 0,
        height_offset: 0,
    };

    /// Returns `true` for the root cell of a tile.
    pub fn is_root(&self) -> bool {
        self.width_offset == 0 && self.height_offset == 0
    }
}

/// A layered grid of tiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceGrid {
    layers: usize,
    width: usize,
    height: usize,
    cells: Vec<GridTile>,
    inter_cluster_routing: Vec<bool>,
}

impl DeviceGrid {
    /// Creates a grid filled with empty tiles, with routing on every layer.
    pub fn new(layers: usize, width: usize, height: usize) -> Self {
        Self {
            layers,
            width,
            height,
            cells: vec![GridTile::EMPTY; layers * width * height],
            inter_cluster_routing: vec![true; layers],
        }
    }

    /// Number of die layers.
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    fn cell_index(&self, layer: usize, x: usize, y: usize) -> usize {
        (layer * self.width + x) * self.height + y
    }

    /// Returns the cell at a location. Panics if out of bounds.
    pub fn tile(&self, layer: usize, x: usize, y: usize) -> &GridTile {
        &self.cells[self.cell_index(layer, x, y)]
    }

    /// Returns the tile type covering a location.
    pub fn tile_type(&self, layer: usize, x: usize, y: usize) -> TileTypeId {
        self.tile(layer, x, y).tile_type
    }

    /// Returns `true` if general routing exists on `layer`.
    pub fn has_inter_cluster_routing(&self, layer: usize) -> bool {
        self.inter_cluster_routing.get(layer).copied().unwrap_or(false)
    }

    /// Enables or disables general routing on a layer.
    pub fn set_inter_cluster_routing(&mut self, layer: usize, enabled: bool) {
        if let Some(flag) = self.inter_cluster_routing.get_mut(layer) {
            *flag = enabled;
        }
    }

    /// Places a `tile_width x tile_height` tile with its root at `(x, y)`.
    ///
    /// Any tile the new one overlaps is removed first. Returns `false`, leaving
    /// the grid untouched, if the tile does not fit inside the grid.
    pub fn place(
        &mut self,
        layer: usize,
        x: usize,
        y: usize,
        tile_type: TileTypeId,
        tile_width: usize,
        tile_height: usize,
    ) -> bool {
        if layer >= self.layers || x + tile_width > self.width || y + tile_height > self.height {
            return false;
        }
        for dx in 0..tile_width {
            for dy in 0..tile_height {
                self.clear(layer, x + dx, y + dy);
            }
        }
        for dx in 0..tile_width {
            for dy in 0..tile_height {
                let idx = self.cell_index(layer, x + dx, y + dy);
                self.cells[idx] = GridTile {
                    tile_type,
                    width_offset: dx,
                    height_offset: dy,
                };
            }
        }
        true
    }

    /// Resets every cell of the tile covering `(x, y)` to empty.
    fn clear(&mut self, layer: usize, x: usize, y: usize) {
        let cell = *self.tile(layer, x, y);
        if cell.tile_type == TileTypeId::EMPTY {
            return;
        }
        let root_x = x - cell.width_offset;
        let root_y = y - cell.height_offset;
        let mut dx = 0;
        while root_x + dx < self.width {
            let covered = *self.tile(layer, root_x + dx, root_y);
            if covered.tile_type != cell.tile_type || covered.width_offset != dx {
                break;
            }
            let mut dy = 0;
            while root_y + dy < self.height {
                let idx = self.cell_index(layer, root_x + dx, root_y + dy);
                let covered = self.cells[idx];
                if covered.tile_type != cell.tile_type
                    || covered.width_offset != dx
                    || covered.height_offset != dy
                {
                    break;
                }
                self.cells[idx] = GridTile::EMPTY;
                dy += 1;
            }
            dx += 1;
        }
    }

    /// Iterates `(layer, x, y)` over every root cell of a non-empty tile.
    pub fn roots(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.layers).flat_map(move |layer| {
            (0..self.width).flat_map(move |x| {
                (0..self.height).filter_map(move |y| {
                    let cell = self.tile(layer, x, y);
                    (cell.is_root() && cell.tile_type != TileTypeId::EMPTY).then_some((layer, x, y))
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = DeviceGrid::new(2, 4, 5);
        assert_eq!(grid.layers(), 2);
        assert_eq!(grid.tile_type(1, 3, 4), TileTypeId::EMPTY);
        assert!(grid.has_inter_cluster_routing(1));
        assert!(!grid.has_inter_cluster_routing(2));
        assert_eq!(grid.roots().count(), 0);
    }

    #[test]
    fn place_multi_cell_tile() {
        let mut grid = DeviceGrid::new(1, 6, 6);
        let mem = TileTypeId::from_raw(2);
        assert!(grid.place(0, 2, 1, mem, 1, 3));
        assert_eq!(grid.tile(0, 2, 3).height_offset, 2);
        assert!(grid.tile(0, 2, 1).is_root());
        assert_eq!(grid.roots().collect::<Vec<_>>(), vec![(0, 2, 1)]);
    }

    #[test]
    fn place_out_of_bounds_fails() {
        let mut grid = DeviceGrid::new(1, 4, 4);
        assert!(!grid.place(0, 3, 3, TileTypeId::from_raw(1), 1, 2));
        assert_eq!(grid.tile_type(0, 3, 3), TileTypeId::EMPTY);
    }

    #[test]
    fn overlapping_place_removes_old_tile() {
        let mut grid = DeviceGrid::new(1, 6, 6);
        let mem = TileTypeId::from_raw(2);
        let clb = TileTypeId::from_raw(1);
        grid.place(0, 2, 1, mem, 1, 3);
        grid.place(0, 2, 2, clb, 1, 1);
        assert_eq!(grid.tile_type(0, 2, 1), TileTypeId::EMPTY);
        assert_eq!(grid.tile_type(0, 2, 2), clb);
        assert_eq!(grid.tile_type(0, 2, 3), TileTypeId::EMPTY);
    }

    #[test]
    fn disable_routing_on_layer() {
        let mut grid = DeviceGrid::new(2, 3, 3);
        grid.set_inter_cluster_routing(1, false);
        assert!(grid.has_inter_cluster_routing(0));
        assert!(!grid.has_inter_cluster_routing(1));
    }
}
