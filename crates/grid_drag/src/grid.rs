use bevy::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("grid must have at least one row, got {0}")]
    InvalidRows(i32),
    #[error("grid must have at least one column, got {0}")]
    InvalidColumns(i32),
    #[error("a {rows}x{cols} grid has no cell inside its bounds")]
    NoValidCells { rows: i32, cols: i32 },
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
}

/// Maps between world space and integer grid cells.
///
/// The grid is centred on the world origin. With `cols` columns the valid
/// x range is `-(cols / 2)..=cols / 2 - 1` using truncating integer division,
/// so odd sizes are asymmetric (5 columns give `-2..=1`).
///
/// World positions are rounded to cells half-to-even: `0.5` maps to cell 0,
/// `1.5` and `2.5` both map to cell 2.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    rows: i32,
    cols: i32,
    cell_size: f32,
}

impl GridLayout {
    pub fn new(rows: i32, cols: i32, cell_size: f32) -> Result<Self, GridError> {
        if rows <= 0 {
            return Err(GridError::InvalidRows(rows));
        }
        if cols <= 0 {
            return Err(GridError::InvalidColumns(cols));
        }
        // A single row or column halves to min 0, max -1.
        if rows < 2 || cols < 2 {
            return Err(GridError::NoValidCells { rows, cols });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            rows,
            cols,
            cell_size,
        })
    }

    pub const fn rows(&self) -> i32 {
        self.rows
    }
    pub const fn cols(&self) -> i32 {
        self.cols
    }
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub const fn min_x(&self) -> i32 {
        -self.cols / 2
    }
    pub const fn max_x(&self) -> i32 {
        self.cols / 2 - 1
    }
    pub const fn min_y(&self) -> i32 {
        -self.rows / 2
    }
    pub const fn max_y(&self) -> i32 {
        self.rows / 2 - 1
    }
    pub const fn min_cell(&self) -> IVec2 {
        IVec2::new(self.min_x(), self.min_y())
    }
    pub const fn max_cell(&self) -> IVec2 {
        IVec2::new(self.max_x(), self.max_y())
    }

    pub fn world_to_grid(&self, pos: Vec2) -> IVec2 {
        IVec2::new(
            (pos.x / self.cell_size).round_ties_even() as i32,
            (pos.y / self.cell_size).round_ties_even() as i32,
        )
    }

    pub fn grid_to_world(&self, cell: IVec2) -> Vec2 {
        cell.as_vec2() * self.cell_size
    }

    pub fn clamp(&self, cell: IVec2) -> IVec2 {
        IVec2::new(
            cell.x.clamp(self.min_x(), self.max_x()),
            cell.y.clamp(self.min_y(), self.max_y()),
        )
    }

    pub const fn contains(&self, cell: IVec2) -> bool {
        cell.x >= self.min_x()
            && cell.x <= self.max_x()
            && cell.y >= self.min_y()
            && cell.y <= self.max_y()
    }

    /// Centre of the nearest in-bounds cell.
    pub fn snap_world(&self, pos: Vec2) -> Vec2 {
        self.grid_to_world(self.clamp(self.world_to_grid(pos)))
    }

    /// Leaves `pos` untouched while its nearest cell is on the grid,
    /// otherwise returns the centre of the closest border cell.
    pub fn clamp_world(&self, pos: Vec2) -> Vec2 {
        let cell = self.world_to_grid(pos);
        if self.contains(cell) {
            pos
        } else {
            self.grid_to_world(self.clamp(cell))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_10x10() -> GridLayout {
        GridLayout::new(10, 10, 1.0).unwrap()
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(GridLayout::new(0, 10, 1.0), Err(GridError::InvalidRows(0)));
        assert_eq!(
            GridLayout::new(10, -3, 1.0),
            Err(GridError::InvalidColumns(-3))
        );
        assert_eq!(
            GridLayout::new(10, 10, 0.0),
            Err(GridError::InvalidCellSize(0.0))
        );
        assert!(GridLayout::new(10, 10, f32::NAN).is_err());
        assert!(GridLayout::new(10, 10, -2.0).is_err());
    }

    #[test]
    fn bounds_follow_truncating_division() {
        let grid = grid_10x10();
        assert_eq!(grid.min_cell(), IVec2::new(-5, -5));
        assert_eq!(grid.max_cell(), IVec2::new(4, 4));

        let odd = GridLayout::new(3, 5, 1.0).unwrap();
        assert_eq!(odd.min_cell(), IVec2::new(-2, -1));
        assert_eq!(odd.max_cell(), IVec2::new(1, 0));
    }

    #[test]
    fn rejects_grids_without_valid_cells() {
        assert_eq!(
            GridLayout::new(1, 1, 1.0),
            Err(GridError::NoValidCells { rows: 1, cols: 1 })
        );
        assert_eq!(
            GridLayout::new(10, 1, 1.0),
            Err(GridError::NoValidCells { rows: 10, cols: 1 })
        );
        assert_eq!(
            GridLayout::new(1, 10, 1.0),
            Err(GridError::NoValidCells { rows: 1, cols: 10 })
        );

        let smallest = GridLayout::new(2, 2, 1.0).unwrap();
        assert_eq!(smallest.min_cell(), IVec2::new(-1, -1));
        assert_eq!(smallest.max_cell(), IVec2::ZERO);
        assert_eq!(smallest.clamp(IVec2::new(5, -5)), IVec2::new(0, -1));
    }

    #[test]
    fn rounds_half_to_even() {
        let grid = grid_10x10();
        assert_eq!(grid.world_to_grid(Vec2::new(0.5, 1.5)), IVec2::new(0, 2));
        assert_eq!(grid.world_to_grid(Vec2::new(2.5, -0.5)), IVec2::new(2, 0));
        assert_eq!(grid.world_to_grid(Vec2::new(-1.5, -2.5)), IVec2::new(-2, -2));
        assert_eq!(grid.world_to_grid(Vec2::new(2.51, -2.49)), IVec2::new(3, -2));
    }

    #[test]
    fn scales_by_cell_size() {
        let grid = GridLayout::new(8, 8, 32.0).unwrap();
        assert_eq!(grid.world_to_grid(Vec2::new(70.0, -40.0)), IVec2::new(2, -1));
        assert_eq!(grid.grid_to_world(IVec2::new(2, -1)), Vec2::new(64.0, -32.0));
    }

    #[test]
    fn cell_centres_round_trip() {
        let grid = GridLayout::new(10, 12, 0.75).unwrap();
        for x in grid.min_x()..=grid.max_x() {
            for y in grid.min_y()..=grid.max_y() {
                let cell = IVec2::new(x, y);
                assert_eq!(grid.world_to_grid(grid.grid_to_world(cell)), cell);
            }
        }
    }

    #[test]
    fn clamp_is_idempotent_and_lands_inside() {
        let grid = grid_10x10();
        for cell in [
            IVec2::new(100, -100),
            IVec2::new(-6, 4),
            IVec2::new(5, 5),
            IVec2::new(0, 0),
        ] {
            let clamped = grid.clamp(cell);
            assert!(grid.contains(clamped));
            assert_eq!(grid.clamp(clamped), clamped);
        }
        assert_eq!(grid.clamp(IVec2::new(7, -9)), IVec2::new(4, -5));
    }

    #[test]
    fn clamp_world_only_moves_outside_targets() {
        let grid = grid_10x10();
        assert_eq!(grid.clamp_world(Vec2::new(3.4, 0.2)), Vec2::new(3.4, 0.2));
        assert_eq!(grid.clamp_world(Vec2::new(4.6, 0.0)), Vec2::new(4.0, 0.0));
        assert_eq!(grid.clamp_world(Vec2::new(-9.0, 9.0)), Vec2::new(-5.0, 4.0));
    }

    #[test]
    fn snap_world_picks_nearest_valid_centre() {
        let grid = grid_10x10();
        assert_eq!(grid.snap_world(Vec2::new(2.03, 0.0)), Vec2::new(2.0, 0.0));
        assert_eq!(grid.snap_world(Vec2::new(4.7, -5.6)), Vec2::new(4.0, -5.0));
    }
}
