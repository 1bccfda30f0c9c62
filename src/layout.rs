use crate::core::{Canvas, Point, Rect};

pub const CELL_SIZE: u32 = 40;
pub const PADDING: u32 = 60;
/// Extra space below the grid for the roster footer.
pub const INFO_BAND: u32 = 100;
/// Cell rectangles leave a gutter of this many pixels on the right and bottom.
pub const CELL_GUTTER: u32 = 2;

/// Pixel geometry of one frame for a given grid size.
///
/// Logical grid coordinates have `y` pointing up; pixel space has `y` pointing down, so every
/// logical row is flipped through `grid_size - 1 - y` before scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub grid_size: u32,
    pub cell: u32,
    pub padding: u32,
    pub info_band: u32,
}

impl GridLayout {
    pub fn new(grid_size: u32) -> Self {
        Self {
            grid_size,
            cell: CELL_SIZE,
            padding: PADDING,
            info_band: INFO_BAND,
        }
    }

    pub fn canvas(&self) -> Canvas {
        let board = self.grid_size * self.cell;
        Canvas {
            width: board + self.padding * 2,
            height: board + self.padding * 2 + self.info_band,
        }
    }

    /// Pixel-space row index for logical `y`.
    pub fn row_of(&self, y: i64) -> i64 {
        (i64::from(self.grid_size) - 1).saturating_sub(y)
    }

    /// Clamp a logical coordinate to one board width beyond either edge. Anything further out
    /// is off the canvas anyway; direction is preserved for lines leaving the board.
    pub fn clamp_coord(&self, v: i64) -> i64 {
        let n = i64::from(self.grid_size);
        v.clamp(-n, 2 * n)
    }

    /// Top-left pixel corner of the cell at logical `(x, y)`.
    pub fn cell_origin(&self, x: i64, y: i64) -> Point {
        let cell = f64::from(self.cell);
        let pad = f64::from(self.padding);
        let (x, y) = (self.clamp_coord(x), self.clamp_coord(y));
        Point::new(
            pad + x as f64 * cell,
            pad + self.row_of(y) as f64 * cell,
        )
    }

    /// Filled area of a cell, gutter excluded.
    pub fn cell_rect(&self, x: i64, y: i64) -> Rect {
        let o = self.cell_origin(x, y);
        let side = f64::from(self.cell - CELL_GUTTER);
        Rect::new(o.x, o.y, o.x + side, o.y + side)
    }

    pub fn cell_center(&self, x: i64, y: i64) -> Point {
        let o = self.cell_origin(x, y);
        let half = f64::from(self.cell / 2);
        Point::new(o.x + half, o.y + half)
    }

    /// Radius of a player token on the board.
    pub fn token_radius(&self) -> f64 {
        f64::from(self.cell / 2) - 4.0
    }

    /// Top edge of the footer band.
    pub fn footer_top(&self) -> f64 {
        f64::from(self.canvas().height - self.info_band)
    }

    pub fn center(&self) -> Point {
        let c = self.canvas();
        Point::new(f64::from(c.width) / 2.0, f64::from(c.height) / 2.0)
    }
}
