//! Logical cell sampling through the perspective transform.
//!
//! Sample points sit at cell centers `(cx + 0.5, cy + 0.5)` in barcode
//! coordinates. A whole row of points is transformed as one batch, then
//! each projected point is floored to a pixel address and the binary
//! matrix is consulted. Nearest-integer sampling is the contract; there
//! is no sub-pixel interpolation.

use super::PerspectiveTransform;
use crate::binarize::BinaryMatrix;

/// A sampled grid of single-bit cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    width: u32,
    height: u32,
    cells: Vec<u8>,
}

impl BitGrid {
    /// Creates an all-zero grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![0; (width * height) as usize],
        }
    }

    /// Returns the cell value, 0 or 1.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.cells[(y * self.width + x) as usize]
    }

    /// Sets a cell to 0 or 1.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.cells[(y * self.width + x) as usize] = value;
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// A rectangular cell region within a sampled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    /// Left cell column.
    pub x: u32,
    /// Top cell row.
    pub y: u32,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

/// Converts sampled cells in a zone into payload bytes.
///
/// Exactly one implementation exists in the core; color-modulation
/// variants plug in here from an extension layer.
pub trait SampleStrategy {
    /// Number of payload bits carried by one cell.
    fn bits_per_unit(&self) -> u32;

    /// Packs the zone's cells into bytes, row-major, MSB first.
    ///
    /// `reverse` flips the polarity of every bit, producing the second
    /// independent reading of a frame.
    fn sample_zone(&self, grid: &BitGrid, zone: &Zone, reverse: bool) -> Vec<u8>;
}

/// The basic black/white strategy: one bit per cell, bright means 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackWhiteStrategy;

impl SampleStrategy for BlackWhiteStrategy {
    fn bits_per_unit(&self) -> u32 {
        1
    }

    fn sample_zone(&self, grid: &BitGrid, zone: &Zone, reverse: bool) -> Vec<u8> {
        let total_bits = (zone.width * zone.height) as usize;
        let mut bytes = vec![0u8; total_bits.div_ceil(8)];
        for row in 0..zone.height {
            for column in 0..zone.width {
                let mut bit = grid.get(zone.x + column, zone.y + row);
                if reverse {
                    bit ^= 1;
                }
                let index = (row * zone.width + column) as usize;
                bytes[index / 8] |= bit << (7 - index % 8);
            }
        }
        bytes
    }
}

/// Samples logical barcode cells from a binarized frame.
pub struct GridSampler<'a> {
    matrix: &'a BinaryMatrix,
    transform: PerspectiveTransform,
}

impl<'a> GridSampler<'a> {
    /// Builds the sampler for a barcode of `logical_width` x
    /// `logical_height` cells, using the matrix's detected corners.
    pub fn new(matrix: &'a BinaryMatrix, logical_width: u32, logical_height: u32) -> Self {
        let w = f64::from(logical_width);
        let h = f64::from(logical_height);
        let corners = matrix.corners();
        let destination = [
            f64::from(corners[0]),
            f64::from(corners[1]),
            f64::from(corners[2]),
            f64::from(corners[3]),
            f64::from(corners[4]),
            f64::from(corners[5]),
            f64::from(corners[6]),
            f64::from(corners[7]),
        ];
        let source = [0.0, 0.0, w, 0.0, w, h, 0.0, h];
        Self {
            matrix,
            transform: PerspectiveTransform::quad_to_quad(&source, &destination),
        }
    }

    /// Samples one row of `dim_x` cells as a '0'/'1' string.
    pub fn sample_row(&self, dim_x: u32, row: u32) -> String {
        let mut points = row_points(dim_x, row);
        self.transform.transform_points(&mut points);

        let mut bits = String::with_capacity(dim_x as usize);
        for pair in points.chunks_exact(2) {
            let x = pair[0].floor() as i32;
            let y = pair[1].floor() as i32;
            bits.push(if self.matrix.pixel_equals(x, y, 1) {
                '1'
            } else {
                '0'
            });
        }
        bits
    }

    /// Samples the full `dim_x` x `dim_y` cell grid.
    pub fn sample_grid(&self, dim_x: u32, dim_y: u32) -> BitGrid {
        let mut grid = BitGrid::new(dim_x, dim_y);
        for row in 0..dim_y {
            let mut points = row_points(dim_x, row);
            self.transform.transform_points(&mut points);
            for (column, pair) in points.chunks_exact(2).enumerate() {
                let x = pair[0].floor() as i32;
                let y = pair[1].floor() as i32;
                if self.matrix.pixel_equals(x, y, 1) {
                    grid.set(column as u32, row, 1);
                }
            }
        }
        grid
    }
}

/// Interleaved cell-center points for one row.
fn row_points(dim_x: u32, row: u32) -> Vec<f64> {
    let row_value = f64::from(row) + 0.5;
    let mut points = Vec::with_capacity(2 * dim_x as usize);
    for column in 0..dim_x {
        points.push(f64::from(column) + 0.5);
        points.push(row_value);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;

    const WHITE: u8 = 210;
    const BLACK: u8 = 30;

    /// Renders a cell grid at `scale` pixels per cell with a white margin.
    /// Cell value 1 paints white, 0 paints black. The outer two rings are
    /// forced black so the border finder has a frame to lock onto.
    fn render(cells: &BitGrid, scale: u32, margin: u32) -> Frame {
        let side = cells.width() * scale + 2 * margin;
        let mut pixels = vec![WHITE; (side * side) as usize];
        for cy in 0..cells.height() {
            for cx in 0..cells.width() {
                let edge = cx
                    .min(cy)
                    .min(cells.width() - 1 - cx)
                    .min(cells.height() - 1 - cy);
                let value = if edge < 2 { 0 } else { cells.get(cx, cy) };
                let color = if value == 1 { WHITE } else { BLACK };
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = margin + cx * scale + dx;
                        let py = margin + cy * scale + dy;
                        pixels[(py * side + px) as usize] = color;
                    }
                }
            }
        }
        Frame::new(pixels, side, side, 0)
    }

    fn checkerboard(side: u32) -> BitGrid {
        let mut cells = BitGrid::new(side, side);
        for y in 0..side {
            for x in 0..side {
                cells.set(x, y, ((x + y) % 2) as u8);
            }
        }
        cells
    }

    #[test]
    fn test_sample_grid_recovers_cells() {
        let cells = checkerboard(24);
        let frame = render(&cells, 8, 32);
        let matrix = BinaryMatrix::from_frame(frame).unwrap();
        let sampler = GridSampler::new(&matrix, 24, 24);
        let sampled = sampler.sample_grid(24, 24);

        assert_eq!(sampled, {
            let mut expected = cells.clone();
            // The forced-black border rings.
            for y in 0..24 {
                for x in 0..24 {
                    if x.min(y).min(23 - x).min(23 - y) < 2 {
                        expected.set(x, y, 0);
                    }
                }
            }
            expected
        });
    }

    #[test]
    fn test_sample_row_matches_grid() {
        let cells = checkerboard(24);
        let frame = render(&cells, 8, 32);
        let matrix = BinaryMatrix::from_frame(frame).unwrap();
        let sampler = GridSampler::new(&matrix, 24, 24);

        let grid = sampler.sample_grid(24, 24);
        let row = sampler.sample_row(24, 11);
        let expected: String = (0..24)
            .map(|x| if grid.get(x, 11) == 1 { '1' } else { '0' })
            .collect();

        assert_eq!(row, expected);
    }

    #[test]
    fn test_black_white_strategy_packs_msb_first() {
        let mut grid = BitGrid::new(8, 2);
        // Row 0: 10110000, row 1: 00000001
        for x in [0u32, 2, 3] {
            grid.set(x, 0, 1);
        }
        grid.set(7, 1, 1);

        let strategy = BlackWhiteStrategy;
        let zone = Zone {
            x: 0,
            y: 0,
            width: 8,
            height: 2,
        };
        assert_eq!(strategy.sample_zone(&grid, &zone, false), vec![0xB0, 0x01]);
        assert_eq!(strategy.sample_zone(&grid, &zone, true), vec![0x4F, 0xFE]);
        assert_eq!(strategy.bits_per_unit(), 1);
    }

    #[test]
    fn test_strategy_zone_offset() {
        let mut grid = BitGrid::new(4, 4);
        grid.set(1, 1, 1);
        grid.set(2, 2, 1);

        let strategy = BlackWhiteStrategy;
        let zone = Zone {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        };
        // Cells (1,1),(2,1),(1,2),(2,2) -> bits 1,0,0,1 -> 0b1001_0000
        assert_eq!(strategy.sample_zone(&grid, &zone, false), vec![0x90]);
    }
}
