//! Raster grid model.
//!
//! A [`Grid`] is a rectangular block of `f64` cells in row-major order with
//! the northernmost row first, matching the on-disk layout of the ESRI ASCII
//! grid format (see [`ascii`]). Georeferencing is the lower-left corner of
//! the lower-left cell plus a uniform cell size; there is no rotation and no
//! per-axis cell size.

pub mod ascii;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerance used when comparing grid origins and cell sizes.
const GRID_ALIGN_TOL: f64 = 1e-9;

/// An axis-aligned bounding rectangle in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    #[must_use]
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

/// Summary statistics over a grid's data cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of cells holding real data.
    pub data_cells: usize,
    /// Number of nodata cells.
    pub nodata_cells: usize,
}

/// A single-band raster grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    ncols: usize,
    nrows: usize,
    /// X of the lower-left corner of the lower-left cell.
    xll: f64,
    /// Y of the lower-left corner of the lower-left cell.
    yll: f64,
    cellsize: f64,
    nodata: f64,
    /// Row-major, northernmost row first.
    values: Vec<f64>,
}

impl Grid {
    /// Create a grid with every cell set to the nodata value.
    ///
    /// # Errors
    /// Returns `Error::Grid` for zero dimensions or a non-positive cell size.
    pub fn new(
        ncols: usize,
        nrows: usize,
        xll: f64,
        yll: f64,
        cellsize: f64,
        nodata: f64,
    ) -> Result<Self> {
        if ncols == 0 || nrows == 0 {
            return Err(Error::Grid(format!(
                "grid dimensions must be positive, got {ncols}x{nrows}"
            )));
        }
        if !(cellsize.is_finite() && cellsize > 0.0) {
            return Err(Error::Grid(format!("invalid cell size: {cellsize}")));
        }
        Ok(Self {
            ncols,
            nrows,
            xll,
            yll,
            cellsize,
            nodata,
            values: vec![nodata; ncols * nrows],
        })
    }

    /// A nodata-filled grid with the same gridding as `self`.
    #[must_use]
    pub fn filled_like(&self) -> Self {
        Self {
            values: vec![self.nodata; self.ncols * self.nrows],
            ..self.clone()
        }
    }

    #[must_use]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[must_use]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[must_use]
    pub fn xll(&self) -> f64 {
        self.xll
    }

    #[must_use]
    pub fn yll(&self) -> f64 {
        self.yll
    }

    #[must_use]
    pub fn cellsize(&self) -> f64 {
        self.cellsize
    }

    #[must_use]
    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether `v` is this grid's nodata sentinel.
    #[must_use]
    pub fn is_nodata(&self, v: f64) -> bool {
        v.is_nan() || v == self.nodata
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.nrows && col < self.ncols);
        row * self.ncols + col
    }

    /// Cell value at `(row, col)`; row 0 is the northernmost row.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, v: f64) {
        let i = self.index(row, col);
        self.values[i] = v;
    }

    /// Map coordinates of the center of cell `(row, col)`.
    #[must_use]
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.xll + (col as f64 + 0.5) * self.cellsize;
        let y = self.yll + (self.nrows - row) as f64 * self.cellsize - 0.5 * self.cellsize;
        (x, y)
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::new(
            self.xll,
            self.yll,
            self.xll + self.ncols as f64 * self.cellsize,
            self.yll + self.nrows as f64 * self.cellsize,
        )
    }

    /// Whether two grids share dimensions, origin, and cell size.
    #[must_use]
    pub fn same_gridding(&self, other: &Self) -> bool {
        self.ncols == other.ncols
            && self.nrows == other.nrows
            && (self.xll - other.xll).abs() <= GRID_ALIGN_TOL
            && (self.yll - other.yll).abs() <= GRID_ALIGN_TOL
            && (self.cellsize - other.cellsize).abs() <= GRID_ALIGN_TOL
    }

    /// Statistics over the data cells, ignoring nodata.
    #[must_use]
    pub fn stats(&self) -> GridStats {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut data_cells = 0usize;

        for &v in &self.values {
            if self.is_nodata(v) {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
            sum += v;
            data_cells += 1;
        }

        let mean = if data_cells > 0 {
            sum / data_cells as f64
        } else {
            f64::NAN
        };
        if data_cells == 0 {
            min = f64::NAN;
            max = f64::NAN;
        }

        GridStats {
            min,
            max,
            mean,
            data_cells,
            nodata_cells: self.values.len() - data_cells,
        }
    }
}
