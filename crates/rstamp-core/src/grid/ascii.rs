//! ESRI ASCII grid (.asc) codec.
//!
//! The format is a short key/value header followed by the cell values in
//! row-major order, northernmost row first:
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    0.0
//! yllcorner    0.0
//! cellsize     10.0
//! NODATA_value -9999
//! 1 2 3 4
//! ...
//! ```
//!
//! Header keys are matched case-insensitively. Both `xllcorner`/`yllcorner`
//! and `xllcenter`/`yllcenter` registrations are accepted; the center form is
//! converted to the corner form on read. Numeric tokens may use `,` as the
//! decimal separator, which some locales produce when exporting grids.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Nodata sentinel assumed when the header omits `NODATA_value`.
const DEFAULT_NODATA: f64 = -9999.0;

/// Per-axis ceiling for `ncols`/`nrows` header values.
const MAX_DIM: f64 = 1_000_000.0;

/// Parse a numeric token, tolerating a comma decimal separator.
fn parse_number(token: &str) -> Result<f64> {
    let normalized = token.replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|_| Error::Grid(format!("invalid numeric token: {token:?}")))
}

/// Read a grid from an .asc file.
pub fn read(path: &Path) -> Result<Grid> {
    log::debug!("reading grid from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Parse a grid from .asc text.
///
/// # Errors
/// Returns `Error::Grid` for missing or malformed header fields, or when the
/// number of cell values does not match the header dimensions.
pub fn parse(text: &str) -> Result<Grid> {
    let mut header: HashMap<String, f64> = HashMap::new();
    let mut values: Vec<f64> = Vec::new();

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };

        if values.is_empty() && first.chars().next().is_some_and(char::is_alphabetic) {
            let value = tokens
                .next()
                .ok_or_else(|| Error::Grid(format!("header line missing value: {line:?}")))?;
            header.insert(first.to_ascii_lowercase(), parse_number(value)?);
            continue;
        }

        values.push(parse_number(first)?);
        for token in tokens {
            values.push(parse_number(token)?);
        }
    }

    let field = |key: &str| -> Result<f64> {
        header
            .get(key)
            .copied()
            .ok_or_else(|| Error::Grid(format!("missing header field: {key}")))
    };

    let dim = |key: &str| -> Result<usize> {
        let v = field(key)?;
        if !(v.fract() == 0.0 && v >= 1.0 && v <= MAX_DIM) {
            return Err(Error::Grid(format!(
                "header field {key} must be a whole number in 1..={MAX_DIM}, got {v}"
            )));
        }
        Ok(v as usize)
    };

    let ncols = dim("ncols")?;
    let nrows = dim("nrows")?;
    let cellsize = field("cellsize")?;
    let nodata = header
        .get("nodata_value")
        .copied()
        .unwrap_or(DEFAULT_NODATA);

    let xll = match (header.get("xllcorner"), header.get("xllcenter")) {
        (Some(&corner), _) => corner,
        (None, Some(&center)) => center - cellsize / 2.0,
        (None, None) => return Err(Error::Grid("missing header field: xllcorner".into())),
    };
    let yll = match (header.get("yllcorner"), header.get("yllcenter")) {
        (Some(&corner), _) => corner,
        (None, Some(&center)) => center - cellsize / 2.0,
        (None, None) => return Err(Error::Grid("missing header field: yllcorner".into())),
    };

    // Count check comes first so a bogus header can't trigger a huge
    // allocation.
    if values.len() != ncols * nrows {
        return Err(Error::Grid(format!(
            "expected {} cell values, found {}",
            ncols * nrows,
            values.len()
        )));
    }
    let mut grid = Grid::new(ncols, nrows, xll, yll, cellsize, nodata)?;
    for (i, v) in values.into_iter().enumerate() {
        grid.set(i / ncols, i % ncols, v);
    }

    Ok(grid)
}

/// Render a grid as .asc text.
#[must_use]
pub fn render(grid: &Grid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ncols        {}", grid.ncols());
    let _ = writeln!(out, "nrows        {}", grid.nrows());
    let _ = writeln!(out, "xllcorner    {}", grid.xll());
    let _ = writeln!(out, "yllcorner    {}", grid.yll());
    let _ = writeln!(out, "cellsize     {}", grid.cellsize());
    let _ = writeln!(out, "NODATA_value {}", grid.nodata());

    for row in 0..grid.nrows() {
        for col in 0..grid.ncols() {
            if col > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{}", grid.get(row, col));
        }
        out.push('\n');
    }

    out
}

/// Write a grid to an .asc file, creating parent directories as needed.
pub fn write(grid: &Grid, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render(grid))?;
    Ok(())
}
