use anyhow::Result;
use std::path::Path;

use rstamp_core::grid::ascii;

pub fn show_info(raster: &Path) -> Result<()> {
    let grid = ascii::read(raster)?;
    let stats = grid.stats();
    let extent = grid.extent();

    println!("\n📐 {}\n", raster.display());
    println!("  Size:      {} x {} cells", grid.ncols(), grid.nrows());
    println!("  Cell size: {}", grid.cellsize());
    println!(
        "  Extent:    ({}, {}) - ({}, {})",
        extent.xmin, extent.ymin, extent.xmax, extent.ymax
    );
    println!("  Nodata:    {}", grid.nodata());
    println!();
    if stats.data_cells == 0 {
        println!("  All {} cells are nodata", stats.nodata_cells);
    } else {
        println!("  Min:       {}", stats.min);
        println!("  Max:       {}", stats.max);
        println!("  Mean:      {:.6}", stats.mean);
        println!(
            "  Cells:     {} data, {} nodata",
            stats.data_cells, stats.nodata_cells
        );
    }

    Ok(())
}
