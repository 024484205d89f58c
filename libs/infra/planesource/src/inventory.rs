use imagec_domain_model::Units;

#[derive(Debug, Clone, Copy)]
pub struct TileGrid {
    pub series_index: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

#[derive(Debug, Clone)]
pub struct SeriesInfo {
    pub series_index: u32,
    pub width: u32,
    pub height: u32,
    pub z_count: u32,
    pub t_count: u32,
    pub c_count: u32,
    pub pyramid_levels: u32,
    pub tile_grid: TileGrid,
}

#[derive(Debug, Clone)]
pub struct ImageInventory {
    pub series: Vec<SeriesInfo>,
}

impl ImageInventory {
    pub fn series(&self, series_index: u32) -> Option<&SeriesInfo> {
        self.series.iter().find(|s| s.series_index == series_index)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OmeInfo {
    pub width: u32,
    pub height: u32,
    pub pixel_size_x: f64,
    pub pixel_size_y: f64,
    pub unit: Units,
}
