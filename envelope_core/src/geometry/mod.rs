//! # Building Geometry
//!
//! Immutable value types describing the building envelope: overall
//! [`Dimensions`], [`Cladding`] extent, [`Roof`] geometry and the ordered list
//! of [`HeightZone`]s the loads are computed over.
//!
//! Values are produced by the factory functions in [`builder`] and are not
//! mutated afterwards. Computed wind and seismic loads are attached by
//! replacing the whole set at once ([`Building::with_wind_loads`],
//! [`Building::with_seismic_loads`]).
//!
//! ## Structure
//!
//! ```text
//! Building
//! ├── dimensions: Dimensions (width, height)
//! ├── cladding:   Cladding (c_top, c_bot)
//! ├── roof:       Roof (w_roof, l_roof, slope, wall_slope, wp)
//! ├── zones:      Vec<HeightZone> (bottom to top)
//! │   ├── materials
//! │   ├── wind:    Option<WindLoad>
//! │   └── seismic: Option<SeismicLoad>
//! └── wp (uniform or weighted dead load)
//! ```
//!
//! ## Units
//!
//! Lengths in metres, loads and pressures in kPa, angles in degrees.

pub mod builder;

pub use builder::{
    build_building, build_cladding, build_dimensions, build_roof, default_height_zones,
    weighted_dead_load, DeadLoad, ZoneLayout, DEFAULT_ZONE_STEP_M,
};

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::loads::seismic::SeismicLoad;
use crate::loads::wind::WindLoad;

/// Building envelope size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Plan width (m)
    pub width_m: f64,
    /// Building height (m), the average of eave and ridge when those were given
    pub height_m: f64,
}

/// Vertical extent of the cladding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cladding {
    /// Top of cladding (m)
    pub c_top_m: f64,
    /// Bottom of cladding (m)
    pub c_bot_m: f64,
}

impl Cladding {
    /// Height of the clad band (m)
    pub fn extent_m(&self) -> f64 {
        self.c_top_m - self.c_bot_m
    }
}

/// Roof geometry and dead load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roof {
    /// Short plan dimension (m)
    pub w_roof_m: f64,
    /// Long plan dimension (m)
    pub l_roof_m: f64,
    /// Roof slope (degrees)
    pub slope_deg: f64,
    /// Steep roof that is designed like a wall (30° ≤ slope ≤ 70°)
    pub wall_slope: bool,
    /// Roof dead load (kPa)
    pub wp_kpa: f64,
}

/// Slope range (degrees) over which a roof is treated as a sloped wall.
pub const WALL_SLOPE_RANGE_DEG: (f64, f64) = (30.0, 70.0);

impl Roof {
    /// Wall-slope flag as the 0/1 integer used in reports
    pub fn wall_slope_flag(&self) -> u8 {
        u8::from(self.wall_slope)
    }
}

/// One component of a zone's material composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMaterial {
    /// Material label (e.g. "Brick veneer")
    pub name: String,
    /// Weight of the material layer (kPa)
    pub weight: f64,
    /// Share of the zone's wall area covered by the material (0-100)
    pub percentage: f64,
}

impl ZoneMaterial {
    pub fn new(name: impl Into<String>, weight: f64, percentage: f64) -> Self {
        ZoneMaterial {
            name: name.into(),
            weight,
            percentage,
        }
    }
}

/// Vertical slice of the building over which wind and seismic factors are constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightZone {
    /// 1-based index, bottom to top
    pub zone_num: u32,
    /// Elevation of the top of the zone (m)
    pub elevation_m: f64,
    /// Optional material composition
    #[serde(default)]
    pub materials: Vec<ZoneMaterial>,
    /// Wind load, once computed
    #[serde(default)]
    pub wind: Option<WindLoad>,
    /// Seismic load, once computed
    #[serde(default)]
    pub seismic: Option<SeismicLoad>,
}

impl HeightZone {
    /// Create a zone with no materials or loads
    pub fn new(zone_num: u32, elevation_m: f64) -> Self {
        HeightZone {
            zone_num,
            elevation_m,
            materials: Vec::new(),
            wind: None,
            seismic: None,
        }
    }

    /// Attach a material composition (builder pattern)
    pub fn with_materials(mut self, materials: Vec<ZoneMaterial>) -> Self {
        self.materials = materials;
        self
    }

    /// Wind load for this zone, or `MissingLoadData`
    pub fn wind_load(&self) -> CalcResult<&WindLoad> {
        self.wind
            .as_ref()
            .ok_or_else(|| CalcError::missing_load_data("wind", self.zone_num))
    }

    /// Seismic load for this zone, or `MissingLoadData`
    pub fn seismic_load(&self) -> CalcResult<&SeismicLoad> {
        self.seismic
            .as_ref()
            .ok_or_else(|| CalcError::missing_load_data("seismic", self.zone_num))
    }
}

/// Aggregate root of the geometry model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub dimensions: Dimensions,
    pub cladding: Cladding,
    pub roof: Roof,
    /// Number of floors
    pub num_floor: u32,
    /// Mid-height of the dominant opening (m), 0 if none
    pub h_opening_m: f64,
    /// Height zones ordered bottom to top
    pub zones: Vec<HeightZone>,
    /// Wall dead load (kPa)
    pub wp_kpa: f64,
}

impl Building {
    /// Building height (m)
    pub fn height_m(&self) -> f64 {
        self.dimensions.height_m
    }

    /// Building width (m)
    pub fn width_m(&self) -> f64 {
        self.dimensions.width_m
    }

    /// Look up a zone by number
    pub fn zone(&self, zone_num: u32) -> Option<&HeightZone> {
        self.zones.iter().find(|z| z.zone_num == zone_num)
    }

    /// The zone with the largest zone number
    pub fn top_zone(&self) -> CalcResult<&HeightZone> {
        self.zones
            .iter()
            .max_by_key(|z| z.zone_num)
            .ok_or_else(|| CalcError::invalid_geometry("building has no height zones"))
    }

    /// Vertical extent of a zone: its elevation minus the elevation of the zone below.
    pub fn zone_extent_m(&self, zone_num: u32) -> Option<f64> {
        let zone = self.zone(zone_num)?;
        let below = self
            .zones
            .iter()
            .filter(|z| z.zone_num < zone_num)
            .map(|z| z.elevation_m)
            .fold(0.0f64, f64::max);
        Some(zone.elevation_m - below)
    }

    /// Replace every zone's wind load.
    ///
    /// Exactly one load per zone is required; prior values are discarded.
    pub fn with_wind_loads(mut self, loads: Vec<WindLoad>) -> CalcResult<Self> {
        check_one_per_zone(&self.zones, loads.iter().map(|l| l.zone_num), "wind")?;
        for load in loads {
            if let Some(zone) = self.zones.iter_mut().find(|z| z.zone_num == load.zone_num) {
                zone.wind = Some(load);
            }
        }
        Ok(self)
    }

    /// Replace every zone's seismic load.
    pub fn with_seismic_loads(mut self, loads: Vec<SeismicLoad>) -> CalcResult<Self> {
        check_one_per_zone(&self.zones, loads.iter().map(|l| l.zone_num), "seismic")?;
        for load in loads {
            if let Some(zone) = self.zones.iter_mut().find(|z| z.zone_num == load.zone_num) {
                zone.seismic = Some(load);
            }
        }
        Ok(self)
    }
}

fn check_one_per_zone(
    zones: &[HeightZone],
    zone_nums: impl Iterator<Item = u32>,
    load: &str,
) -> CalcResult<()> {
    let mut seen: Vec<u32> = zone_nums.collect();
    seen.sort_unstable();
    let mut expected: Vec<u32> = zones.iter().map(|z| z.zone_num).collect();
    expected.sort_unstable();
    if seen != expected {
        return Err(CalcError::invalid_input(
            format!("{}_loads", load),
            format!("{:?}", seen),
            format!("expected one {} load for each zone {:?}", load, expected),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_building() -> Building {
        let dims = build_dimensions(30.0, Some(50.0), None, None).unwrap();
        let cladding = build_cladding(50.0, 0.0).unwrap();
        let roof = build_roof(30.0, 60.0, 45.0, 1.2).unwrap();
        build_building(dims, cladding, roof, 12, 0.0, ZoneLayout::Default, DeadLoad::Uniform(1.5)).unwrap()
    }

    #[test]
    fn test_zone_extent() {
        let building = sample_building();
        assert_eq!(building.zone_extent_m(1), Some(20.0));
        assert_eq!(building.zone_extent_m(3), Some(10.0));
        assert_eq!(building.zone_extent_m(9), None);
    }

    #[test]
    fn test_top_zone() {
        let building = sample_building();
        let top = building.top_zone().unwrap();
        assert_eq!(top.zone_num, 3);
        assert_eq!(top.elevation_m, 50.0);
    }

    #[test]
    fn test_missing_loads_reported() {
        let building = sample_building();
        let zone = building.zone(2).unwrap();
        assert_eq!(zone.wind_load().unwrap_err().error_code(), "MISSING_LOAD_DATA");
        assert_eq!(zone.seismic_load().unwrap_err().error_code(), "MISSING_LOAD_DATA");
    }

    #[test]
    fn test_with_wind_loads_rejects_partial_set() {
        let building = sample_building();
        assert!(building.with_wind_loads(Vec::new()).is_err());
    }

    #[test]
    fn test_wall_slope_flag() {
        let building = sample_building();
        assert!(building.roof.wall_slope);
        assert_eq!(building.roof.wall_slope_flag(), 1);
    }

    #[test]
    fn test_cladding_extent() {
        let cladding = build_cladding(12.0, 2.0).unwrap();
        assert_eq!(cladding.extent_m(), 10.0);
    }
}
