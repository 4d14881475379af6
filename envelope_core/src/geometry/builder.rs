//! Factory functions for the geometry model.
//!
//! Each function validates its inputs and returns an immutable value. There
//! is no builder object to reset: call the functions again to describe a
//! different building.
//!
//! # Example
//!
//! ```
//! use envelope_core::geometry::{
//!     build_building, build_cladding, build_dimensions, build_roof, DeadLoad, ZoneLayout,
//! };
//!
//! let dims = build_dimensions(30.0, Some(86.0), None, None)?;
//! let cladding = build_cladding(86.0, 0.0)?;
//! let roof = build_roof(30.0, 45.0, 5.0, 1.0)?;
//! let building = build_building(dims, cladding, roof, 24, 0.0, ZoneLayout::Default, DeadLoad::Uniform(1.2))?;
//!
//! let elevations: Vec<f64> = building.zones.iter().map(|z| z.elevation_m).collect();
//! assert_eq!(elevations, vec![20.0, 40.0, 60.0, 80.0, 86.0]);
//! # Ok::<(), envelope_core::errors::CalcError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Building, Cladding, Dimensions, HeightZone, Roof, ZoneMaterial, WALL_SLOPE_RANGE_DEG};
use crate::errors::{CalcError, CalcResult};

/// Height of each default zone (m)
pub const DEFAULT_ZONE_STEP_M: f64 = 20.0;

/// How the building is divided into height zones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ZoneLayout {
    /// Zones every 20 m, the last one clamped to the building height
    #[default]
    Default,
    /// Zones every `step_m`, the last one clamped to the building height
    Step(f64),
    /// Caller-supplied zones
    Custom(Vec<HeightZone>),
}

/// Source of the wall dead load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeadLoad {
    /// One value applied to every zone (kPa)
    Uniform(f64),
    /// Material composition per zone number; the dead load is their weighted average
    PerZoneMaterials(BTreeMap<u32, Vec<ZoneMaterial>>),
}

/// Build the envelope dimensions.
///
/// When both `eave_m` and `ridge_m` are given the height is their average and
/// overrides `height_m`.
pub fn build_dimensions(
    width_m: f64,
    height_m: Option<f64>,
    eave_m: Option<f64>,
    ridge_m: Option<f64>,
) -> CalcResult<Dimensions> {
    let height_m = match (eave_m, ridge_m, height_m) {
        (Some(eave), Some(ridge), _) => (eave + ridge) / 2.0,
        (Some(_), None, _) | (None, Some(_), _) => {
            return Err(CalcError::missing_parameter(
                if eave_m.is_some() { "ridge_m" } else { "eave_m" },
                "eave and ridge heights must be supplied together",
            ));
        }
        (None, None, Some(h)) => h,
        (None, None, None) => {
            return Err(CalcError::missing_parameter(
                "height_m",
                "either a height or an eave/ridge pair is required",
            ));
        }
    };

    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(CalcError::invalid_geometry(format!(
            "building height must be positive, got {}",
            height_m
        )));
    }
    if !width_m.is_finite() || width_m <= 0.0 {
        return Err(CalcError::invalid_geometry(format!(
            "building width must be positive, got {}",
            width_m
        )));
    }

    Ok(Dimensions { width_m, height_m })
}

/// Build the cladding extent. `c_top_m` must not be below `c_bot_m`.
pub fn build_cladding(c_top_m: f64, c_bot_m: f64) -> CalcResult<Cladding> {
    if c_bot_m < 0.0 {
        return Err(CalcError::invalid_input(
            "c_bot_m",
            c_bot_m.to_string(),
            "Cladding bottom cannot be below grade",
        ));
    }
    if c_top_m < c_bot_m {
        return Err(CalcError::invalid_geometry(format!(
            "cladding top {} is below cladding bottom {}",
            c_top_m, c_bot_m
        )));
    }
    Ok(Cladding { c_top_m, c_bot_m })
}

/// Build the roof. Plan dimensions are stored short side first regardless of
/// argument order; `wall_slope` is derived from the slope.
pub fn build_roof(w_roof_m: f64, l_roof_m: f64, slope_deg: f64, wp_kpa: f64) -> CalcResult<Roof> {
    if w_roof_m <= 0.0 || l_roof_m <= 0.0 {
        return Err(CalcError::invalid_geometry(format!(
            "roof plan dimensions must be positive, got {} x {}",
            w_roof_m, l_roof_m
        )));
    }
    if !(0.0..=90.0).contains(&slope_deg) {
        return Err(CalcError::invalid_input(
            "slope_deg",
            slope_deg.to_string(),
            "Roof slope must be between 0 and 90 degrees",
        ));
    }
    if wp_kpa < 0.0 {
        return Err(CalcError::invalid_input(
            "wp_kpa",
            wp_kpa.to_string(),
            "Roof dead load cannot be negative",
        ));
    }

    let (lo, hi) = WALL_SLOPE_RANGE_DEG;
    Ok(Roof {
        w_roof_m: w_roof_m.min(l_roof_m),
        l_roof_m: w_roof_m.max(l_roof_m),
        slope_deg,
        wall_slope: (lo..=hi).contains(&slope_deg),
        wp_kpa,
    })
}

/// Partition `height_m` into zones of `step_m`, clamping the last one to the height.
pub fn default_height_zones(height_m: f64, step_m: f64) -> CalcResult<Vec<HeightZone>> {
    if !step_m.is_finite() || step_m <= 0.0 {
        return Err(CalcError::invalid_input(
            "zone_step_m",
            step_m.to_string(),
            "Zone step must be positive",
        ));
    }
    let count = (height_m / step_m).ceil().max(1.0) as u32;
    Ok((1..=count)
        .map(|n| HeightZone::new(n, (f64::from(n) * step_m).min(height_m)))
        .collect())
}

/// Weighted dead load: Σ(weight × percentage/100) / Σ(weight), 0 when the total weight is 0.
pub fn weighted_dead_load<'a>(materials: impl IntoIterator<Item = &'a ZoneMaterial>) -> f64 {
    let (weighted, total) = materials
        .into_iter()
        .fold((0.0, 0.0), |(weighted, total), m| {
            (weighted + m.weight * m.percentage / 100.0, total + m.weight)
        });
    if total == 0.0 {
        0.0
    } else {
        weighted / total
    }
}

/// Assemble the building.
///
/// # Errors
///
/// - `InvalidGeometry` when custom zones are unordered, duplicated, or their top does not match the building height
/// - `NotImplemented` when the per-zone material mapping names zones the building does not have
pub fn build_building(
    dimensions: Dimensions,
    cladding: Cladding,
    roof: Roof,
    num_floor: u32,
    h_opening_m: f64,
    layout: ZoneLayout,
    dead_load: DeadLoad,
) -> CalcResult<Building> {
    if h_opening_m < 0.0 {
        return Err(CalcError::invalid_input(
            "h_opening_m",
            h_opening_m.to_string(),
            "Opening height cannot be negative",
        ));
    }

    let mut zones = match layout {
        ZoneLayout::Default => default_height_zones(dimensions.height_m, DEFAULT_ZONE_STEP_M)?,
        ZoneLayout::Step(step_m) => default_height_zones(dimensions.height_m, step_m)?,
        ZoneLayout::Custom(zones) => validate_custom_zones(zones, dimensions.height_m)?,
    };

    let wp_kpa = match dead_load {
        DeadLoad::Uniform(wp) => {
            if !wp.is_finite() || wp < 0.0 {
                return Err(CalcError::invalid_input(
                    "wp_kpa",
                    wp.to_string(),
                    "Dead load must be a non-negative number",
                ));
            }
            wp
        }
        DeadLoad::PerZoneMaterials(mapping) => {
            if mapping.is_empty() {
                return Err(CalcError::not_implemented(
                    "dead load from an empty per-zone material mapping",
                ));
            }
            for (zone_num, materials) in mapping {
                let zone = zones.iter_mut().find(|z| z.zone_num == zone_num).ok_or_else(|| {
                    CalcError::not_implemented(format!(
                        "material mapping for zone {} which the building does not have",
                        zone_num
                    ))
                })?;
                zone.materials = materials;
            }
            weighted_dead_load(zones.iter().flat_map(|z| z.materials.iter()))
        }
    };

    log::debug!(
        "built building: height {} m, {} zones, wp {:.4} kPa",
        dimensions.height_m,
        zones.len(),
        wp_kpa
    );

    Ok(Building {
        dimensions,
        cladding,
        roof,
        num_floor,
        h_opening_m,
        zones,
        wp_kpa,
    })
}

/// Slack allowed between the top zone elevation and the building height (m)
const ELEVATION_TOLERANCE_M: f64 = 1e-6;

fn validate_custom_zones(mut zones: Vec<HeightZone>, height_m: f64) -> CalcResult<Vec<HeightZone>> {
    if zones.is_empty() {
        return Err(CalcError::invalid_geometry("at least one height zone is required"));
    }
    zones.sort_by_key(|z| z.zone_num);

    if zones[0].zone_num == 0 {
        return Err(CalcError::invalid_geometry("zone numbers start at 1"));
    }
    for pair in zones.windows(2) {
        if pair[0].zone_num == pair[1].zone_num {
            return Err(CalcError::invalid_geometry(format!(
                "zone {} is defined more than once",
                pair[0].zone_num
            )));
        }
        if pair[1].elevation_m <= pair[0].elevation_m {
            return Err(CalcError::invalid_geometry(format!(
                "zone {} elevation {} m is not above zone {} elevation {} m",
                pair[1].zone_num, pair[1].elevation_m, pair[0].zone_num, pair[0].elevation_m
            )));
        }
    }
    if zones[0].elevation_m <= 0.0 {
        return Err(CalcError::invalid_geometry("zone elevations must be above grade"));
    }

    let max_elevation = zones.iter().map(|z| z.elevation_m).fold(f64::MIN, f64::max);
    if max_elevation > height_m + ELEVATION_TOLERANCE_M {
        return Err(CalcError::invalid_geometry(format!(
            "zone elevation {} m exceeds building height {} m",
            max_elevation, height_m
        )));
    }
    if max_elevation < height_m - ELEVATION_TOLERANCE_M {
        return Err(CalcError::invalid_geometry(format!(
            "top zone elevation {} m does not reach building height {} m",
            max_elevation, height_m
        )));
    }

    // Loads belong to a previous analysis of a different partition.
    for zone in &mut zones {
        zone.wind = None;
        zone.seismic = None;
    }
    Ok(zones)
}
