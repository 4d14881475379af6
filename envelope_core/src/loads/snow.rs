//! Roof snow loads for the upwind and downwind directions
//!
//! ```text
//! S = Is · (Ss · (Cb · Cw · Cs · Ca) + Sr)
//! ```
//!
//! Both directions are computed independently. With the default
//! [`AccumulationMode::Uniform`] the accumulation factor is 1 for both, so the
//! two results are equal; [`AccumulationMode::Directional`] carries a separate
//! factor per direction.

use serde::{Deserialize, Serialize};

use super::{ImportanceCategory, LimitState, Terrain, WindDirection};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{Building, Roof};
use crate::location::Location;

/// Roof surface type for the slope factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoofSurface {
    /// Unobstructed slippery roof (metal, glass) where snow slides off freely
    UnobstructedSlipperyRoof,
    /// Any other roof
    #[default]
    Other,
}

/// How the accumulation factor Ca is chosen
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AccumulationMode {
    /// Ca = 1 regardless of direction
    #[default]
    Uniform,
    /// Separate Ca for each wind direction
    Directional { upwind: f64, downwind: f64 },
}

impl AccumulationMode {
    /// Accumulation factor for a direction
    pub fn factor(&self, direction: WindDirection) -> f64 {
        match (self, direction) {
            (AccumulationMode::Uniform, _) => 1.0,
            (AccumulationMode::Directional { upwind, .. }, WindDirection::Upwind) => *upwind,
            (AccumulationMode::Directional { downwind, .. }, WindDirection::Downwind) => *downwind,
        }
    }
}

/// User selections driving the snow calculation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SnowSelections {
    #[serde(default)]
    pub importance: ImportanceCategory,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub roof_surface: RoofSurface,
    /// Snow load entered directly (kPa); bypasses the formula
    #[serde(default)]
    pub manual: Option<f64>,
    #[serde(default)]
    pub accumulation: AccumulationMode,
}

/// Snow coefficients for one direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnowFactor {
    /// Slope factor
    pub cs: f64,
    /// Accumulation factor
    pub ca: f64,
    /// Wind exposure factor
    pub cw: f64,
    /// Basic roof snow load factor
    pub cb: f64,
}

/// Snow result for one direction (kPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnowLoad {
    pub direction: WindDirection,
    pub factor: SnowFactor,
    pub s_uls: f64,
    pub s_sls: f64,
    /// The loads were entered manually rather than computed
    pub manual: bool,
}

impl SnowLoad {
    pub fn get(&self, limit_state: LimitState) -> f64 {
        match limit_state {
            LimitState::Uls => self.s_uls,
            LimitState::Sls => self.s_sls,
        }
    }
}

/// Upwind and downwind snow results
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalSnowLoad {
    pub upwind: SnowLoad,
    pub downwind: SnowLoad,
}

impl DirectionalSnowLoad {
    pub fn get(&self, direction: WindDirection) -> &SnowLoad {
        match direction {
            WindDirection::Upwind => &self.upwind,
            WindDirection::Downwind => &self.downwind,
        }
    }
}

/// Slope factor Cs for a roof slope in degrees.
///
/// # Example
/// ```
/// use envelope_core::loads::snow::{slope_factor, RoofSurface};
///
/// assert_eq!(slope_factor(RoofSurface::Other, 45.0), 0.625);
/// assert_eq!(slope_factor(RoofSurface::UnobstructedSlipperyRoof, 10.0), 1.0);
/// ```
pub fn slope_factor(surface: RoofSurface, slope_deg: f64) -> f64 {
    let (flat, bare) = match surface {
        RoofSurface::UnobstructedSlipperyRoof => (15.0, 60.0),
        RoofSurface::Other => (30.0, 70.0),
    };
    if slope_deg <= flat {
        1.0
    } else if slope_deg < bare {
        (bare - slope_deg) / (bare - flat)
    } else {
        0.0
    }
}

/// Wind exposure factor Cw.
pub fn wind_exposure_factor(importance: ImportanceCategory, terrain: Terrain) -> f64 {
    match (importance.is_low_or_normal(), terrain) {
        (true, Terrain::Intermediate) => 0.75,
        (true, Terrain::Open) => 0.5,
        _ => 1.0,
    }
}

/// Characteristic roof length lc = 2w − w²/l (m)
pub fn characteristic_length(roof: &Roof) -> f64 {
    let w = roof.w_roof_m;
    let l = roof.l_roof_m;
    if l == 0.0 {
        2.0 * w
    } else {
        2.0 * w - w * w / l
    }
}

/// Basic roof snow load factor Cb.
pub fn basic_roof_factor(roof: &Roof, cw: f64) -> f64 {
    if cw == 0.0 {
        return 0.0;
    }
    let lc = characteristic_length(roof);
    if lc <= 70.0 / (cw * cw) {
        0.8
    } else {
        (1.0 / cw) * (1.0 - (1.0 - 0.8 * cw) * (-(lc * cw * cw - 70.0) / 100.0).exp())
    }
}

fn snow_for_direction(
    building: &Building,
    location: &Location,
    selections: &SnowSelections,
    direction: WindDirection,
) -> CalcResult<SnowLoad> {
    let cw = wind_exposure_factor(selections.importance, selections.terrain);
    let factor = SnowFactor {
        cs: slope_factor(selections.roof_surface, building.roof.slope_deg),
        ca: selections.accumulation.factor(direction),
        cw,
        cb: basic_roof_factor(&building.roof, cw),
    };

    let (s_uls, s_sls, manual) = match selections.manual {
        Some(value) => {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_input(
                    "manual_snow",
                    value.to_string(),
                    "Snow load cannot be negative",
                ));
            }
            (value, value, true)
        }
        None => {
            let load = |limit_state| {
                selections.importance.snow_factor(limit_state)
                    * (location.ss_kpa * (factor.cb * factor.cw * factor.cs * factor.ca) + location.sr_kpa)
            };
            (load(LimitState::Uls), load(LimitState::Sls), false)
        }
    };

    log::debug!(
        "snow {}: cs {:.4}, ca {}, cw {}, cb {:.4}, S uls {:.4} kPa",
        direction,
        factor.cs,
        factor.ca,
        factor.cw,
        factor.cb,
        s_uls
    );

    Ok(SnowLoad {
        direction,
        factor,
        s_uls,
        s_sls,
        manual,
    })
}

/// Upwind and downwind snow loads on the roof.
pub fn compute_snow_load(
    building: &Building,
    location: &Location,
    selections: &SnowSelections,
) -> CalcResult<DirectionalSnowLoad> {
    if let AccumulationMode::Directional { upwind, downwind } = selections.accumulation {
        for (name, value) in [("upwind_ca", upwind), ("downwind_ca", downwind)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_input(
                    name,
                    value.to_string(),
                    "Accumulation factor cannot be negative",
                ));
            }
        }
    }
    Ok(DirectionalSnowLoad {
        upwind: snow_for_direction(building, location, selections, WindDirection::Upwind)?,
        downwind: snow_for_direction(building, location, selections, WindDirection::Downwind)?,
    })
}
