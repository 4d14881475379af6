//! Seismic forces on non-structural envelope components, per height zone
//!
//! ```text
//! Ax      = 1 + 2 · (hx / hn)
//! Sp      = Cp · Ar · Ax / Rp
//! Vp      = 0.3 · Sa(0.2) · Ie · Sp · Wp
//! Vp,snow = 0.3 · Sa(0.2) · Ie · (S + Wp)
//! ```
//!
//! Sp is not clamped to a [0.7·Cp, 4·Cp] style range.

use serde::{Deserialize, Serialize};

use super::snow::SnowLoad;
use super::ImportanceCategory;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::Building;
use crate::location::Location;

/// Component factors; a copy is stored with every zone's result.
///
/// # Example
/// ```
/// use envelope_core::loads::SeismicFactor;
///
/// let f = SeismicFactor::default();
/// assert_eq!((f.ar, f.rp, f.cp), (1.0, 2.5, 1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeismicFactor {
    /// Element amplification factor
    pub ar: f64,
    /// Element response modification factor
    pub rp: f64,
    /// Element seismic coefficient
    pub cp: f64,
}

impl Default for SeismicFactor {
    fn default() -> Self {
        SeismicFactor {
            ar: 1.0,
            rp: 2.5,
            cp: 1.0,
        }
    }
}

impl SeismicFactor {
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("ar", self.ar), ("rp", self.rp), ("cp", self.cp)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Seismic component factors must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Seismic result for one height zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeismicLoad {
    pub zone_num: u32,
    pub factor: SeismicFactor,
    /// Height factor
    pub ax: f64,
    /// Horizontal force factor
    pub sp: f64,
    /// Lateral force (kPa)
    pub vp: f64,
    /// Lateral force including the snow load supplied to the calculation (kPa)
    pub vp_snow: f64,
    /// Sa(0.2) of the site
    pub sa_02: f64,
    /// Seismic importance factor Ie
    pub ie: f64,
    /// Dead load the lateral forces were computed with (kPa)
    pub wp_kpa: f64,
}

impl SeismicLoad {
    /// Lateral force including a snow load `s` (kPa).
    ///
    /// Lets the roof combinations use the snow load of the direction being
    /// evaluated rather than the one `vp_snow` was computed with.
    pub fn vp_with_snow(&self, s: f64) -> f64 {
        0.3 * self.sa_02 * self.ie * (s + self.wp_kpa)
    }
}

/// Height factor Ax for a zone elevation.
pub fn height_factor(elevation_m: f64, building_height_m: f64) -> f64 {
    1.0 + 2.0 * (elevation_m / building_height_m)
}

/// Seismic loads for every zone, bottom to top.
///
/// `snow` supplies S for `vp_snow` (its ULS value); without it S is 0.
/// Attach the result with [`Building::with_seismic_loads`].
pub fn compute_seismic_loads(
    building: &Building,
    location: &Location,
    importance: ImportanceCategory,
    factor: SeismicFactor,
    snow: Option<&SnowLoad>,
) -> CalcResult<Vec<SeismicLoad>> {
    factor.validate()?;

    let ie = importance.seismic_factor();
    let base = 0.3 * location.sa_02 * ie;
    let s = snow.map_or(0.0, |s| s.s_uls);
    let wp = building.wp_kpa;

    let loads: Vec<SeismicLoad> = building
        .zones
        .iter()
        .map(|zone| {
            let ax = height_factor(zone.elevation_m, building.height_m());
            let sp = factor.cp * factor.ar * ax / factor.rp;
            let mut load = SeismicLoad {
                zone_num: zone.zone_num,
                factor,
                ax,
                sp,
                vp: base * sp * wp,
                vp_snow: 0.0,
                sa_02: location.sa_02,
                ie,
                wp_kpa: wp,
            };
            load.vp_snow = load.vp_with_snow(s);
            load
        })
        .collect();

    for load in &loads {
        log::debug!(
            "seismic zone {}: ax {:.4}, sp {:.4}, vp {:.4} kPa",
            load.zone_num,
            load.ax,
            load.sp,
            load.vp
        );
    }

    Ok(loads)
}
