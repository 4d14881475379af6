//! Wind loads on cladding and roof, per height zone
//!
//! ```text
//! p_i = Iw · q · Cei · Ct · Cgi · Cpi        (internal, Cgi = 2.0)
//! p_e = Iw · q · Ce  · Ct · Cg  · Cp         (external, Cg = 2.5)
//! net_pos = p_e,pos − p_i,neg
//! net_neg = p_e,neg − p_i,pos
//! ```
//!
//! Every zone gets five pressure sets (roof interior/edge/corner, wall
//! centre/corner), each evaluated with the ULS and the SLS importance factor.
//!
//! # Example
//! ```
//! use envelope_core::loads::wind::exposure_factor;
//! use envelope_core::loads::Terrain;
//!
//! let ce = exposure_factor(Terrain::Open, 50.0, None)?;
//! assert!((ce - 5.0f64.powf(0.2)).abs() < 1e-12);
//! # Ok::<(), envelope_core::errors::CalcError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::{ImportanceCategory, LimitState, Terrain};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{Building, HeightZone};
use crate::location::Location;

/// Gust effect factor for cladding, Cg
pub const GUST_FACTOR: f64 = 2.5;

/// Internal gust effect factor, Cgi
pub const INTERNAL_GUST_FACTOR: f64 = 2.0;

/// Topographic factor when the user gives none
pub const DEFAULT_TOPOGRAPHIC_FACTOR: f64 = 1.0;

/// Internal pressure category of the enclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InternalPressureCategory {
    /// No large or significant openings
    #[default]
    Enclosed,
    /// Significant openings that may be closed during storms
    PartiallyEnclosed,
    /// Large openings through which gusts are transmitted
    LargeOpenings,
}

impl InternalPressureCategory {
    /// (Cpi positive, Cpi negative)
    pub fn coefficients(&self) -> (f64, f64) {
        match self {
            InternalPressureCategory::Enclosed => (0.0, -0.15),
            InternalPressureCategory::PartiallyEnclosed => (0.3, -0.45),
            InternalPressureCategory::LargeOpenings => (0.7, -0.7),
        }
    }
}

/// Envelope area a pressure set applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    RoofInterior,
    RoofEdge,
    RoofCorner,
    WallCentre,
    WallCorner,
}

impl ZoneType {
    pub const ALL: [ZoneType; 5] = [
        ZoneType::RoofInterior,
        ZoneType::RoofEdge,
        ZoneType::RoofCorner,
        ZoneType::WallCentre,
        ZoneType::WallCorner,
    ];

    /// (Cp positive, Cp negative)
    pub fn coefficients(&self) -> (f64, f64) {
        match self {
            ZoneType::RoofInterior => (0.0, -1.0),
            ZoneType::RoofEdge => (0.0, -1.5),
            ZoneType::RoofCorner => (0.0, -2.3),
            ZoneType::WallCentre => (0.9, -0.9),
            ZoneType::WallCorner => (0.9, -1.2),
        }
    }
}

/// User selections driving the wind calculation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindSelections {
    pub terrain: Terrain,
    /// Manual Ce/Cei, required for [`Terrain::Intermediate`]
    #[serde(default)]
    pub manual_exposure: Option<f64>,
    /// Topographic factor override; 1.0 when absent
    #[serde(default)]
    pub topographic: Option<f64>,
    #[serde(default)]
    pub internal_pressure: InternalPressureCategory,
    #[serde(default)]
    pub importance: ImportanceCategory,
}

/// Per-zone wind coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindFactor {
    /// Topographic factor
    pub ct: f64,
    /// Exposure factor at the zone elevation
    pub ce: f64,
    /// Exposure factor for internal pressure
    pub cei: f64,
    /// Gust effect factor
    pub cg: f64,
}

/// Internal, external and net pressures for one limit state (kPa)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PressureSet {
    pub internal_pos: f64,
    pub internal_neg: f64,
    pub external_pos: f64,
    pub external_neg: f64,
    pub net_pos: f64,
    pub net_neg: f64,
}

/// ULS and SLS pressure sets of one zone type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZonePressure {
    pub uls: PressureSet,
    pub sls: PressureSet,
}

impl ZonePressure {
    pub fn get(&self, limit_state: LimitState) -> &PressureSet {
        match limit_state {
            LimitState::Uls => &self.uls,
            LimitState::Sls => &self.sls,
        }
    }
}

/// Pressures for all five zone types
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindPressures {
    pub roof_interior: ZonePressure,
    pub roof_edge: ZonePressure,
    pub roof_corner: ZonePressure,
    pub wall_centre: ZonePressure,
    pub wall_corner: ZonePressure,
}

impl WindPressures {
    pub fn get(&self, zone_type: ZoneType) -> &ZonePressure {
        match zone_type {
            ZoneType::RoofInterior => &self.roof_interior,
            ZoneType::RoofEdge => &self.roof_edge,
            ZoneType::RoofCorner => &self.roof_corner,
            ZoneType::WallCentre => &self.wall_centre,
            ZoneType::WallCorner => &self.wall_corner,
        }
    }
}

/// Wind result for one height zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindLoad {
    pub zone_num: u32,
    pub factor: WindFactor,
    pub pressures: WindPressures,
}

/// Exposure factor Ce at `height_m`.
///
/// `manual` is the pass-through value for [`Terrain::Intermediate`].
pub fn exposure_factor(terrain: Terrain, height_m: f64, manual: Option<f64>) -> CalcResult<f64> {
    match terrain {
        Terrain::Open => Ok((height_m / 10.0).powf(0.2).max(0.9)),
        Terrain::Rough => Ok((0.7 * (height_m / 12.0).powf(0.3)).max(0.7)),
        Terrain::Intermediate => manual_exposure(manual),
    }
}

/// Exposure factor Cei for internal pressure.
///
/// With a dominant opening on a building taller than 20 m the reference
/// height is the opening's mid-height; otherwise half the building height.
pub fn interior_exposure_factor(
    terrain: Terrain,
    building_height_m: f64,
    h_opening_m: f64,
    manual: Option<f64>,
) -> CalcResult<f64> {
    let use_opening = h_opening_m != 0.0 && building_height_m > 20.0;
    match terrain {
        Terrain::Open => Ok(if use_opening {
            (h_opening_m / 10.0).powf(0.2)
        } else {
            (building_height_m / 20.0).powf(0.2).max(0.6f64.powf(0.2))
        }),
        Terrain::Rough => Ok(if use_opening {
            0.7 * (h_opening_m / 12.0).powf(0.3)
        } else {
            (0.7 * (building_height_m / 24.0).powf(0.3)).max(0.7)
        }),
        Terrain::Intermediate => manual_exposure(manual),
    }
}

fn manual_exposure(manual: Option<f64>) -> CalcResult<f64> {
    let value = manual.ok_or_else(|| {
        CalcError::missing_parameter(
            "manual_exposure",
            "Intermediate terrain requires a manually entered exposure factor",
        )
    })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid_input(
            "manual_exposure",
            value.to_string(),
            "Exposure factor must be positive",
        ));
    }
    Ok(value)
}

/// Wind coefficients for one zone.
pub fn wind_factor(building: &Building, zone: &HeightZone, selections: &WindSelections) -> CalcResult<WindFactor> {
    let ct = selections.topographic.unwrap_or(DEFAULT_TOPOGRAPHIC_FACTOR);
    if !ct.is_finite() || ct <= 0.0 {
        return Err(CalcError::invalid_input(
            "topographic",
            ct.to_string(),
            "Topographic factor must be positive",
        ));
    }
    let ce = exposure_factor(selections.terrain, zone.elevation_m, selections.manual_exposure)?;
    let cei = interior_exposure_factor(
        selections.terrain,
        building.height_m(),
        building.h_opening_m,
        selections.manual_exposure,
    )?;
    Ok(WindFactor {
        ct,
        ce,
        cei,
        cg: GUST_FACTOR,
    })
}

fn pressure_set(
    factor: &WindFactor,
    q_kpa: f64,
    iw: f64,
    zone_type: ZoneType,
    internal: InternalPressureCategory,
) -> PressureSet {
    let internal_base = iw * q_kpa * factor.cei * factor.ct * INTERNAL_GUST_FACTOR;
    let external_base = iw * q_kpa * factor.ce * factor.ct * factor.cg;
    let (cpi_pos, cpi_neg) = internal.coefficients();
    let (cp_pos, cp_neg) = zone_type.coefficients();

    let internal_pos = internal_base * cpi_pos;
    let internal_neg = internal_base * cpi_neg;
    let external_pos = external_base * cp_pos;
    let external_neg = external_base * cp_neg;

    PressureSet {
        internal_pos,
        internal_neg,
        external_pos,
        external_neg,
        net_pos: external_pos - internal_neg,
        net_neg: external_neg - internal_pos,
    }
}

fn zone_pressure(
    factor: &WindFactor,
    location: &Location,
    selections: &WindSelections,
    zone_type: ZoneType,
) -> ZonePressure {
    let pressures_for = |limit_state| {
        pressure_set(
            factor,
            location.q_kpa,
            selections.importance.wind_factor(limit_state),
            zone_type,
            selections.internal_pressure,
        )
    };
    ZonePressure {
        uls: pressures_for(LimitState::Uls),
        sls: pressures_for(LimitState::Sls),
    }
}

/// Wind load for a single height zone.
pub fn compute_zone_wind_load(
    building: &Building,
    zone: &HeightZone,
    location: &Location,
    selections: &WindSelections,
) -> CalcResult<WindLoad> {
    let factor = wind_factor(building, zone, selections)?;
    let pressure = |zone_type| zone_pressure(&factor, location, selections, zone_type);
    let pressures = WindPressures {
        roof_interior: pressure(ZoneType::RoofInterior),
        roof_edge: pressure(ZoneType::RoofEdge),
        roof_corner: pressure(ZoneType::RoofCorner),
        wall_centre: pressure(ZoneType::WallCentre),
        wall_corner: pressure(ZoneType::WallCorner),
    };

    log::debug!(
        "wind zone {}: ce {:.4}, cei {:.4}, ct {}, wall centre net+ {:.4} kPa",
        zone.zone_num,
        factor.ce,
        factor.cei,
        factor.ct,
        pressures.wall_centre.uls.net_pos
    );

    Ok(WindLoad {
        zone_num: zone.zone_num,
        factor,
        pressures,
    })
}

/// Wind loads for every zone, bottom to top.
///
/// Attach the result with [`Building::with_wind_loads`].
pub fn compute_wind_loads(
    building: &Building,
    location: &Location,
    selections: &WindSelections,
) -> CalcResult<Vec<WindLoad>> {
    building
        .zones
        .iter()
        .map(|zone| compute_zone_wind_load(building, zone, location, selections))
        .collect()
}
