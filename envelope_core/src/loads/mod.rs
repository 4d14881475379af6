//! Wind, snow and seismic loads on the building envelope
//!
//! Each calculator is a pure function of the geometry, the site
//! [`Location`](crate::location::Location) and the user's factor selections:
//!
//! - [`wind`] - per-zone exposure factors and the five zone-type pressure sets
//! - [`snow`] - upwind and downwind roof snow loads
//! - [`seismic`] - per-zone height factors and lateral forces
//!
//! The shared selections live here: [`ImportanceCategory`] (which scales all
//! three loads through its importance factors), [`Terrain`] and
//! [`WindDirection`].
//!
//! # Importance factors
//!
//! | Category     | Iw ULS | Iw SLS | Is ULS | Is SLS | Ie  |
//! |--------------|--------|--------|--------|--------|-----|
//! | Low          | 0.80   | 0.75   | 0.80   | 0.90   | 0.8 |
//! | Normal       | 1.00   | 0.75   | 1.00   | 0.90   | 1.0 |
//! | High         | 1.15   | 0.75   | 1.15   | 0.90   | 1.3 |
//! | PostDisaster | 1.25   | 0.75   | 1.25   | 0.90   | 1.5 |

pub mod seismic;
pub mod snow;
pub mod wind;

pub use seismic::{compute_seismic_loads, SeismicFactor, SeismicLoad};
pub use snow::{compute_snow_load, AccumulationMode, DirectionalSnowLoad, RoofSurface, SnowFactor, SnowLoad, SnowSelections};
pub use wind::{
    compute_wind_loads, compute_zone_wind_load, InternalPressureCategory, PressureSet, WindFactor,
    WindLoad, WindPressures, WindSelections, ZonePressure,
};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Limit state a load value is evaluated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitState {
    /// Ultimate limit state (strength)
    Uls,
    /// Serviceability limit state (deflection, vibration)
    Sls,
}

/// Importance category of the building
///
/// # Example
/// ```
/// use envelope_core::loads::{ImportanceCategory, LimitState};
///
/// let cat = ImportanceCategory::High;
/// assert_eq!(cat.wind_factor(LimitState::Uls), 1.15);
/// assert_eq!(cat.snow_factor(LimitState::Sls), 0.9);
/// assert_eq!(cat.seismic_factor(), 1.3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImportanceCategory {
    /// Low human-occupancy buildings (farm buildings, minor storage)
    Low,
    /// Typical buildings
    #[default]
    Normal,
    /// Schools, community centres, and other shelters
    High,
    /// Hospitals, emergency response facilities
    PostDisaster,
}

impl ImportanceCategory {
    pub const ALL: [ImportanceCategory; 4] = [
        ImportanceCategory::Low,
        ImportanceCategory::Normal,
        ImportanceCategory::High,
        ImportanceCategory::PostDisaster,
    ];

    /// Wind importance factor Iw
    pub fn wind_factor(&self, limit_state: LimitState) -> f64 {
        match limit_state {
            LimitState::Sls => 0.75,
            LimitState::Uls => self.uls_climatic_factor(),
        }
    }

    /// Snow importance factor Is
    pub fn snow_factor(&self, limit_state: LimitState) -> f64 {
        match limit_state {
            LimitState::Sls => 0.9,
            LimitState::Uls => self.uls_climatic_factor(),
        }
    }

    /// Seismic importance factor Ie
    pub fn seismic_factor(&self) -> f64 {
        match self {
            ImportanceCategory::Low => 0.8,
            ImportanceCategory::Normal => 1.0,
            ImportanceCategory::High => 1.3,
            ImportanceCategory::PostDisaster => 1.5,
        }
    }

    /// Low and Normal buildings get the reduced snow exposure factor
    pub fn is_low_or_normal(&self) -> bool {
        matches!(self, ImportanceCategory::Low | ImportanceCategory::Normal)
    }

    fn uls_climatic_factor(&self) -> f64 {
        match self {
            ImportanceCategory::Low => 0.8,
            ImportanceCategory::Normal => 1.0,
            ImportanceCategory::High => 1.15,
            ImportanceCategory::PostDisaster => 1.25,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ImportanceCategory::Low => "Low",
            ImportanceCategory::Normal => "Normal",
            ImportanceCategory::High => "High",
            ImportanceCategory::PostDisaster => "Post-disaster",
        }
    }
}

impl fmt::Display for ImportanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Terrain exposure selection shared by the wind and snow calculators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Open terrain (level, few obstructions, open water)
    #[default]
    Open,
    /// Rough terrain (suburban, urban, wooded)
    Rough,
    /// Transitional terrain; wind exposure is entered manually
    Intermediate,
}

impl Terrain {
    pub const ALL: [Terrain; 3] = [Terrain::Open, Terrain::Rough, Terrain::Intermediate];
}

/// Wind direction relative to the roof for snow accumulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WindDirection {
    Upwind,
    Downwind,
}

impl WindDirection {
    pub const ALL: [WindDirection; 2] = [WindDirection::Upwind, WindDirection::Downwind];

    pub fn code(&self) -> &'static str {
        match self {
            WindDirection::Upwind => "upwind",
            WindDirection::Downwind => "downwind",
        }
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
