//! # envelope_core - Building Envelope Design Loads
//!
//! `envelope_core` computes the wind, snow and seismic loads acting on a
//! building's envelope (walls and roof) and combines them into the ultimate
//! and serviceability limit state tables used to design cladding and roofing.
//! Every input and output is JSON-serializable so API, spreadsheet and
//! visualization layers can consume the results directly.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: calculators are pure functions of their explicit inputs
//! - **JSON-First**: all value objects implement Serialize/Deserialize
//! - **Rich Errors**: structured [`CalcError`] variants, not strings
//!
//! ## Workflow
//!
//! ```text
//! build_building ─► compute_wind_loads ─► Building::with_wind_loads
//!                ─► compute_snow_load (upwind + downwind)
//!                ─► compute_seismic_loads ─► Building::with_seismic_loads
//!                ─► compute_wall_combination / compute_roof_combination
//!                   (or evaluate_all for every supported pair)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use envelope_core::combinations::{compute_wall_combination, SlsCombination, UlsCombination};
//! use envelope_core::geometry::{build_building, build_cladding, build_dimensions, build_roof, DeadLoad, ZoneLayout};
//! use envelope_core::loads::{
//!     compute_seismic_loads, compute_snow_load, compute_wind_loads, ImportanceCategory, SeismicFactor,
//!     SnowSelections, WindSelections,
//! };
//! use envelope_core::location::{Location, SiteClass, SiteDesignation};
//!
//! let building = build_building(
//!     build_dimensions(30.0, Some(50.0), None, None)?,
//!     build_cladding(50.0, 0.0)?,
//!     build_roof(30.0, 60.0, 45.0, 1.2)?,
//!     12,
//!     0.0,
//!     ZoneLayout::Default,
//!     DeadLoad::Uniform(2.0),
//! )?;
//! let location = Location {
//!     address: "Vancouver".to_string(),
//!     latitude: 49.28,
//!     longitude: -123.12,
//!     site: SiteDesignation::Xs { site_class: SiteClass::C },
//!     q_kpa: 0.45,
//!     ss_kpa: 1.8,
//!     sr_kpa: 0.2,
//!     sa_02: 0.85,
//!     sa_10: 0.3,
//! };
//!
//! let wind = compute_wind_loads(&building, &location, &WindSelections::default())?;
//! let building = building.with_wind_loads(wind)?;
//! let snow = compute_snow_load(&building, &location, &SnowSelections::default())?;
//! let seismic = compute_seismic_loads(
//!     &building,
//!     &location,
//!     ImportanceCategory::Normal,
//!     SeismicFactor::default(),
//!     Some(&snow.upwind),
//! )?;
//! let building = building.with_seismic_loads(seismic)?;
//!
//! let table = compute_wall_combination(&building, &snow.upwind, UlsCombination::DeadWind, SlsCombination::Wind)?;
//! assert_eq!(table.row_count(), 3);
//! # Ok::<(), envelope_core::errors::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Building, cladding, roof and height zones
//! - [`location`] - Site climate and seismic data, location providers
//! - [`loads`] - Wind, snow and seismic calculators
//! - [`combinations`] - Wall and roof load combination tables
//! - [`session`] - Per-user analysis state and session stores
//! - [`errors`] - Structured error types
//! - [`file_io`] - Session files with atomic saves and locking

pub mod combinations;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod geometry;
pub mod loads;
pub mod location;
pub mod session;

// Re-export commonly used types at crate root for convenience
pub use combinations::{evaluate_all, CombinationTable, SlsCombination, Surface, UlsCombination};
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_session, save_session, FileLock, FileSessionStore};
pub use geometry::Building;
pub use location::{Location, LocationProvider};
pub use session::{AnalysisSettings, MemorySessionStore, Session, SessionStore};
