//! # Site Location and Climate Data
//!
//! [`Location`] carries the site values the load calculators consume: the
//! reference wind velocity pressure, ground snow and rain loads, and the
//! design spectral accelerations.
//!
//! Resolving an address to those values (geocoding, hazard lookups) belongs to
//! an external collaborator behind the [`LocationProvider`] trait. The crate
//! ships [`ClimateTable`], an in-memory provider for tests, the CLI, and API
//! layers that preload their own climate data.
//!
//! ## Example
//!
//! ```
//! use envelope_core::location::{ClimateRecord, ClimateTable, LocationProvider, SiteDesignationKind};
//!
//! let mut table = ClimateTable::new();
//! table.insert("Vancouver", ClimateRecord {
//!     latitude: 49.28,
//!     longitude: -123.12,
//!     q_kpa: 0.45,
//!     ss_kpa: 1.8,
//!     sr_kpa: 0.2,
//!     sa_02: 0.848,
//!     sa_10: 0.425,
//! });
//!
//! let location = table.resolve_location("vancouver ", SiteDesignationKind::Xs, "C")?;
//! assert_eq!(location.q_kpa, 0.45);
//! assert!(location.site.xv().is_none());
//! # Ok::<(), envelope_core::errors::CalcError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Seismic site class (the "Xs" designation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteClass {
    /// Hard rock
    A,
    /// Rock
    B,
    /// Very dense soil and soft rock
    C,
    /// Stiff soil
    D,
    /// Soft soil
    E,
}

impl SiteClass {
    pub const ALL: [SiteClass; 5] = [SiteClass::A, SiteClass::B, SiteClass::C, SiteClass::D, SiteClass::E];

    pub fn code(&self) -> &'static str {
        match self {
            SiteClass::A => "A",
            SiteClass::B => "B",
            SiteClass::C => "C",
            SiteClass::D => "D",
            SiteClass::E => "E",
        }
    }
}

impl fmt::Display for SiteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for SiteClass {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SiteClass::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| CalcError::invalid_input("site_class", s, "Site class must be one of A-E"))
    }
}

/// Which kind of site designation the user selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteDesignationKind {
    /// Designation from the average shear-wave velocity Vs30
    Xv,
    /// Designation from the site class
    Xs,
}

/// Site designation; exactly one of Xv and Xs exists by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SiteDesignation {
    /// Vs30-based designation (m/s)
    Xv { vs30: f64 },
    /// Site-class-based designation
    Xs { site_class: SiteClass },
}

impl SiteDesignation {
    /// Parse the user's seismic value for the selected designation kind.
    pub fn from_selection(kind: SiteDesignationKind, seismic_value: &str) -> CalcResult<Self> {
        match kind {
            SiteDesignationKind::Xv => {
                let vs30: f64 = seismic_value.trim().parse().map_err(|_| {
                    CalcError::invalid_input("vs30", seismic_value, "Vs30 must be a number in m/s")
                })?;
                if vs30 <= 0.0 {
                    return Err(CalcError::invalid_input(
                        "vs30",
                        seismic_value,
                        "Vs30 must be positive",
                    ));
                }
                Ok(SiteDesignation::Xv { vs30 })
            }
            SiteDesignationKind::Xs => Ok(SiteDesignation::Xs {
                site_class: seismic_value.parse()?,
            }),
        }
    }

    pub fn kind(&self) -> SiteDesignationKind {
        match self {
            SiteDesignation::Xv { .. } => SiteDesignationKind::Xv,
            SiteDesignation::Xs { .. } => SiteDesignationKind::Xs,
        }
    }

    /// Vs30, when the designation is Vs30-based
    pub fn xv(&self) -> Option<f64> {
        match self {
            SiteDesignation::Xv { vs30 } => Some(*vs30),
            SiteDesignation::Xs { .. } => None,
        }
    }

    /// Site class, when the designation is class-based
    pub fn xs(&self) -> Option<SiteClass> {
        match self {
            SiteDesignation::Xv { .. } => None,
            SiteDesignation::Xs { site_class } => Some(*site_class),
        }
    }
}

/// Site-derived inputs for the load calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub site: SiteDesignation,
    /// Reference wind velocity pressure q (kPa)
    pub q_kpa: f64,
    /// Ground snow load Ss (kPa)
    pub ss_kpa: f64,
    /// Associated rain load Sr (kPa)
    pub sr_kpa: f64,
    /// Design spectral acceleration Sa(0.2)
    pub sa_02: f64,
    /// Design spectral acceleration Sa(1.0)
    pub sa_10: f64,
}

/// Climate and hazard values for one address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub q_kpa: f64,
    pub ss_kpa: f64,
    pub sr_kpa: f64,
    pub sa_02: f64,
    pub sa_10: f64,
}

impl ClimateRecord {
    /// Combine with an address and site designation into a [`Location`]
    pub fn into_location(self, address: impl Into<String>, site: SiteDesignation) -> Location {
        Location {
            address: address.into(),
            latitude: self.latitude,
            longitude: self.longitude,
            site,
            q_kpa: self.q_kpa,
            ss_kpa: self.ss_kpa,
            sr_kpa: self.sr_kpa,
            sa_02: self.sa_02,
            sa_10: self.sa_10,
        }
    }
}

/// Resolves an address into site values.
///
/// Implementations wrap geocoding and hazard databases; failures to find the
/// site are reported as `LocationNotFound`.
pub trait LocationProvider {
    fn resolve_location(
        &self,
        address: &str,
        kind: SiteDesignationKind,
        seismic_value: &str,
    ) -> CalcResult<Location>;
}

/// In-memory [`LocationProvider`] keyed by case-insensitive address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimateTable {
    records: HashMap<String, ClimateRecord>,
}

impl ClimateTable {
    pub fn new() -> Self {
        ClimateTable::default()
    }

    /// Add or replace the record for an address
    pub fn insert(&mut self, address: &str, record: ClimateRecord) {
        self.records.insert(normalize_address(address), record);
    }

    /// Builder-style insert
    pub fn with_record(mut self, address: &str, record: ClimateRecord) -> Self {
        self.insert(address, record);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LocationProvider for ClimateTable {
    fn resolve_location(
        &self,
        address: &str,
        kind: SiteDesignationKind,
        seismic_value: &str,
    ) -> CalcResult<Location> {
        let record = self
            .records
            .get(&normalize_address(address))
            .copied()
            .ok_or_else(|| CalcError::location_not_found(address))?;
        let site = SiteDesignation::from_selection(kind, seismic_value)?;
        Ok(record.into_location(address.trim(), site))
    }
}

fn normalize_address(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ClimateRecord {
        ClimateRecord {
            latitude: 45.42,
            longitude: -75.69,
            q_kpa: 0.41,
            ss_kpa: 2.4,
            sr_kpa: 0.4,
            sa_02: 0.439,
            sa_10: 0.141,
        }
    }

    #[test]
    fn test_resolve_xv() {
        let table = ClimateTable::new().with_record("Ottawa,  ON", record());
        let location = table.resolve_location("ottawa, on", SiteDesignationKind::Xv, "450").unwrap();
        assert_eq!(location.site.xv(), Some(450.0));
        assert_eq!(location.site.xs(), None);
        assert_eq!(location.site.kind(), SiteDesignationKind::Xv);
        assert_eq!(location.ss_kpa, 2.4);
    }

    #[test]
    fn test_resolve_xs() {
        let table = ClimateTable::new().with_record("Ottawa", record());
        let location = table.resolve_location("Ottawa", SiteDesignationKind::Xs, "d").unwrap();
        assert_eq!(location.site.xs(), Some(SiteClass::D));
        assert_eq!(location.site.xv(), None);
    }

    #[test]
    fn test_location_not_found() {
        let table = ClimateTable::new();
        let err = table.resolve_location("Atlantis", SiteDesignationKind::Xs, "C").unwrap_err();
        assert_eq!(err.error_code(), "LOCATION_NOT_FOUND");
    }

    #[test]
    fn test_bad_seismic_values() {
        assert!(SiteDesignation::from_selection(SiteDesignationKind::Xv, "fast").is_err());
        assert!(SiteDesignation::from_selection(SiteDesignationKind::Xv, "-5").is_err());
        assert!(SiteDesignation::from_selection(SiteDesignationKind::Xs, "F").is_err());
    }

    #[test]
    fn test_site_designation_serialization() {
        let site = SiteDesignation::Xs { site_class: SiteClass::C };
        let json = serde_json::to_string(&site).unwrap();
        assert_eq!(json, r#"{"kind":"Xs","site_class":"C"}"#);
        let parsed: SiteDesignation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, site);
    }
}
