//! # Session State
//!
//! A `Session` holds one user's analysis inputs and intermediate results
//! between requests. The core never owns sessions; callers keep them in a
//! [`SessionStore`] keyed by a session or user identifier.
//!
//! ## Structure
//!
//! ```text
//! Session
//! ├── meta: SessionMetadata (id, version, user, timestamps)
//! ├── settings: AnalysisSettings (code, zone step, workers, accumulation)
//! ├── building: Option<Building> (zones carry their wind/seismic loads)
//! ├── location: Option<Location>
//! └── snow: Option<DirectionalSnowLoad>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use envelope_core::session::{MemorySessionStore, Session, SessionStore};
//!
//! let store = MemorySessionStore::new();
//! let session = Session::new("jdoe");
//! store.set("jdoe", &session)?;
//!
//! let loaded = store.get("jdoe")?.unwrap();
//! assert_eq!(loaded.meta.id, session.meta.id);
//! # Ok::<(), envelope_core::errors::CalcError>(())
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::geometry::{Building, DEFAULT_ZONE_STEP_M};
use crate::loads::snow::{AccumulationMode, DirectionalSnowLoad};
use crate::location::Location;

/// Current schema version for session files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Default batch worker count
pub const DEFAULT_WORKERS: usize = 4;

/// Per-user analysis state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub meta: SessionMetadata,

    #[serde(default)]
    pub settings: AnalysisSettings,

    #[serde(default)]
    pub building: Option<Building>,

    #[serde(default)]
    pub location: Option<Location>,

    /// Upwind and downwind roof snow loads
    #[serde(default)]
    pub snow: Option<DirectionalSnowLoad>,
}

impl Session {
    /// Create an empty session for a user.
    pub fn new(user: impl Into<String>) -> Self {
        let now = Utc::now();
        Session {
            meta: SessionMetadata {
                id: Uuid::new_v4(),
                version: SCHEMA_VERSION.to_string(),
                user: user.into(),
                created: now,
                modified: now,
            },
            settings: AnalysisSettings::default(),
            building: None,
            location: None,
            snow: None,
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn set_building(&mut self, building: Building) {
        self.building = Some(building);
        self.touch();
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
        self.touch();
    }

    pub fn set_snow(&mut self, snow: DirectionalSnowLoad) {
        self.snow = Some(snow);
        self.touch();
    }

    /// Building and snow loads needed by the combination step.
    ///
    /// Zone-level wind and seismic loads are checked by the combinations themselves.
    pub fn combination_inputs(&self) -> CalcResult<(&Building, &DirectionalSnowLoad)> {
        let building = self
            .building
            .as_ref()
            .ok_or_else(|| CalcError::missing_parameter("building", "no building in session"))?;
        let snow = self
            .snow
            .as_ref()
            .ok_or_else(|| CalcError::missing_building_load("snow"))?;
        Ok((building, snow))
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new("")
    }
}

/// Session metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: Uuid,

    /// Schema version (for migration compatibility)
    pub version: String,

    /// Owner of the session
    pub user: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Analysis-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Design code edition label
    pub code: String,

    /// Default height zone step (m)
    pub zone_step_m: f64,

    /// Worker threads for batch combination evaluation
    pub workers: usize,

    /// Snow accumulation factor selection
    pub accumulation: AccumulationMode,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            code: "NBC 2015".to_string(),
            zone_step_m: DEFAULT_ZONE_STEP_M,
            workers: DEFAULT_WORKERS,
            accumulation: AccumulationMode::default(),
        }
    }
}

/// Keyed session persistence.
pub trait SessionStore {
    fn get(&self, key: &str) -> CalcResult<Option<Session>>;

    fn set(&self, key: &str, session: &Session) -> CalcResult<()>;

    /// Returns whether a session was removed
    fn remove(&self, key: &str) -> CalcResult<bool>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CalcError {
    CalcError::Internal {
        message: "session store lock poisoned".to_string(),
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> CalcResult<Option<Session>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(key).cloned())
    }

    fn set(&self, key: &str, session: &Session) -> CalcResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(key.to_string(), session.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> CalcResult<bool> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        Ok(sessions.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = Session::new("jdoe");
        assert_eq!(session.meta.user, "jdoe");
        assert_eq!(session.meta.version, SCHEMA_VERSION);
        assert_eq!(session.settings.code, "NBC 2015");
        assert_eq!(session.settings.workers, 4);
        assert!(session.building.is_none());
    }

    #[test]
    fn test_session_serialization() {
        let session = Session::new("jdoe");
        let json = serde_json::to_string_pretty(&session).unwrap();
        assert!(json.contains("NBC 2015"));

        let roundtrip: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, session);
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: AnalysisSettings = serde_json::from_str(r#"{"workers": 8}"#).unwrap();
        assert_eq!(settings.workers, 8);
        assert_eq!(settings.zone_step_m, 20.0);
        assert_eq!(settings.accumulation, AccumulationMode::Uniform);
    }

    #[test]
    fn test_touch_updates_modified() {
        let mut session = Session::new("jdoe");
        let before = session.meta.modified;
        std::thread::sleep(std::time::Duration::from_millis(2));
        session.touch();
        assert!(session.meta.modified > before);
        assert_eq!(session.meta.created, before);
    }

    #[test]
    fn test_combination_inputs_missing() {
        let session = Session::new("jdoe");
        let err = session.combination_inputs().unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
    }

    #[test]
    fn test_combination_inputs_without_snow() {
        let mut session = Session::new("jdoe");
        session.set_building(crate::combinations::test_support::building_with_loads());
        let err = session.combination_inputs().unwrap_err();
        assert_eq!(err.error_code(), "MISSING_LOAD_DATA");
        assert_eq!(
            err,
            CalcError::MissingLoadData {
                load: "snow".to_string(),
                zone_num: None,
            }
        );
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert!(store.is_empty());
        assert!(store.get("a").unwrap().is_none());

        let mut session = Session::new("a");
        store.set("a", &session).unwrap();
        session.settings.workers = 2;
        store.set("a", &session).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().unwrap().settings.workers, 2);

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
    }
}
