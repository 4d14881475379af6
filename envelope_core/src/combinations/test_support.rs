//! Shared fixtures for the combination tests

use crate::geometry::{build_building, build_cladding, build_dimensions, build_roof, Building, DeadLoad, ZoneLayout};
use crate::loads::snow::{SnowFactor, SnowLoad};
use crate::loads::{
    compute_seismic_loads, compute_snow_load, compute_wind_loads, DirectionalSnowLoad, SeismicFactor, SnowSelections,
    WindDirection, WindSelections,
};
use crate::location::{Location, SiteClass, SiteDesignation};

pub(crate) fn location() -> Location {
    Location {
        address: "Test".to_string(),
        latitude: 49.28,
        longitude: -123.12,
        site: SiteDesignation::Xs { site_class: SiteClass::C },
        q_kpa: 0.45,
        ss_kpa: 1.8,
        sr_kpa: 0.2,
        sa_02: 0.85,
        sa_10: 0.3,
    }
}

/// 30 m × 50 m building (zones at 20, 40, 50 m) with wind and seismic loads attached
pub(crate) fn building_with_loads() -> Building {
    let building = build_building(
        build_dimensions(30.0, Some(50.0), None, None).unwrap(),
        build_cladding(50.0, 0.0).unwrap(),
        build_roof(30.0, 60.0, 45.0, 1.2).unwrap(),
        12,
        0.0,
        ZoneLayout::Default,
        DeadLoad::Uniform(2.0),
    )
    .unwrap();
    let location = location();
    let wind = compute_wind_loads(&building, &location, &WindSelections::default()).unwrap();
    let building = building.with_wind_loads(wind).unwrap();
    let snow = directional_snow(&building);
    let seismic = compute_seismic_loads(
        &building,
        &location,
        Default::default(),
        SeismicFactor::default(),
        Some(&snow.upwind),
    )
    .unwrap();
    building.with_seismic_loads(seismic).unwrap()
}

pub(crate) fn directional_snow(building: &Building) -> DirectionalSnowLoad {
    compute_snow_load(building, &location(), &SnowSelections::default()).unwrap()
}

/// Manual snow load with distinct ULS and SLS values
pub(crate) fn snow_load() -> SnowLoad {
    SnowLoad {
        direction: WindDirection::Upwind,
        factor: SnowFactor { cs: 1.0, ca: 1.0, cw: 1.0, cb: 0.8 },
        s_uls: 1.6,
        s_sls: 1.2,
        manual: true,
    }
}

/// Light snow load, small enough to hit the companion floors
pub(crate) fn light_snow_load() -> SnowLoad {
    SnowLoad {
        s_uls: 0.4,
        s_sls: 0.2,
        ..snow_load()
    }
}
