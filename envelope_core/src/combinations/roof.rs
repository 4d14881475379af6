//! Roof combinations: a single row built from the top height zone's wind and
//! seismic loads and the roof's own dead load.
//!
//! Companion terms carry the code minimums: the ULS wind companion snow is at
//! least 1.0 kPa, the seismic companion snow adds 1.0 kPa, and the SLS
//! companions are at least 0.35 kPa.
//!
//! The seismic term is recomputed from the snow load of the direction being
//! evaluated, so upwind and downwind tables never mix directions.

use once_cell::sync::Lazy;

use super::table::CombinationTable;
use super::{build_table, lookup, FormulaTable, SlsCombination, Surface, TermContext, TermFn, Terms, UlsCombination};
use crate::errors::CalcResult;
use crate::geometry::Building;
use crate::loads::snow::SnowLoad;
use crate::loads::wind::{PressureSet, WindLoad};

/// Minimum companion snow in wind-led ULS combinations (kPa)
pub const ULS_COMPANION_SNOW_MIN: f64 = 1.0;

/// Offset added to the companion snow in seismic combinations (kPa)
pub const SEISMIC_COMPANION_SNOW_OFFSET: f64 = 1.0;

/// Minimum companion term in SLS combinations (kPa)
pub const SLS_COMPANION_MIN: f64 = 0.35;

/// Roof dispatch table (5 ULS × 4 SLS)
pub static ROOF_FORMULAS: Lazy<FormulaTable> = Lazy::new(|| build_table(Surface::Roof, roof_uls, roof_sls));

fn roof_uls(uls: UlsCombination) -> TermFn {
    match uls {
        UlsCombination::DeadOnly => dead_only,
        UlsCombination::DeadSnow => dead_snow,
        UlsCombination::DeadWind => dead_wind,
        UlsCombination::UpliftWind => uplift_wind,
        UlsCombination::DeadSeismic => dead_seismic,
    }
}

fn roof_sls(sls: SlsCombination) -> Option<TermFn> {
    Some(match sls {
        SlsCombination::Dead => sls_dead,
        SlsCombination::Snow => sls_snow,
        SlsCombination::Wind => sls_wind,
        SlsCombination::WindSuction => sls_wind_suction,
    })
}

/// Pressure sets at the interior, edge and corner positions
fn positions<'a>(ctx: &TermContext<'a>, uls: bool) -> [&'a PressureSet; 3] {
    let wind: &'a WindLoad = ctx.wind;
    let p = &wind.pressures;
    if uls {
        [&p.roof_interior.uls, &p.roof_edge.uls, &p.roof_corner.uls]
    } else {
        [&p.roof_interior.sls, &p.roof_edge.sls, &p.roof_corner.sls]
    }
}

fn dead_only(ctx: &TermContext<'_>) -> Terms {
    vec![("uls 1.4D", 1.4 * ctx.wp)]
}

fn dead_snow(ctx: &TermContext<'_>) -> Terms {
    let [interior, edge, corner] = positions(ctx, true);
    vec![
        ("uls 1.25D", 1.25 * ctx.wp),
        ("uls 1.5S", 1.5 * ctx.snow.s_uls),
        ("uls 0.4W(interior)", 0.4 * interior.net_pos),
        ("uls 0.4W(edge)", 0.4 * edge.net_pos),
        ("uls 0.4W(corner)", 0.4 * corner.net_pos),
    ]
}

fn dead_wind(ctx: &TermContext<'_>) -> Terms {
    let [interior, edge, corner] = positions(ctx, true);
    vec![
        ("uls 1.25D", 1.25 * ctx.wp),
        ("uls 1.4W(interior)", interior.net_pos),
        ("uls 1.4W(edge)", edge.net_pos),
        ("uls 1.4W(corner)", corner.net_pos),
        ("uls 0.5S", (0.5 * ctx.snow.s_uls).max(ULS_COMPANION_SNOW_MIN)),
    ]
}

fn uplift_wind(ctx: &TermContext<'_>) -> Terms {
    let [interior, edge, corner] = positions(ctx, true);
    vec![
        ("uls 0.9D", 0.9 * ctx.wp),
        ("uls 1.4W(interior)", interior.net_neg),
        ("uls 1.4W(edge)", edge.net_neg),
        ("uls 1.4W(corner)", corner.net_neg),
    ]
}

fn dead_seismic(ctx: &TermContext<'_>) -> Terms {
    vec![
        ("uls 1.0D", ctx.wp),
        ("uls 1.0E", ctx.seismic.vp_with_snow(ctx.snow.s_uls)),
        ("uls 0.25S", 0.25 * ctx.snow.s_uls + SEISMIC_COMPANION_SNOW_OFFSET),
    ]
}

fn sls_dead(ctx: &TermContext<'_>) -> Terms {
    vec![("sls 1.0D", ctx.wp)]
}

fn sls_snow(ctx: &TermContext<'_>) -> Terms {
    let [interior, edge, corner] = positions(ctx, false);
    vec![
        ("sls 1.0S", ctx.snow.s_sls),
        ("sls 0.3W(interior)", (0.3 * interior.net_pos).max(SLS_COMPANION_MIN)),
        ("sls 0.3W(edge)", (0.3 * edge.net_pos).max(SLS_COMPANION_MIN)),
        ("sls 0.3W(corner)", (0.3 * corner.net_pos).max(SLS_COMPANION_MIN)),
    ]
}

fn sls_wind(ctx: &TermContext<'_>) -> Terms {
    let [interior, edge, corner] = positions(ctx, false);
    vec![
        ("sls 1.0W(interior)", interior.net_pos),
        ("sls 1.0W(edge)", edge.net_pos),
        ("sls 1.0W(corner)", corner.net_pos),
        ("sls 0.35S", (0.35 * ctx.snow.s_sls).max(SLS_COMPANION_MIN)),
    ]
}

fn sls_wind_suction(ctx: &TermContext<'_>) -> Terms {
    let [interior, edge, corner] = positions(ctx, false);
    vec![
        ("sls 1.0W suction(interior)", interior.net_neg),
        ("sls 1.0W suction(edge)", edge.net_neg),
        ("sls 1.0W suction(corner)", corner.net_neg),
    ]
}

/// Roof combination table for one snow load direction.
///
/// Pass the upwind or downwind [`SnowLoad`] to get that direction's table.
pub fn compute_roof_combination(
    building: &Building,
    snow: &SnowLoad,
    uls: UlsCombination,
    sls: SlsCombination,
) -> CalcResult<CombinationTable> {
    let formula = lookup(&ROOF_FORMULAS, Surface::Roof, uls, sls)?;

    let top = building.top_zone()?;
    let wind = top.wind_load()?;
    let seismic = top.seismic_load()?;
    let ctx = TermContext {
        wp: building.roof.wp_kpa,
        wind,
        seismic,
        snow,
    };

    let mut terms: Terms = vec![
        ("xn", building.zone_extent_m(top.zone_num).unwrap_or(top.elevation_m)),
        ("hx", top.elevation_m),
        ("ce", wind.factor.ce),
        ("ax", seismic.ax),
    ];
    terms.extend(formula.evaluate(&ctx));

    log::debug!(
        "roof combination ({}, {}) {} from zone {}",
        uls.code(),
        sls.code(),
        snow.direction,
        top.zone_num
    );

    Ok(CombinationTable::from_rows(
        Surface::Roof,
        uls,
        sls,
        snow.direction,
        vec![(top.zone_num, terms)],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinations::test_support::{building_with_loads, light_snow_load, location, snow_load};
    use crate::loads::{compute_snow_load, AccumulationMode, SnowSelections};

    #[test]
    fn test_single_row_from_top_zone() {
        let building = building_with_loads();
        let table = compute_roof_combination(&building, &snow_load(), UlsCombination::DeadOnly, SlsCombination::Dead)
            .unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.zone_nums, vec![3]);
        assert_eq!(table.get(0, "hx"), Some(50.0));
        assert!((table.get(0, "uls 1.4D").unwrap() - 1.4 * 1.2).abs() < 1e-12);
        assert!((table.get(0, "sls 1.0D").unwrap() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_dead_wind_terms() {
        let building = building_with_loads();
        let snow = snow_load();
        let table =
            compute_roof_combination(&building, &snow, UlsCombination::DeadWind, SlsCombination::Wind).unwrap();
        let p = &building.zone(3).unwrap().wind.as_ref().unwrap().pressures;
        assert!((table.get(0, "uls 1.4W(interior)").unwrap() - p.roof_interior.uls.net_pos).abs() < 1e-12);
        assert!((table.get(0, "uls 1.4W(corner)").unwrap() - p.roof_corner.uls.net_pos).abs() < 1e-12);
        assert!((table.get(0, "sls 1.0W(edge)").unwrap() - p.roof_edge.sls.net_pos).abs() < 1e-12);
        // 0.5 * 1.6 = 0.8, floored to 1.0
        assert!((table.get(0, "uls 0.5S").unwrap() - 1.0).abs() < 1e-12);
        // 0.35 * 1.2 = 0.42 is above the floor
        assert!((table.get(0, "sls 0.35S").unwrap() - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_companion_floors() {
        let building = building_with_loads();
        let snow = light_snow_load();
        let table =
            compute_roof_combination(&building, &snow, UlsCombination::DeadWind, SlsCombination::Wind).unwrap();
        assert!((table.get(0, "uls 0.5S").unwrap() - ULS_COMPANION_SNOW_MIN).abs() < 1e-12);
        assert!((table.get(0, "sls 0.35S").unwrap() - SLS_COMPANION_MIN).abs() < 1e-12);

        let heavy = SnowLoad { s_uls: 4.0, ..snow };
        let table =
            compute_roof_combination(&building, &heavy, UlsCombination::DeadWind, SlsCombination::Wind).unwrap();
        assert!((table.get(0, "uls 0.5S").unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sls_snow_wind_companion() {
        let building = building_with_loads();
        let snow = snow_load();
        let table =
            compute_roof_combination(&building, &snow, UlsCombination::DeadSnow, SlsCombination::Snow).unwrap();
        let p = &building.zone(3).unwrap().wind.as_ref().unwrap().pressures;
        for (column, set) in [
            ("sls 0.3W(interior)", &p.roof_interior.sls),
            ("sls 0.3W(edge)", &p.roof_edge.sls),
            ("sls 0.3W(corner)", &p.roof_corner.sls),
        ] {
            let expected = (0.3 * set.net_pos).max(SLS_COMPANION_MIN);
            assert!((table.get(0, column).unwrap() - expected).abs() < 1e-12);
            assert!(table.get(0, column).unwrap() >= SLS_COMPANION_MIN);
        }
        assert!((table.get(0, "sls 1.0S").unwrap() - 1.2).abs() < 1e-12);
        assert!((table.get(0, "uls 1.5S").unwrap() - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_seismic_offset() {
        let building = building_with_loads();
        let snow = snow_load();
        let table = compute_roof_combination(&building, &snow, UlsCombination::DeadSeismic, SlsCombination::WindSuction)
            .unwrap();
        let seismic = building.zone(3).unwrap().seismic.as_ref().unwrap();
        assert!((table.get(0, "uls 1.0E").unwrap() - seismic.vp_with_snow(1.6)).abs() < 1e-12);
        assert!((table.get(0, "uls 0.25S").unwrap() - (0.25 * 1.6 + 1.0)).abs() < 1e-12);
        assert!((table.get(0, "ax").unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_direction_recorded() {
        let building = building_with_loads();
        let snow = crate::combinations::test_support::directional_snow(&building);
        let up = compute_roof_combination(&building, &snow.upwind, UlsCombination::DeadSnow, SlsCombination::Snow)
            .unwrap();
        let down = compute_roof_combination(&building, &snow.downwind, UlsCombination::DeadSnow, SlsCombination::Snow)
            .unwrap();
        assert_eq!(up.direction, crate::loads::WindDirection::Upwind);
        assert_eq!(down.direction, crate::loads::WindDirection::Downwind);
        assert_eq!(up.columns, down.columns);
    }

    #[test]
    fn test_seismic_term_follows_snow_direction() {
        let building = building_with_loads();
        let selections = SnowSelections {
            accumulation: AccumulationMode::Directional {
                upwind: 1.0,
                downwind: 2.0,
            },
            ..SnowSelections::default()
        };
        let snow = compute_snow_load(&building, &location(), &selections).unwrap();
        assert!(snow.downwind.s_uls > snow.upwind.s_uls);

        let seismic = *building.zone(3).unwrap().seismic.as_ref().unwrap();
        for load in [&snow.upwind, &snow.downwind] {
            let table =
                compute_roof_combination(&building, load, UlsCombination::DeadSeismic, SlsCombination::Dead).unwrap();
            let expected = 0.3 * seismic.sa_02 * seismic.ie * (load.s_uls + seismic.wp_kpa);
            assert!((table.get(0, "uls 1.0E").unwrap() - expected).abs() < 1e-12);
            assert!((table.get(0, "uls 0.25S").unwrap() - (0.25 * load.s_uls + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_every_pair_supported() {
        let building = building_with_loads();
        for uls in UlsCombination::ALL {
            for sls in SlsCombination::ALL {
                let table = compute_roof_combination(&building, &snow_load(), uls, sls).unwrap();
                assert_eq!(table.row_count(), 1);
                assert_eq!(&table.columns[..4], &["xn", "hx", "ce", "ax"]);
            }
        }
    }
}
