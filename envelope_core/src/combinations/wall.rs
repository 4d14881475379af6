//! Wall combinations: one row per height zone, top zone first.
//!
//! The centre column uses the wall centre pressures and the edge column the
//! wall corner pressures of each zone.

use once_cell::sync::Lazy;

use super::table::CombinationTable;
use super::{build_table, lookup, FormulaTable, SlsCombination, Surface, TermContext, TermFn, Terms, UlsCombination};
use crate::errors::CalcResult;
use crate::geometry::Building;
use crate::loads::snow::SnowLoad;

/// Wall dispatch table (5 ULS × 2 SLS)
pub static WALL_FORMULAS: Lazy<FormulaTable> = Lazy::new(|| build_table(Surface::Wall, wall_uls, wall_sls));

fn wall_uls(uls: UlsCombination) -> TermFn {
    match uls {
        UlsCombination::DeadOnly => dead_only,
        UlsCombination::DeadSnow => dead_snow,
        UlsCombination::DeadWind => dead_wind,
        UlsCombination::UpliftWind => uplift_wind,
        UlsCombination::DeadSeismic => dead_seismic,
    }
}

fn wall_sls(sls: SlsCombination) -> Option<TermFn> {
    match sls {
        SlsCombination::Wind => Some(sls_wind),
        SlsCombination::WindSuction => Some(sls_wind_suction),
        SlsCombination::Dead | SlsCombination::Snow => None,
    }
}

fn dead_only(ctx: &TermContext<'_>) -> Terms {
    vec![("uls 1.4D", 1.4 * ctx.wp)]
}

fn dead_snow(ctx: &TermContext<'_>) -> Terms {
    let p = &ctx.wind.pressures;
    vec![
        ("uls 1.25D", 1.25 * ctx.wp),
        ("uls 1.5S", 1.5 * ctx.snow.s_uls),
        ("uls 0.4W(centre)", 0.4 * p.wall_centre.uls.net_pos),
        ("uls 0.4W(edge)", 0.4 * p.wall_corner.uls.net_pos),
    ]
}

fn dead_wind(ctx: &TermContext<'_>) -> Terms {
    let p = &ctx.wind.pressures;
    vec![
        ("uls 1.25D", 1.25 * ctx.wp),
        ("uls 1.4W(centre)", p.wall_centre.uls.net_pos),
        ("uls 1.4W(edge)", p.wall_corner.uls.net_pos),
        ("uls 0.5S", 0.5 * ctx.snow.s_uls),
    ]
}

fn uplift_wind(ctx: &TermContext<'_>) -> Terms {
    let p = &ctx.wind.pressures;
    vec![
        ("uls 0.9D", 0.9 * ctx.wp),
        ("uls 1.4W(centre)", p.wall_centre.uls.net_neg),
        ("uls 1.4W(edge)", p.wall_corner.uls.net_neg),
    ]
}

fn dead_seismic(ctx: &TermContext<'_>) -> Terms {
    vec![
        ("uls 1.0D", ctx.wp),
        ("uls 1.0E", ctx.seismic.vp),
        ("uls 0.25S", 0.25 * ctx.snow.s_uls),
    ]
}

fn sls_wind(ctx: &TermContext<'_>) -> Terms {
    let p = &ctx.wind.pressures;
    vec![
        ("sls 1.0W(centre)", p.wall_centre.sls.net_pos),
        ("sls 1.0W(edge)", p.wall_corner.sls.net_pos),
    ]
}

fn sls_wind_suction(ctx: &TermContext<'_>) -> Terms {
    let p = &ctx.wind.pressures;
    vec![
        ("sls 1.0W suction(centre)", p.wall_centre.sls.net_neg),
        ("sls 1.0W suction(edge)", p.wall_corner.sls.net_neg),
    ]
}

/// Wall combination table for one snow load direction.
///
/// Every zone must carry its wind and seismic loads
/// (`MissingLoadData` otherwise). Unsupported pairs such as
/// `(DeadOnly, Dead)` fail with `UnsupportedCombination`.
pub fn compute_wall_combination(
    building: &Building,
    snow: &SnowLoad,
    uls: UlsCombination,
    sls: SlsCombination,
) -> CalcResult<CombinationTable> {
    let formula = lookup(&WALL_FORMULAS, Surface::Wall, uls, sls)?;

    let mut zones: Vec<_> = building.zones.iter().collect();
    zones.sort_by(|a, b| b.zone_num.cmp(&a.zone_num));

    let mut rows = Vec::with_capacity(zones.len());
    for zone in zones {
        let wind = zone.wind_load()?;
        let seismic = zone.seismic_load()?;
        let ctx = TermContext {
            wp: building.wp_kpa,
            wind,
            seismic,
            snow,
        };

        let mut terms: Terms = vec![
            ("xn", building.zone_extent_m(zone.zone_num).unwrap_or(zone.elevation_m)),
            ("hx", zone.elevation_m),
            ("ce", wind.factor.ce),
            ("ax", seismic.ax),
        ];
        terms.extend(formula.evaluate(&ctx));
        rows.push((zone.zone_num, terms));
    }

    log::debug!(
        "wall combination ({}, {}) {}: {} rows",
        uls.code(),
        sls.code(),
        snow.direction,
        rows.len()
    );

    Ok(CombinationTable::from_rows(Surface::Wall, uls, sls, snow.direction, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinations::test_support::{building_with_loads, snow_load};
    use crate::geometry::{build_building, build_cladding, build_dimensions, build_roof, DeadLoad, ZoneLayout};

    #[test]
    fn test_rows_descend_by_zone() {
        let building = building_with_loads();
        let table = compute_wall_combination(&building, &snow_load(), UlsCombination::DeadWind, SlsCombination::Wind)
            .unwrap();
        assert_eq!(table.zone_nums, vec![3, 2, 1]);
        assert_eq!(table.column("hx").unwrap(), vec![50.0, 40.0, 20.0]);
        assert_eq!(table.column("xn").unwrap(), vec![10.0, 20.0, 20.0]);
    }

    #[test]
    fn test_dead_wind_terms() {
        let building = building_with_loads();
        let snow = snow_load();
        let table =
            compute_wall_combination(&building, &snow, UlsCombination::DeadWind, SlsCombination::Wind).unwrap();
        assert_eq!(
            table.columns,
            vec![
                "xn",
                "hx",
                "ce",
                "ax",
                "uls 1.25D",
                "uls 1.4W(centre)",
                "uls 1.4W(edge)",
                "uls 0.5S",
                "sls 1.0W(centre)",
                "sls 1.0W(edge)",
            ]
        );

        let top = building.zone(3).unwrap();
        let wind = top.wind.as_ref().unwrap();
        assert!((table.get(0, "uls 1.25D").unwrap() - 1.25 * building.wp_kpa).abs() < 1e-12);
        assert!((table.get(0, "uls 1.4W(centre)").unwrap() - wind.pressures.wall_centre.uls.net_pos).abs() < 1e-12);
        assert!((table.get(0, "uls 1.4W(edge)").unwrap() - wind.pressures.wall_corner.uls.net_pos).abs() < 1e-12);
        assert!((table.get(0, "uls 0.5S").unwrap() - 0.5 * snow.s_uls).abs() < 1e-12);
        assert!((table.get(0, "ce").unwrap() - wind.factor.ce).abs() < 1e-12);
        assert!((table.get(0, "ax").unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_seismic_terms() {
        let building = building_with_loads();
        let snow = snow_load();
        let table = compute_wall_combination(&building, &snow, UlsCombination::DeadSeismic, SlsCombination::WindSuction)
            .unwrap();
        let zone2 = building.zone(2).unwrap();
        let vp = zone2.seismic.as_ref().unwrap().vp;
        assert!((table.get_zone(2, "uls 1.0E").unwrap() - vp).abs() < 1e-12);
        assert!((table.get_zone(2, "uls 0.25S").unwrap() - 0.25 * snow.s_uls).abs() < 1e-12);
        let suction = zone2.wind.as_ref().unwrap().pressures.wall_corner.sls.net_neg;
        assert!((table.get_zone(2, "sls 1.0W suction(edge)").unwrap() - suction).abs() < 1e-12);
    }

    #[test]
    fn test_dead_only() {
        let building = building_with_loads();
        let table = compute_wall_combination(&building, &snow_load(), UlsCombination::DeadOnly, SlsCombination::Wind)
            .unwrap();
        assert!(table.column("uls 1.4D").unwrap().iter().all(|v| (v - 1.4 * building.wp_kpa).abs() < 1e-12));
    }

    #[test]
    fn test_unsupported_pair() {
        let building = building_with_loads();
        let err = compute_wall_combination(&building, &snow_load(), UlsCombination::DeadOnly, SlsCombination::Dead)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_COMBINATION");
        let err = compute_wall_combination(&building, &snow_load(), UlsCombination::DeadSnow, SlsCombination::Snow)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_COMBINATION");
    }

    #[test]
    fn test_missing_loads() {
        let building = build_building(
            build_dimensions(30.0, Some(50.0), None, None).unwrap(),
            build_cladding(50.0, 0.0).unwrap(),
            build_roof(30.0, 60.0, 45.0, 1.0).unwrap(),
            12,
            0.0,
            ZoneLayout::Default,
            DeadLoad::Uniform(2.0),
        )
        .unwrap();
        let err = compute_wall_combination(&building, &snow_load(), UlsCombination::DeadWind, SlsCombination::Wind)
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_LOAD_DATA");
    }

    #[test]
    fn test_every_supported_pair_has_full_rows() {
        let building = building_with_loads();
        for uls in UlsCombination::ALL {
            for sls in Surface::Wall.supported_sls() {
                let table = compute_wall_combination(&building, &snow_load(), uls, *sls).unwrap();
                assert_eq!(table.row_count(), 3);
                assert!(table.rows.iter().all(|r| r.len() == table.columns.len()));
            }
        }
    }
}
