//! # Envelope CLI
//!
//! Runs a complete envelope load analysis and prints every combination table.
//!
//! ```text
//! envelope_cli [input.json]
//! ```
//!
//! With an input file the analysis runs unattended; without one the main
//! dimensions are prompted for (press Enter to keep the default) and the
//! built-in demo site is used. Set `RUST_LOG=debug` for calculation traces.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use serde::{Deserialize, Serialize};

use envelope_core::combinations::{evaluate_all, BatchReport, CombinationTable};
use envelope_core::errors::{CalcError, CalcResult};
use envelope_core::geometry::{build_building, build_cladding, build_dimensions, build_roof, DeadLoad, ZoneLayout};
use envelope_core::loads::{
    compute_seismic_loads, compute_snow_load, compute_wind_loads, AccumulationMode, ImportanceCategory, SeismicFactor,
    SnowSelections, WindSelections,
};
use envelope_core::location::{ClimateRecord, ClimateTable, LocationProvider, SiteDesignationKind};
use envelope_core::session::{AnalysisSettings, Session};

const DEMO_ADDRESS: &str = "1055 Canada Pl, Vancouver BC";

fn demo_climate() -> ClimateRecord {
    ClimateRecord {
        latitude: 49.288,
        longitude: -123.117,
        q_kpa: 0.45,
        ss_kpa: 1.8,
        sr_kpa: 0.2,
        sa_02: 0.848,
        sa_10: 0.293,
    }
}

/// Analysis input document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisInput {
    #[serde(default = "default_user")]
    user: String,
    address: String,
    site_kind: SiteDesignationKind,
    /// Vs30 (m/s) for `Xv`, site class letter for `Xs`
    seismic_value: String,
    /// Site values for the address; the demo site is used when absent
    #[serde(default)]
    climate: Option<ClimateRecord>,

    width_m: f64,
    #[serde(default)]
    height_m: Option<f64>,
    #[serde(default)]
    eave_m: Option<f64>,
    #[serde(default)]
    ridge_m: Option<f64>,
    c_top_m: f64,
    #[serde(default)]
    c_bot_m: f64,
    num_floor: u32,
    #[serde(default)]
    h_opening_m: f64,
    /// Wall dead load (kPa)
    wall_wp_kpa: f64,

    w_roof_m: f64,
    l_roof_m: f64,
    slope_deg: f64,
    /// Roof dead load (kPa)
    roof_wp_kpa: f64,

    #[serde(default)]
    wind: WindSelections,
    #[serde(default)]
    snow: SnowSelections,
    #[serde(default)]
    seismic_importance: ImportanceCategory,
    #[serde(default)]
    seismic_factor: SeismicFactor,
    /// Zone step, batch workers and snow accumulation
    #[serde(default)]
    settings: AnalysisSettings,
}

fn default_user() -> String {
    "cli".to_string()
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn prompt_input() -> AnalysisInput {
    let width_m = prompt_f64("Building width (m) [30.0]: ", 30.0);
    let height_m = prompt_f64("Building height (m) [50.0]: ", 50.0);
    let slope_deg = prompt_f64("Roof slope (deg) [45.0]: ", 45.0);
    let wall_wp_kpa = prompt_f64("Wall dead load (kPa) [2.0]: ", 2.0);
    let roof_wp_kpa = prompt_f64("Roof dead load (kPa) [1.2]: ", 1.2);

    AnalysisInput {
        user: default_user(),
        address: DEMO_ADDRESS.to_string(),
        site_kind: SiteDesignationKind::Xs,
        seismic_value: "C".to_string(),
        climate: None,
        width_m,
        height_m: Some(height_m),
        eave_m: None,
        ridge_m: None,
        c_top_m: height_m,
        c_bot_m: 0.0,
        num_floor: (height_m / 3.5).ceil().max(1.0) as u32,
        h_opening_m: 0.0,
        wall_wp_kpa,
        w_roof_m: width_m,
        l_roof_m: width_m * 2.0,
        slope_deg,
        roof_wp_kpa,
        wind: WindSelections::default(),
        snow: SnowSelections::default(),
        seismic_importance: ImportanceCategory::Normal,
        seismic_factor: SeismicFactor::default(),
        settings: AnalysisSettings::default(),
    }
}

fn read_input(path: &str) -> CalcResult<AnalysisInput> {
    let contents = fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path, e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid input in {}: {}", path, e),
    })
}

/// Accumulation mode from `snow.accumulation` or `settings.accumulation`.
///
/// Whichever one is not `Uniform` wins; both set to different modes is an error.
fn resolve_accumulation(snow: &SnowSelections, settings: &AnalysisSettings) -> CalcResult<AccumulationMode> {
    match (snow.accumulation, settings.accumulation) {
        (AccumulationMode::Uniform, mode) => Ok(mode),
        (mode, AccumulationMode::Uniform) => Ok(mode),
        (a, b) if a == b => Ok(a),
        (a, b) => Err(CalcError::invalid_input(
            "snow.accumulation",
            format!("{:?}", a),
            format!("conflicts with settings.accumulation {:?}", b),
        )),
    }
}

fn run(input: &AnalysisInput) -> CalcResult<(Session, BatchReport)> {
    let record = input.climate.unwrap_or_else(demo_climate);
    let provider = ClimateTable::new().with_record(&input.address, record);
    let location = provider.resolve_location(&input.address, input.site_kind, &input.seismic_value)?;

    let settings = &input.settings;
    let building = build_building(
        build_dimensions(input.width_m, input.height_m, input.eave_m, input.ridge_m)?,
        build_cladding(input.c_top_m, input.c_bot_m)?,
        build_roof(input.w_roof_m, input.l_roof_m, input.slope_deg, input.roof_wp_kpa)?,
        input.num_floor,
        input.h_opening_m,
        ZoneLayout::Step(settings.zone_step_m),
        DeadLoad::Uniform(input.wall_wp_kpa),
    )?;

    let wind = compute_wind_loads(&building, &location, &input.wind)?;
    let building = building.with_wind_loads(wind)?;

    let snow_selections = SnowSelections {
        accumulation: resolve_accumulation(&input.snow, settings)?,
        ..input.snow
    };
    let snow = compute_snow_load(&building, &location, &snow_selections)?;

    let seismic = compute_seismic_loads(
        &building,
        &location,
        input.seismic_importance,
        input.seismic_factor,
        Some(&snow.upwind),
    )?;
    let building = building.with_seismic_loads(seismic)?;

    let report = evaluate_all(&building, &snow, settings.workers)?;

    let mut session = Session::new(input.user.clone());
    session.settings = AnalysisSettings {
        accumulation: snow_selections.accumulation,
        ..settings.clone()
    };
    session.set_location(location);
    session.set_building(building);
    session.set_snow(snow);

    Ok((session, report))
}

fn print_table(table: &CombinationTable) {
    println!();
    println!(
        "{} | {} | {} | snow {}",
        table.surface.code().to_uppercase(),
        table.uls.code(),
        table.sls.code(),
        table.direction
    );
    let header: Vec<String> = std::iter::once("zone".to_string())
        .chain(table.columns.iter().cloned())
        .map(|c| format!("{:>26}", c))
        .collect();
    println!("{}", header.join(""));
    for (zone_num, row) in table.zone_nums.iter().zip(&table.rows) {
        let cells: Vec<String> = std::iter::once(format!("{:>26}", zone_num))
            .chain(row.iter().map(|v| format!("{:>26.4}", v)))
            .collect();
        println!("{}", cells.join(""));
    }
}

fn print_error(e: &CalcError) {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

fn main() -> ExitCode {
    env_logger::init();

    println!("Envelope - Building Envelope Design Loads");
    println!("=========================================");
    println!();

    let input = match std::env::args().nth(1) {
        Some(path) => match read_input(&path) {
            Ok(input) => input,
            Err(e) => {
                print_error(&e);
                return ExitCode::FAILURE;
            }
        },
        None => prompt_input(),
    };
    log::debug!("analysis input: {:?}", input);

    let (session, report) = match run(&input) {
        Ok(result) => result,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let (Some(building), Some(snow)) = (&session.building, &session.snow) {
        println!("Site:     {}", input.address);
        println!("Zones:    {}", building.zones.len());
        println!("Snow:     upwind {:.3} kPa, downwind {:.3} kPa (ULS)", snow.upwind.s_uls, snow.downwind.s_uls);
    }

    for table in report.tables() {
        print_table(table);
    }

    let failures = report.failures();
    if !failures.is_empty() {
        println!();
        for (job, e) in &failures {
            eprintln!("{} {} / {} ({}): {}", job.surface, job.uls.code(), job.sls.code(), job.direction, e);
        }
    }

    println!();
    println!("JSON Output (for API use):");
    match serde_json::to_string_pretty(&(&session, &report)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            print_error(&CalcError::SerializationError { reason: e.to_string() });
            return ExitCode::FAILURE;
        }
    }

    if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
