//! Load combinations for wall and roof design checks
//!
//! A combination table is selected by a pair of combination types: one
//! ultimate ([`UlsCombination`]) and one serviceability ([`SlsCombination`]).
//! Each surface keeps a static dispatch table from that pair to a formula
//! producing named terms:
//!
//! - [`wall`] - 5 ULS × 2 SLS, one row per height zone (top zone first)
//! - [`roof`] - 5 ULS × 4 SLS, one row from the top zone and the roof dead load
//!
//! Roof tables are evaluated once per wind direction by passing the upwind or
//! downwind [`SnowLoad`]. [`batch`] runs every supported pair on a worker pool.
//!
//! # Combination types
//!
//! | ULS           | Code                   | SLS           | Code         |
//! |---------------|------------------------|---------------|--------------|
//! | `DeadOnly`    | 1.4D                   | `Dead`        | 1.0D         |
//! | `DeadSnow`    | 1.25D + 1.5S + 0.4W    | `Snow`        | 1.0S + 0.3W  |
//! | `DeadWind`    | 1.25D + 1.4W + 0.5S    | `Wind`        | 1.0W         |
//! | `UpliftWind`  | 0.9D + 1.4W            | `WindSuction` | 1.0W suction |
//! | `DeadSeismic` | 1.0D + 1.0E + 0.25S    |               |              |
//!
//! Walls support the `Wind` and `WindSuction` serviceability types only;
//! asking for any other pair fails with `UnsupportedCombination`.
//!
//! # Example
//! ```
//! use envelope_core::combinations::{SlsCombination, Surface, UlsCombination};
//!
//! let uls: UlsCombination = "1.25D + 1.4W + 0.5S".parse()?;
//! assert_eq!(uls, UlsCombination::DeadWind);
//! assert!(!Surface::Wall.supports(SlsCombination::Dead));
//! # Ok::<(), envelope_core::errors::CalcError>(())
//! ```

pub mod batch;
pub mod roof;
pub mod table;
pub mod wall;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::{evaluate_all, BatchReport, CombinationJob, JobResult};
pub use roof::compute_roof_combination;
pub use table::CombinationTable;
pub use wall::compute_wall_combination;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::loads::seismic::SeismicLoad;
use crate::loads::snow::SnowLoad;
use crate::loads::wind::WindLoad;

/// Ultimate limit state combination types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UlsCombination {
    /// 1.4D
    DeadOnly,
    /// 1.25D + 1.5S + 0.4W
    DeadSnow,
    /// 1.25D + 1.4W + 0.5S
    DeadWind,
    /// 0.9D + 1.4W (wind acting against the dead load)
    UpliftWind,
    /// 1.0D + 1.0E + 0.25S
    DeadSeismic,
}

impl UlsCombination {
    pub const ALL: [UlsCombination; 5] = [
        UlsCombination::DeadOnly,
        UlsCombination::DeadSnow,
        UlsCombination::DeadWind,
        UlsCombination::UpliftWind,
        UlsCombination::DeadSeismic,
    ];

    /// Equation as printed in the code's combination table
    pub fn code(&self) -> &'static str {
        match self {
            UlsCombination::DeadOnly => "1.4D",
            UlsCombination::DeadSnow => "1.25D + 1.5S + 0.4W",
            UlsCombination::DeadWind => "1.25D + 1.4W + 0.5S",
            UlsCombination::UpliftWind => "0.9D + 1.4W",
            UlsCombination::DeadSeismic => "1.0D + 1.0E + 0.25S",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UlsCombination::DeadOnly => "DeadOnly",
            UlsCombination::DeadSnow => "DeadSnow",
            UlsCombination::DeadWind => "DeadWind",
            UlsCombination::UpliftWind => "UpliftWind",
            UlsCombination::DeadSeismic => "DeadSeismic",
        }
    }
}

impl fmt::Display for UlsCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for UlsCombination {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = squash(s);
        UlsCombination::ALL
            .iter()
            .copied()
            .find(|c| squash(c.code()) == key || squash(c.name()) == key)
            .ok_or_else(|| CalcError::unsupported_combination("any surface", s, "-"))
    }
}

/// Serviceability limit state combination types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlsCombination {
    /// 1.0D
    Dead,
    /// 1.0S + 0.3W
    Snow,
    /// 1.0W acting inward / downward
    Wind,
    /// 1.0W acting outward / upward
    WindSuction,
}

impl SlsCombination {
    pub const ALL: [SlsCombination; 4] = [
        SlsCombination::Dead,
        SlsCombination::Snow,
        SlsCombination::Wind,
        SlsCombination::WindSuction,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SlsCombination::Dead => "1.0D",
            SlsCombination::Snow => "1.0S + 0.3W",
            SlsCombination::Wind => "1.0W",
            SlsCombination::WindSuction => "1.0W suction",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SlsCombination::Dead => "Dead",
            SlsCombination::Snow => "Snow",
            SlsCombination::Wind => "Wind",
            SlsCombination::WindSuction => "WindSuction",
        }
    }
}

impl fmt::Display for SlsCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for SlsCombination {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = squash(s);
        SlsCombination::ALL
            .iter()
            .copied()
            .find(|c| squash(c.code()) == key || squash(c.name()) == key)
            .ok_or_else(|| CalcError::unsupported_combination("any surface", "-", s))
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Envelope surface a combination table is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Surface {
    Wall,
    Roof,
}

impl Surface {
    pub const ALL: [Surface; 2] = [Surface::Wall, Surface::Roof];

    /// Serviceability types with formulas for this surface
    pub fn supported_sls(&self) -> &'static [SlsCombination] {
        match self {
            Surface::Wall => &[SlsCombination::Wind, SlsCombination::WindSuction],
            Surface::Roof => &SlsCombination::ALL,
        }
    }

    pub fn supports(&self, sls: SlsCombination) -> bool {
        self.supported_sls().contains(&sls)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Surface::Wall => "wall",
            Surface::Roof => "roof",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Loads available to a formula for one row
#[derive(Debug, Clone, Copy)]
pub struct TermContext<'a> {
    /// Dead load of the surface (kPa)
    pub wp: f64,
    pub wind: &'a WindLoad,
    pub seismic: &'a SeismicLoad,
    pub snow: &'a SnowLoad,
}

/// Named terms in output order
pub type Terms = Vec<(&'static str, f64)>;

/// Terms contributed by one half (ULS or SLS) of a pair
pub type TermFn = fn(&TermContext<'_>) -> Terms;

/// Formula for a full (ULS, SLS) pair: the ULS terms followed by the SLS terms
#[derive(Clone, Copy)]
pub struct Formula {
    uls: TermFn,
    sls: TermFn,
}

impl Formula {
    pub fn evaluate(&self, ctx: &TermContext<'_>) -> Terms {
        let mut terms = (self.uls)(ctx);
        terms.extend((self.sls)(ctx));
        terms
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formula").finish_non_exhaustive()
    }
}

/// Dispatch table from a combination pair to its formula
pub type FormulaTable = HashMap<(UlsCombination, SlsCombination), Formula>;

/// Build a surface's table from its per-type term functions.
pub(crate) fn build_table(
    surface: Surface,
    uls_terms: fn(UlsCombination) -> TermFn,
    sls_terms: fn(SlsCombination) -> Option<TermFn>,
) -> FormulaTable {
    let mut table = FormulaTable::new();
    for uls in UlsCombination::ALL {
        for sls in SlsCombination::ALL {
            let Some(sls_fn) = sls_terms(sls) else {
                continue;
            };
            table.insert(
                (uls, sls),
                Formula {
                    uls: uls_terms(uls),
                    sls: sls_fn,
                },
            );
        }
    }
    log::trace!("built {} dispatch table with {} formulas", surface, table.len());
    table
}

/// Look up a formula, failing with `UnsupportedCombination` for unknown pairs
pub(crate) fn lookup<'t>(
    table: &'t FormulaTable,
    surface: Surface,
    uls: UlsCombination,
    sls: SlsCombination,
) -> CalcResult<&'t Formula> {
    table
        .get(&(uls, sls))
        .ok_or_else(|| CalcError::unsupported_combination(surface.code(), uls.code(), sls.code()))
}

/// The dispatch table of a surface
pub fn formula_table(surface: Surface) -> &'static FormulaTable {
    match surface {
        Surface::Wall => &wall::WALL_FORMULAS,
        Surface::Roof => &roof::ROOF_FORMULAS,
    }
}

/// Check that every surface's dispatch table covers exactly the enumerated
/// ULS types crossed with the surface's supported SLS types.
pub fn validate_tables() -> CalcResult<()> {
    for surface in Surface::ALL {
        let table = formula_table(surface);
        let expected = UlsCombination::ALL.len() * surface.supported_sls().len();
        for uls in UlsCombination::ALL {
            for sls in SlsCombination::ALL {
                let present = table.contains_key(&(uls, sls));
                if present != surface.supports(sls) {
                    return Err(CalcError::Internal {
                        message: format!(
                            "{} dispatch table {} formula for ({}, {})",
                            surface,
                            if present { "has an unexpected" } else { "is missing the" },
                            uls.code(),
                            sls.code()
                        ),
                    });
                }
            }
        }
        if table.len() != expected {
            return Err(CalcError::Internal {
                message: format!("{} dispatch table has {} formulas, expected {}", surface, table.len(), expected),
            });
        }
    }
    Ok(())
}
