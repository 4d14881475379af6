//! Batch evaluation of every supported combination
//!
//! Up to 40 independent tables (walls: 5 × 2 pairs, roofs: 5 × 4 pairs, each
//! for the upwind and downwind snow load) are computed on a bounded rayon pool.
//! Each job keeps its own result so one failing table does not hide the others.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::table::CombinationTable;
use super::{compute_roof_combination, compute_wall_combination, validate_tables, SlsCombination, Surface, UlsCombination};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::Building;
use crate::loads::snow::DirectionalSnowLoad;
use crate::loads::WindDirection;

/// One table to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombinationJob {
    pub surface: Surface,
    pub direction: WindDirection,
    pub uls: UlsCombination,
    pub sls: SlsCombination,
}

impl CombinationJob {
    /// Every supported (surface, direction, ULS, SLS) job, in key order
    pub fn all() -> Vec<CombinationJob> {
        let mut jobs = Vec::new();
        for surface in Surface::ALL {
            for direction in WindDirection::ALL {
                for uls in UlsCombination::ALL {
                    for sls in surface.supported_sls() {
                        jobs.push(CombinationJob {
                            surface,
                            direction,
                            uls,
                            sls: *sls,
                        });
                    }
                }
            }
        }
        jobs.sort();
        jobs
    }

    pub fn run(&self, building: &Building, snow: &DirectionalSnowLoad) -> CalcResult<CombinationTable> {
        let snow = snow.get(self.direction);
        match self.surface {
            Surface::Wall => compute_wall_combination(building, snow, self.uls, self.sls),
            Surface::Roof => compute_roof_combination(building, snow, self.uls, self.sls),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job: CombinationJob,
    pub result: CalcResult<CombinationTable>,
}

/// All batch results, sorted by job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<JobResult>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Successfully computed tables
    pub fn tables(&self) -> impl Iterator<Item = &CombinationTable> {
        self.results.iter().filter_map(|r| r.result.as_ref().ok())
    }

    /// Jobs that failed, with their errors
    pub fn failures(&self) -> Vec<(&CombinationJob, &CalcError)> {
        self.results
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (&r.job, e)))
            .collect()
    }

    pub fn get(&self, job: &CombinationJob) -> Option<&CalcResult<CombinationTable>> {
        self.results.iter().find(|r| r.job == *job).map(|r| &r.result)
    }
}

/// Evaluate every supported job on a pool of `workers` threads.
///
/// Fails up front only when the dispatch tables are inconsistent or the pool
/// cannot be built; per-table errors are reported in the [`BatchReport`].
pub fn evaluate_all(building: &Building, snow: &DirectionalSnowLoad, workers: usize) -> CalcResult<BatchReport> {
    validate_tables()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| CalcError::Internal {
            message: format!("failed to build worker pool: {}", e),
        })?;

    let jobs = CombinationJob::all();
    log::debug!("evaluating {} combination tables on {} workers", jobs.len(), workers.max(1));

    let mut results: Vec<JobResult> = pool.install(|| {
        jobs.par_iter()
            .map(|job| JobResult {
                job: *job,
                result: job.run(building, snow),
            })
            .collect()
    });
    results.sort_by(|a, b| a.job.cmp(&b.job));

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    if failed > 0 {
        log::debug!("{} of {} combination tables failed", failed, results.len());
    }

    Ok(BatchReport { results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinations::test_support::{building_with_loads, directional_snow};
    use crate::geometry::HeightZone;

    #[test]
    fn test_job_count() {
        let jobs = CombinationJob::all();
        assert_eq!(jobs.len(), 40);
        assert_eq!(jobs.iter().filter(|j| j.surface == Surface::Wall).count(), 20);
        assert!(jobs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_evaluate_all() {
        let building = building_with_loads();
        let snow = directional_snow(&building);
        let report = evaluate_all(&building, &snow, 4).unwrap();
        assert_eq!(report.len(), 40);
        assert!(report.failures().is_empty());
        assert_eq!(report.tables().count(), 40);
    }

    #[test]
    fn test_matches_sequential() {
        let building = building_with_loads();
        let snow = directional_snow(&building);
        let report = evaluate_all(&building, &snow, 3).unwrap();
        for result in &report.results {
            let expected = result.job.run(&building, &snow).unwrap();
            assert_eq!(result.result.as_ref().unwrap(), &expected);
        }
    }

    #[test]
    fn test_single_worker() {
        let building = building_with_loads();
        let snow = directional_snow(&building);
        let report = evaluate_all(&building, &snow, 0).unwrap();
        assert_eq!(report.len(), 40);
    }

    #[test]
    fn test_failures_reported_per_job() {
        let mut building = building_with_loads();
        building.zones.push(HeightZone::new(4, 50.0));
        let snow = directional_snow(&building);
        let report = evaluate_all(&building, &snow, 2).unwrap();
        // Every table reads the new top zone, which has no loads
        assert_eq!(report.failures().len(), 40);
        assert!(report
            .failures()
            .iter()
            .all(|(_, e)| e.error_code() == "MISSING_LOAD_DATA"));
    }
}
