//! Tabular result of a combination
//!
//! Columns are the zone context variables followed by the union of the term
//! names the rows produced, in first-seen order. A row missing a term holds
//! 0.0 in that column, so every row has the full column set.

use serde::{Deserialize, Serialize};

use super::{SlsCombination, Surface, Terms, UlsCombination};
use crate::loads::WindDirection;

/// Zone context columns that open every table
pub const CONTEXT_COLUMNS: [&str; 4] = ["xn", "hx", "ce", "ax"];

/// Computed combination table.
///
/// # JSON Format
/// ```json
/// {
///   "surface": "Wall",
///   "uls": "DeadWind",
///   "sls": "Wind",
///   "direction": "Upwind",
///   "columns": ["xn", "hx", "ce", "ax", "uls 1.25D", "..."],
///   "zone_nums": [3, 2, 1],
///   "rows": [[10.0, 50.0, 1.38, 3.0, 1.875, "..."]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationTable {
    pub surface: Surface,
    pub uls: UlsCombination,
    pub sls: SlsCombination,
    /// Direction of the snow load the table was computed with
    pub direction: WindDirection,
    pub columns: Vec<String>,
    /// Height zone each row belongs to
    pub zone_nums: Vec<u32>,
    pub rows: Vec<Vec<f64>>,
}

impl CombinationTable {
    /// Assemble a table from per-row terms, filling absent terms with 0.0.
    pub(crate) fn from_rows(
        surface: Surface,
        uls: UlsCombination,
        sls: SlsCombination,
        direction: WindDirection,
        rows: Vec<(u32, Terms)>,
    ) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for (_, terms) in &rows {
            for (name, _) in terms {
                if !columns.iter().any(|c| c == name) {
                    columns.push((*name).to_string());
                }
            }
        }

        let zone_nums = rows.iter().map(|(zone_num, _)| *zone_num).collect();
        let values = rows
            .iter()
            .map(|(_, terms)| {
                columns
                    .iter()
                    .map(|column| {
                        terms
                            .iter()
                            .find(|(name, _)| name == column)
                            .map_or(0.0, |(_, value)| *value)
                    })
                    .collect()
            })
            .collect();

        CombinationTable {
            surface,
            uls,
            sls,
            direction,
            columns,
            zone_nums,
            rows: values,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Value at a row and column
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx])
    }

    /// Value for a zone number and column
    pub fn get_zone(&self, zone_num: u32, column: &str) -> Option<f64> {
        let row = self.zone_nums.iter().position(|z| *z == zone_num)?;
        self.get(row, column)
    }

    /// Rows as ordered (column, value) pairs for exporters
    pub fn to_rows(&self) -> Vec<Vec<(String, f64)>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().copied()).collect())
            .collect()
    }

    /// Term columns (everything after the context columns)
    pub fn term_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| !CONTEXT_COLUMNS.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CombinationTable {
        CombinationTable::from_rows(
            Surface::Wall,
            UlsCombination::DeadOnly,
            SlsCombination::Wind,
            WindDirection::Upwind,
            vec![
                (2, vec![("xn", 20.0), ("hx", 40.0), ("a", 1.0)]),
                (1, vec![("xn", 20.0), ("hx", 20.0), ("b", 2.0)]),
            ],
        )
    }

    #[test]
    fn test_union_columns_with_zero_fill() {
        let t = table();
        assert_eq!(t.columns, vec!["xn", "hx", "a", "b"]);
        assert_eq!(t.rows[0], vec![20.0, 40.0, 1.0, 0.0]);
        assert_eq!(t.rows[1], vec![20.0, 20.0, 0.0, 2.0]);
    }

    #[test]
    fn test_lookups() {
        let t = table();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.get(0, "a"), Some(1.0));
        assert_eq!(t.get(5, "a"), None);
        assert_eq!(t.get_zone(1, "hx"), Some(20.0));
        assert_eq!(t.column("hx"), Some(vec![40.0, 20.0]));
        assert_eq!(t.column("zz"), None);
        let terms: Vec<&str> = t.term_columns().collect();
        assert_eq!(terms, vec!["a", "b"]);
    }

    #[test]
    fn test_to_rows() {
        let rows = table().to_rows();
        assert_eq!(rows[1][3], ("b".to_string(), 2.0));
    }

    #[test]
    fn test_table_serialization() {
        let t = table();
        let json = serde_json::to_string(&t).unwrap();
        let parsed: CombinationTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, t);
    }
}
