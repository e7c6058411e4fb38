//! Weekday x month sum matrix for the heatmap

use serde::{Deserialize, Serialize};

use crate::models::{DayName, MonthName, RecordSet};

/// Sums per (weekday, month).
///
/// Rows are always the seven weekdays Monday..Sunday. Columns are months
/// in order of first appearance in the (date-sorted) data. A cell is
/// `None` when no record fell into it, which is distinct from a real
/// zero sum until [`CrossTab::filled`] is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    pub weekdays: Vec<DayName>,
    pub months: Vec<MonthName>,
    /// `cells[weekday][month]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CrossTab {
    pub fn get(&self, weekday: DayName, month: MonthName) -> Option<f64> {
        let col = self.months.iter().position(|m| *m == month)?;
        self.cells[weekday.index()][col]
    }

    /// Matrix with absent cells replaced by zero, for presentation
    pub fn filled(&self) -> Vec<Vec<f64>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.unwrap_or(0.0)).collect())
            .collect()
    }

    /// Number of cells that received at least one record
    pub fn present_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

/// Pivot records into a weekday x month matrix.
///
/// Returns None when every cell would be absent, so callers can tell
/// "nothing to show" apart from genuine zero totals.
pub fn build_crosstab(records: &RecordSet) -> Option<CrossTab> {
    let mut months: Vec<MonthName> = Vec::new();
    for record in records {
        if !months.contains(&record.month) {
            months.push(record.month);
        }
    }

    if months.is_empty() {
        return None;
    }

    let mut cells = vec![vec![None::<f64>; months.len()]; DayName::ALL.len()];
    for record in records {
        let col = months.iter().position(|m| *m == record.month)?;
        let cell = &mut cells[record.weekday.index()][col];
        *cell = Some(cell.unwrap_or(0.0) + record.amount);
    }

    let tab = CrossTab {
        weekdays: DayName::ALL.to_vec(),
        months,
        cells,
    };

    (tab.present_cells() > 0).then_some(tab)
}
