use std::cmp::Ordering;

use tracing::trace;

use crate::domain::{EmployeeRecord, SortColumn, SortOrder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl SortState {
    /// Same column flips the order, a new column starts ascending.
    pub fn handle_sort(&mut self, column: SortColumn) {
        if self.column == column {
            self.order = self.order.toggled();
        } else {
            self.column = column;
            self.order = SortOrder::Ascending;
        }
        trace!("Sort by {:?} {}", self.column, self.order);
    }

    pub fn indicator(&self, column: SortColumn) -> Option<&'static str> {
        if self.column != column {
            return None;
        }
        match self.order {
            SortOrder::Ascending => Some("▲"),
            SortOrder::Descending => Some("▼"),
        }
    }
}

pub fn compare(a: &EmployeeRecord, b: &EmployeeRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::EmpNo => a.emp_no.cmp(&b.emp_no),
        SortColumn::FirstName => a.first_name.cmp(&b.first_name),
        SortColumn::LastName => a.last_name.cmp(&b.last_name),
        // Ordered by the single letter code, so Female sorts before Male
        SortColumn::Gender => a.gender.code().cmp(&b.gender.code()),
    }
}

/// Orders the records of the loaded page only. `sort_by` is stable and a
/// reversed `Equal` stays `Equal`, so ties keep their page order both ways.
pub fn sort_employees(employees: &[EmployeeRecord], state: SortState) -> Vec<&EmployeeRecord> {
    let mut rows: Vec<&EmployeeRecord> = employees.iter().collect();
    match state.order {
        SortOrder::Ascending => rows.sort_by(|a, b| compare(a, b, state.column)),
        SortOrder::Descending => rows.sort_by(|a, b| compare(a, b, state.column).reverse()),
    }
    rows
}
