use std::fmt;
use std::io;
use std::path::PathBuf;

use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

pub const HELP_TEXT: &str = "\
Employee Galaxy

  /, s        Edit the search text (Enter submits, Esc leaves)
  1 2 3 4     Sort by ID, First Name, Last Name, Gender
              (same column again flips the order)
  Left, p     Previous page
  Right, n    Next page
  Up/Down     Select a row (also k/j)
  e, d        Edit / Delete the selected employee
  r           Reload the current page
  ?           Show this help
  Esc         Close this popup
  q           Quit";

pub const EMPTY_TABLE_TEXT: &str = "No employees found.";

#[derive(Debug, Error)]
pub enum TVError {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

#[derive(Debug, Clone)]
pub struct TVConfig {
    pub data_path: PathBuf,
    pub initial_search: String,
    pub page_size: usize,
    pub event_poll_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_code(code: &str) -> Result<Self, TVError> {
        match code.trim() {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            other => Err(TVError::InvalidRecord(format!(
                "unknown gender code \"{other}\""
            ))),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Gender::Male => 'M',
            Gender::Female => 'F',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// A single employee as delivered by the directory. Read-only for the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub emp_no: u32,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    EmpNo,
    FirstName,
    LastName,
    Gender,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::EmpNo,
        SortColumn::FirstName,
        SortColumn::LastName,
        SortColumn::Gender,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::EmpNo => "ID",
            SortColumn::FirstName => "First Name",
            SortColumn::LastName => "Last Name",
            SortColumn::Gender => "Gender",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "asc"),
            SortOrder::Descending => write!(f, "desc"),
        }
    }
}

/// Everything the directory hands over for one page. Always replaces the
/// previous page as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct PageProps {
    pub employees: Vec<EmployeeRecord>,
    pub query: String,
    pub current_page: u32,
    pub last_page: u32,
}

impl PageProps {
    pub fn empty(query: impl Into<String>) -> Self {
        PageProps {
            employees: Vec::new(),
            query: query.into(),
            current_page: 1,
            last_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    PreviousPage,
    NextPage,
    Sort(SortColumn),
    EnterSearch,
    RawKey(KeyEvent),
    Edit,
    Delete,
    Refresh,
    Help,
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_codes() {
        assert_eq!(Gender::from_code("M").unwrap(), Gender::Male);
        assert_eq!(Gender::from_code(" F ").unwrap(), Gender::Female);
        assert!(matches!(
            Gender::from_code("X"),
            Err(TVError::InvalidRecord(_))
        ));
        assert_eq!(Gender::Female.code(), 'F');
        assert_eq!(Gender::Male.label(), "Male");
    }

    #[test]
    fn sort_order_toggles_back() {
        let order = SortOrder::default();
        assert_eq!(order, SortOrder::Ascending);
        assert_eq!(order.toggled(), SortOrder::Descending);
        assert_eq!(order.toggled().toggled(), order);
    }
}
