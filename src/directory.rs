use std::collections::VecDeque;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, error, info, trace};

use crate::domain::{EmployeeRecord, Gender, PageProps, TVError};
use crate::transport::{PageRequest, PageResponse, PageTransport};

const EMPLOYEE_COLUMNS: [&str; 4] = ["emp_no", "first_name", "last_name", "gender"];

/// Local stand-in for the employees resource: holds every record and cuts
/// them into pages.
#[derive(Debug)]
pub struct Directory {
    records: Vec<EmployeeRecord>,
    page_size: usize,
}

impl Directory {
    pub fn new(mut records: Vec<EmployeeRecord>, page_size: usize) -> Self {
        records.sort_by_key(|e| e.emp_no);
        Directory {
            records,
            page_size: page_size.max(1),
        }
    }

    pub fn load(path: PathBuf, page_size: usize) -> Result<Self, TVError> {
        Directory::check_file(&path)?;
        let start_time = Instant::now();

        let df = LazyCsvReader::new(PlPath::Local(path.as_path().into()))
            .with_has_header(true)
            .finish()?
            .collect()?;
        let directory = Directory::from_frame(&df, page_size)?;

        info!(
            "Loading {} employees from {:?} took {}ms ...",
            directory.records.len(),
            path,
            start_time.elapsed().as_millis()
        );
        Ok(directory)
    }

    pub fn from_frame(df: &DataFrame, page_size: usize) -> Result<Self, TVError> {
        let mut columns = Vec::with_capacity(EMPLOYEE_COLUMNS.len());
        for name in EMPLOYEE_COLUMNS {
            columns.push(Directory::load_column(df, name)?);
        }
        let [emp_nos, first_names, last_names, genders]: [Vec<String>; 4] = columns
            .try_into()
            .map_err(|_| TVError::LoadingFailed("unexpected column count".into()))?;

        let records = emp_nos
            .into_iter()
            .zip(first_names)
            .zip(last_names)
            .zip(genders)
            .enumerate()
            .map(|(row, (((emp_no, first_name), last_name), gender))| {
                let emp_no = emp_no.trim().parse::<u32>().map_err(|_| {
                    let reason = format!("row {row}: emp_no \"{emp_no}\" is not a number");
                    TVError::InvalidRecord(reason)
                })?;
                Ok(EmployeeRecord {
                    emp_no,
                    first_name,
                    last_name,
                    gender: Gender::from_code(&gender)?,
                })
            })
            .collect::<Result<Vec<_>, TVError>>()?;

        Ok(Directory::new(records, page_size))
    }

    fn load_column(df: &DataFrame, name: &str) -> Result<Vec<String>, TVError> {
        let column = df
            .column(name)
            .map_err(|_| TVError::LoadingFailed(format!("missing column \"{name}\"")))?
            .cast(&DataType::String)?;
        let values = column.str()?;
        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    fn check_file(path: &Path) -> Result<(), TVError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TVError::FileNotFound,
            ErrorKind::PermissionDenied => TVError::PermissionDenied,
            _ => TVError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(TVError::LoadingFailed("Not a file!".into()));
        }
        let is_csv = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(TVError::LoadingFailed("Only csv files are supported".into()));
        }
        Ok(())
    }

    fn matches(employee: &EmployeeRecord, term: &str) -> bool {
        employee.emp_no.to_string().contains(term)
            || employee.first_name.to_lowercase().contains(term)
            || employee.last_name.to_lowercase().contains(term)
    }

    /// Answers a page visit. No page means the first one, pages past the end
    /// are pulled back to the last one.
    pub fn page(&self, search: Option<&str>, page: Option<u32>) -> PageProps {
        let query = search.unwrap_or_default().trim().to_string();
        let term = query.to_lowercase();

        let hits: Vec<&EmployeeRecord> = if term.is_empty() {
            self.records.iter().collect()
        } else {
            self.records
                .par_iter()
                .filter(|e| Directory::matches(e, &term))
                .collect()
        };

        let last_page = hits.len().div_ceil(self.page_size).max(1) as u32;
        let current_page = page.unwrap_or(1).clamp(1, last_page);
        let employees = hits
            .into_iter()
            .skip((current_page as usize - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect();

        trace!("Search \"{query}\" => page {current_page}/{last_page}");
        PageProps {
            employees,
            query,
            current_page,
            last_page,
        }
    }
}

/// Serves a [`Directory`] from a worker thread so page visits never block
/// the render loop.
pub struct DirectoryTransport {
    requests: Sender<PageRequest>,
    responses: Receiver<PageResponse>,
    failed: VecDeque<PageResponse>,
}

impl DirectoryTransport {
    pub fn spawn(directory: Directory) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<PageRequest>();
        let (response_tx, response_rx) = mpsc::channel::<PageResponse>();

        thread::spawn(move || {
            for request in request_rx {
                let props = directory.page(request.search.as_deref(), request.page);
                let response = PageResponse {
                    generation: request.generation,
                    outcome: Ok(props),
                };
                if response_tx.send(response).is_err() {
                    break;
                }
            }
            debug!("Directory worker stopped");
        });

        DirectoryTransport {
            requests: request_tx,
            responses: response_rx,
            failed: VecDeque::new(),
        }
    }
}

impl PageTransport for DirectoryTransport {
    fn request_page(&mut self, request: PageRequest) {
        if let Err(mpsc::SendError(request)) = self.requests.send(request) {
            error!("Directory worker is gone, dropping request {}", request.generation);
            self.failed.push_back(PageResponse {
                generation: request.generation,
                outcome: Err("directory is not available".to_string()),
            });
        }
    }

    fn poll_response(&mut self) -> Option<PageResponse> {
        self.failed
            .pop_front()
            .or_else(|| self.responses.try_recv().ok())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use polars::prelude::*;

    use super::*;

    fn employee(emp_no: u32, first: &str, last: &str) -> EmployeeRecord {
        EmployeeRecord {
            emp_no,
            first_name: first.to_string(),
            last_name: last.to_string(),
            gender: Gender::Male,
        }
    }

    fn directory(count: u32, page_size: usize) -> Directory {
        let records = (1..=count)
            .rev()
            .map(|n| employee(n, &format!("First{n}"), &format!("Last{n}")))
            .collect();
        Directory::new(records, page_size)
    }

    fn emp_nos(props: &PageProps) -> Vec<u32> {
        props.employees.iter().map(|e| e.emp_no).collect()
    }

    #[test]
    fn missing_page_means_first_page() {
        let props = directory(25, 10).page(None, None);
        assert_eq!(props.current_page, 1);
        assert_eq!(props.last_page, 3);
        assert_eq!(emp_nos(&props), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let props = directory(25, 10).page(Some(""), Some(3));
        assert_eq!(emp_nos(&props), (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let dir = directory(25, 10);
        assert_eq!(dir.page(None, Some(0)).current_page, 1);
        assert_eq!(dir.page(None, Some(9)).current_page, 3);
    }

    #[test]
    fn no_hits_still_has_one_page() {
        let props = directory(5, 10).page(Some("nobody"), Some(2));
        assert!(props.employees.is_empty());
        assert_eq!(props.current_page, 1);
        assert_eq!(props.last_page, 1);
        assert_eq!(props.query, "nobody");
    }

    #[test]
    fn search_is_case_insensitive_and_keeps_order() {
        let dir = Directory::new(
            vec![
                employee(3, "Anna", "Smith"),
                employee(1, "John", "Smithers"),
                employee(2, "Mary", "Jones"),
            ],
            10,
        );
        let props = dir.page(Some("  SMITH "), None);
        assert_eq!(emp_nos(&props), vec![1, 3]);
        assert_eq!(props.query, "SMITH");
    }

    #[test]
    fn search_matches_emp_no() {
        let props = directory(25, 10).page(Some("2"), None);
        assert_eq!(emp_nos(&props), vec![2, 12, 20, 21, 22, 23, 24, 25]);
    }

    #[test]
    fn records_from_frame() -> Result<(), TVError> {
        let df = df!(
            "emp_no" => [10002i64, 10001],
            "first_name" => ["Bezalel", "Georgi"],
            "last_name" => ["Simmel", "Facello"],
            "gender" => ["F", "M"]
        )?;
        let dir = Directory::from_frame(&df, 15)?;
        let props = dir.page(None, None);
        assert_eq!(emp_nos(&props), vec![10001, 10002]);
        assert_eq!(props.employees[1].gender, Gender::Female);
        assert_eq!(props.employees[1].last_name, "Simmel");
        Ok(())
    }

    #[test]
    fn frame_with_bad_gender_is_rejected() -> Result<(), TVError> {
        let df = df!(
            "emp_no" => [1i64],
            "first_name" => ["A"],
            "last_name" => ["B"],
            "gender" => ["X"]
        )?;
        assert!(matches!(
            Directory::from_frame(&df, 15),
            Err(TVError::InvalidRecord(_))
        ));
        Ok(())
    }

    #[test]
    fn frame_without_gender_is_rejected() -> Result<(), TVError> {
        let df = df!(
            "emp_no" => [1i64],
            "first_name" => ["A"],
            "last_name" => ["B"]
        )?;
        assert!(matches!(
            Directory::from_frame(&df, 15),
            Err(TVError::LoadingFailed(_))
        ));
        Ok(())
    }

    #[test]
    fn load_csv_file() -> Result<(), TVError> {
        let path = std::env::temp_dir().join(format!("emptv-{}.csv", std::process::id()));
        fs::write(
            &path,
            "emp_no,first_name,last_name,gender\n10001,Georgi,Facello,M\n10002,Bezalel,Simmel,F\n",
        )?;
        let loaded = Directory::load(path.clone(), 1);
        fs::remove_file(&path)?;

        let props = loaded?.page(None, Some(2));
        assert_eq!(props.last_page, 2);
        assert_eq!(emp_nos(&props), vec![10002]);
        Ok(())
    }

    #[test]
    fn load_missing_file() {
        let result = Directory::load(PathBuf::from("/does/not/exist.csv"), 10);
        assert!(matches!(result, Err(TVError::FileNotFound)));
    }

    #[test]
    fn transport_answers_from_worker() {
        let mut transport = DirectoryTransport::spawn(directory(25, 10));
        transport.request_page(PageRequest {
            search: Some("First1".to_string()),
            page: Some(2),
            generation: 7,
        });

        let mut response = None;
        for _ in 0..200 {
            response = transport.poll_response();
            if response.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        let response = response.expect("worker did not answer");
        assert_eq!(response.generation, 7);
        let props = response.outcome.expect("page");
        // First1, First10..First19 => 11 hits
        assert_eq!(props.last_page, 2);
        assert_eq!(emp_nos(&props), vec![19]);
    }

    #[test]
    fn dead_worker_answers_with_failure() {
        let (requests, request_rx) = mpsc::channel::<PageRequest>();
        drop(request_rx);
        let (_response_tx, responses) = mpsc::channel::<PageResponse>();
        let mut transport = DirectoryTransport {
            requests,
            responses,
            failed: VecDeque::new(),
        };

        transport.request_page(PageRequest {
            search: Some("Smith".to_string()),
            page: None,
            generation: 4,
        });

        let response = transport.poll_response().expect("failure response");
        assert_eq!(response.generation, 4);
        assert!(response.outcome.is_err());
        assert_eq!(transport.poll_response(), None);
    }
}
