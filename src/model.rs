use tracing::{debug, info, trace, warn};

use crate::domain::{EMPTY_TABLE_TEXT, EmployeeRecord, HELP_TEXT, Message, PageProps, SortColumn};
use crate::pagination::Pagination;
use crate::search::{SearchBox, SearchEvent};
use crate::sort::{SortState, sort_employees};
use crate::transport::{PageRequest, PageResponse, PageTransport};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    SEARCH,
    POPUP,
}

/// Lifecycle of the latest page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Pending { generation: u64 },
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub emp_no: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
}

impl RowView {
    fn from_record(employee: &EmployeeRecord) -> Self {
        RowView {
            emp_no: employee.emp_no.to_string(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            gender: employee.gender.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<RowView>),
    /// Single row spanning every column.
    Empty(&'static str),
}

pub const ACTIONS_HEADER: &str = "Actions";

/// Snapshot handed to the UI. Built fresh for every frame.
#[derive(Debug, Clone)]
pub struct UIData {
    pub search_text: String,
    pub search_cursor: usize,
    pub active_search: bool,
    pub headers: Vec<String>,
    pub body: TableBody,
    pub selected_row: Option<usize>,
    pub page_label: String,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub request: RequestState,
    pub status_message: String,
    pub show_popup: bool,
    pub popup_message: String,
}

pub struct Model<T: PageTransport> {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    search: SearchBox,
    sort: SortState,
    pagination: Pagination,
    employees: Vec<EmployeeRecord>,
    selected_row: usize,
    request: RequestState,
    generation: u64,
    transport: T,
    status_message: String,
}

impl<T: PageTransport> Model<T> {
    /// Creates the view state for a freshly delivered page. The search text
    /// starts out as the query the directory reports.
    pub fn mount(props: PageProps, transport: T) -> Self {
        info!(
            "Mounting employee view with query \"{}\" on page {}/{}",
            props.query, props.current_page, props.last_page
        );
        Self {
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            search: SearchBox::new(&props.query),
            sort: SortState::default(),
            pagination: Pagination::new(props.current_page, props.last_page),
            employees: props.employees,
            selected_row: 0,
            request: RequestState::Idle,
            generation: 0,
            transport,
            status_message: "Started emptv!".to_string(),
        }
    }

    pub fn update(&mut self, message: Option<Message>) {
        let Some(msg) = message else {
            return;
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(),
                Message::MoveDown => self.move_selection_down(),
                Message::PreviousPage => {
                    self.handle_page_change(self.pagination.current_page.saturating_sub(1))
                }
                Message::NextPage => {
                    self.handle_page_change(self.pagination.current_page.saturating_add(1))
                }
                Message::Sort(column) => self.handle_sort(column),
                Message::EnterSearch => self.enter_search(),
                Message::Edit => self.row_action(RowAction::Edit),
                Message::Delete => self.row_action(RowAction::Delete),
                Message::Refresh => self.refresh(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::SEARCH => {
                if let Message::RawKey(key) = msg {
                    match self.search.read(key) {
                        SearchEvent::Submitted => {
                            self.leave_search();
                            self.handle_search();
                        }
                        SearchEvent::Left => self.leave_search(),
                        SearchEvent::Edited | SearchEvent::Ignored => {}
                    }
                } else if msg == Message::Quit {
                    self.quit();
                }
            }
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.close_popup(),
                _ => (),
            },
        }
    }

    // -------------------- Controllers ---------------------- //

    /// Submits the search text. The page is left out so the directory
    /// starts at the first page again.
    pub fn handle_search(&mut self) {
        let search = self.search.text().to_string();
        info!("Searching for \"{search}\"");
        self.issue(Some(search), None);
    }

    /// Requests `page`, carrying the current search text along. Pages
    /// outside `1..=last_page` are rejected without a request.
    pub fn handle_page_change(&mut self, page: u32) {
        match self.pagination.validate(page) {
            Some(page) => {
                let search = self.search.text().to_string();
                self.issue(Some(search), Some(page));
            }
            None => self.set_status_message(format!(
                "There is no page {page}, staying on {}",
                self.pagination.label()
            )),
        }
    }

    /// Sorting works on the loaded page only and never talks to the directory.
    pub fn handle_sort(&mut self, column: SortColumn) {
        self.sort.handle_sort(column);
        self.set_status_message(format!("Sorted by {} ({})", column.label(), self.sort.order));
    }

    fn refresh(&mut self) {
        let search = self.search.text().to_string();
        let page = self.pagination.current_page;
        self.issue(Some(search), Some(page));
    }

    fn issue(&mut self, search: Option<String>, page: Option<u32>) {
        self.generation += 1;
        let request = PageRequest {
            search,
            page,
            generation: self.generation,
        };
        debug!("Requesting page {:?}", request);
        self.request = RequestState::Pending {
            generation: self.generation,
        };
        self.transport.request_page(request);
        self.set_status_message("Loading ...");
    }

    // -------------------- Responses ---------------------- //

    /// Drains every response the transport has collected so far.
    pub fn sync(&mut self) {
        while let Some(response) = self.transport.poll_response() {
            self.receive(response);
        }
    }

    /// Applies a response if it answers the latest request. Returns whether
    /// it was applied.
    pub fn receive(&mut self, response: PageResponse) -> bool {
        if response.generation != self.generation {
            debug!(
                "Dropping stale response {} (latest is {})",
                response.generation, self.generation
            );
            return false;
        }
        match response.outcome {
            Ok(props) => {
                self.employees = props.employees;
                self.pagination = Pagination::new(props.current_page, props.last_page);
                self.selected_row = 0;
                self.request = RequestState::Succeeded;
                self.set_status_message(format!(
                    "Loaded {} employees, {}",
                    self.employees.len(),
                    self.pagination.label()
                ));
            }
            Err(e) => {
                warn!("Page request {} failed: {e}", response.generation);
                self.set_status_message(format!("Request failed: {e}"));
                self.request = RequestState::Failed(e);
            }
        }
        true
    }

    // -------------------- Row actions ---------------------- //

    fn row_action(&mut self, action: RowAction) {
        let target = self.sorted_employees().get(self.selected_row).map(|e| e.emp_no);
        match target {
            Some(emp_no) => {
                info!("{action:?} requested for employee {emp_no}");
                self.set_status_message(format!(
                    "{action:?} employee #{emp_no} is not available yet"
                ));
            }
            None => self.set_status_message("No employee selected"),
        }
    }

    // -------------------- View ---------------------- //

    pub fn sorted_employees(&self) -> Vec<&EmployeeRecord> {
        sort_employees(&self.employees, self.sort)
    }

    pub fn uidata(&self) -> UIData {
        let rows = self.sorted_employees();
        let body = if rows.is_empty() {
            TableBody::Empty(EMPTY_TABLE_TEXT)
        } else {
            TableBody::Rows(rows.into_iter().map(RowView::from_record).collect())
        };
        let selected_row = match body {
            TableBody::Rows(_) => Some(self.selected_row),
            TableBody::Empty(_) => None,
        };

        let mut headers: Vec<String> = SortColumn::ALL
            .iter()
            .map(|&column| match self.sort.indicator(column) {
                Some(arrow) => format!("{} {arrow}", column.label()),
                None => column.label().to_string(),
            })
            .collect();
        headers.push(ACTIONS_HEADER.to_string());

        UIData {
            search_text: self.search.text().to_string(),
            search_cursor: self.search.cursor(),
            active_search: self.modus == Modus::SEARCH,
            headers,
            body,
            selected_row,
            page_label: self.pagination.label(),
            previous_enabled: self.pagination.has_previous(),
            next_enabled: self.pagination.has_next(),
            request: self.request.clone(),
            status_message: self.status_message.clone(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
        }
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SEARCH
    }

    pub fn request_state(&self) -> &RequestState {
        &self.request
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn search_text(&self) -> &str {
        self.search.text()
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[cfg(test)]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // -------------------- Modus handling ---------------------- //

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn enter_search(&mut self) {
        trace!("Entering search input ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCH;
    }

    fn leave_search(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::SEARCH;
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn move_selection_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        if self.selected_row + 1 < self.employees.len() {
            self.selected_row += 1;
        }
    }
}
