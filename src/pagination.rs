use tracing::debug;

/// Page position as reported by the directory. `current_page <= last_page`
/// is expected but not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            current_page: 1,
            last_page: 1,
        }
    }
}

impl Pagination {
    pub fn new(current_page: u32, last_page: u32) -> Self {
        Pagination {
            current_page,
            last_page,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    // Disabled buttons are not enough when a page is requested programmatically
    pub fn validate(&self, page: u32) -> Option<u32> {
        if page == 0 || page > self.last_page {
            debug!("Rejecting page {} outside of 1..={}", page, self.last_page);
            None
        } else {
            Some(page)
        }
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.last_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_disables_previous() {
        let pagination = Pagination::new(1, 5);
        assert!(!pagination.has_previous());
        assert!(pagination.has_next());
        assert_eq!(pagination.validate(0), None);
        assert_eq!(pagination.validate(2), Some(2));
    }

    #[test]
    fn last_page_disables_next() {
        let pagination = Pagination::new(5, 5);
        assert!(pagination.has_previous());
        assert!(!pagination.has_next());
        assert_eq!(pagination.validate(6), None);
        assert_eq!(pagination.validate(4), Some(4));
    }

    #[test]
    fn single_page_disables_both() {
        let pagination = Pagination::default();
        assert!(!pagination.has_previous());
        assert!(!pagination.has_next());
        assert_eq!(pagination.label(), "Page 1 of 1");
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let pagination = Pagination::new(2, 5);
        assert_eq!(pagination.validate(0), None);
        assert_eq!(pagination.validate(6), None);
        assert_eq!(pagination.validate(1), Some(1));
        assert_eq!(pagination.validate(5), Some(5));
    }
}
