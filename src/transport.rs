use crate::domain::PageProps;

/// Query parameters sent to the `employees` resource. A missing `page`
/// means the directory starts over at page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub generation: u64,
    pub outcome: Result<PageProps, String>,
}

/// The page visit capability handed to the model.
///
/// `request_page` must not block; whatever the directory answers comes back
/// through `poll_response`, which the event loop drains once per frame.
pub trait PageTransport {
    fn request_page(&mut self, request: PageRequest);

    fn poll_response(&mut self) -> Option<PageResponse>;
}
