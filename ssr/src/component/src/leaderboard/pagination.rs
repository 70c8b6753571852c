use serde::Serialize;

use super::types::Epoch;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FetchMode {
    /// First page of an epoch, replaces the result set
    Reset,
    /// Next page within the epoch, appended to the result set
    Append,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub epoch: Epoch,
    pub offset: u32,
    pub limit: u32,
    pub mode: FetchMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageState {
    /// Start of the next page to request
    pub offset: u32,
    pub limit: u32,
    pub has_more: bool,
}

/// Offset/limit bookkeeping for one epoch at a time.
///
/// At most one page request is outstanding. The offset only moves after a
/// full page arrives, and `has_more` drops to false for the rest of the epoch
/// once a short page is seen.
#[derive(Clone, Debug)]
pub struct Pagination {
    page: PageState,
    in_flight: Option<PageRequest>,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            page: PageState {
                offset: 0,
                limit: limit.max(1),
                has_more: true,
            },
            in_flight: None,
        }
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Rewind to the first page of `epoch`. Any request still in flight is
    /// forgotten and will not match on completion.
    pub fn reset(&mut self, epoch: Epoch) -> PageRequest {
        self.page.offset = 0;
        self.page.has_more = true;

        let request = PageRequest {
            epoch,
            offset: 0,
            limit: self.page.limit,
            mode: FetchMode::Reset,
        };
        self.in_flight = Some(request);
        request
    }

    /// Request the page at the current offset, `None` when exhausted or busy.
    pub fn next_page(&mut self, epoch: Epoch) -> Option<PageRequest> {
        if !self.page.has_more || self.in_flight.is_some() {
            return None;
        }

        let request = PageRequest {
            epoch,
            offset: self.page.offset,
            limit: self.page.limit,
            mode: FetchMode::Append,
        };
        self.in_flight = Some(request);
        Some(request)
    }

    /// Record a successful response. Returns false if `request` is not the
    /// outstanding one.
    pub fn complete(&mut self, request: &PageRequest, received: usize) -> bool {
        if self.in_flight.as_ref() != Some(request) {
            return false;
        }
        self.in_flight = None;

        if received >= request.limit as usize {
            self.page.offset = request.offset + request.limit;
        } else {
            self.page.has_more = false;
        }
        true
    }

    /// Record a failed response, leaving offset and `has_more` untouched.
    pub fn fail(&mut self, request: &PageRequest) -> bool {
        if self.in_flight.as_ref() != Some(request) {
            return false;
        }
        self.in_flight = None;
        true
    }
}
