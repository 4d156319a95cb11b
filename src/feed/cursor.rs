use crate::api::PageRequest;

/// Page/size/exhausted tracking for one upstream collection.
///
/// One cursor exists per source per feed session. Once a page comes
/// back empty the cursor is exhausted and stops issuing requests until
/// an explicit [`reset`](PageCursor::reset) (pull-to-refresh).
///
/// The cursor never performs I/O itself; the service asks it for the
/// next request and reports back how many items were returned.
#[derive(Debug, Clone)]
pub struct PageCursor {
    page: u32,
    size: u32,
    exhausted: bool,
}

impl PageCursor {
    /// A fresh cursor at page 0. A zero `size` is clamped to 1.
    pub fn new(size: u32) -> Self {
        Self {
            page: 0,
            size: size.max(1),
            exhausted: false,
        }
    }

    /// The next page to request, or `None` once the source is drained.
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.exhausted {
            return None;
        }
        Some(PageRequest {
            page: self.page,
            size: self.size,
        })
    }

    /// Record the outcome of the last requested page. An empty page
    /// marks the source exhausted; anything else moves to the next page.
    pub fn advance(&mut self, returned: usize) {
        if returned == 0 {
            if !self.exhausted {
                tracing::debug!(page = self.page, "Source exhausted");
            }
            self.exhausted = true;
        } else {
            self.page += 1;
        }
    }

    /// Restore the initial state (page 0, not exhausted).
    pub fn reset(&mut self) {
        self.page = 0;
        self.exhausted = false;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}
