//! Page-break decisions
//!
//! The paginator only knows about bands of the canvas. It decides, for a box
//! about to be placed, whether it fits on the current page, has to move to a
//! fresh page, or is taller than any page and must be sliced. The engine
//! owns the actual pages and acts on the decision.

/// Slack for float rounding in device pixels
const FIT_EPSILON: f32 = 0.5;

/// A band of the canvas shown on one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageWindow {
    pub y_start: f32,
    pub y_end: f32,
}

impl PageWindow {
    pub fn capacity(&self) -> f32 {
        self.y_end - self.y_start
    }
}

/// Outcome for a box that is about to be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Place on the current page
    Fits,
    /// Start a new page at the box's top edge, then place it
    MoveToNextPage,
    /// The box is taller than a page; place it from its top and continue
    /// it on as many pages as needed
    Slice,
}

/// Sequence of page windows, in page order
#[derive(Debug, Default)]
pub struct Paginator {
    windows: Vec<PageWindow>,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        self.windows.len()
    }

    pub fn current(&self) -> Option<PageWindow> {
        self.windows.last().copied()
    }

    pub fn windows(&self) -> &[PageWindow] {
        &self.windows
    }

    /// Open a new page showing `capacity` pixels from `y_start`.
    ///
    /// The previous page ends where the new one starts if that is earlier
    /// than its natural end (forced breaks). Returns the new page index.
    pub fn start_page(&mut self, y_start: f32, capacity: f32) -> usize {
        if let Some(previous) = self.windows.last_mut() {
            previous.y_end = previous.y_end.min(y_start).max(previous.y_start);
        }
        self.windows.push(PageWindow {
            y_start,
            y_end: y_start + capacity.max(FIT_EPSILON),
        });
        self.windows.len() - 1
    }

    /// Decide where a box spanning `top..bottom` goes.
    ///
    /// `next_capacity` is the height a fresh page would offer.
    pub fn decide(&self, top: f32, bottom: f32, next_capacity: f32) -> BreakDecision {
        let Some(window) = self.current() else {
            return BreakDecision::MoveToNextPage;
        };
        if bottom <= window.y_end + FIT_EPSILON {
            return BreakDecision::Fits;
        }
        if bottom - top <= next_capacity + FIT_EPSILON {
            return BreakDecision::MoveToNextPage;
        }
        BreakDecision::Slice
    }

    /// Whether a box that must stay whole should be pushed to a new page.
    /// Boxes taller than a page are never pushed.
    pub fn should_keep_together(&self, top: f32, bottom: f32, next_capacity: f32) -> bool {
        match self.current() {
            Some(window) => {
                bottom > window.y_end + FIT_EPSILON
                    && top > window.y_start
                    && bottom - top <= next_capacity + FIT_EPSILON
            }
            None => false,
        }
    }

    /// Page index whose band shows `y`; positions in a skipped gap between
    /// two pages belong to the later page
    pub fn locate(&self, y: f32) -> Option<usize> {
        if self.windows.is_empty() {
            return None;
        }
        let index = self
            .windows
            .iter()
            .position(|w| y < w.y_end)
            .unwrap_or(self.windows.len() - 1);
        Some(index)
    }
}
