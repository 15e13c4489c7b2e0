//! Story-by-story position tracking
//!
//! [`StoryCursor`] holds the current position in a fetched article list.
//! Navigation saturates at either end and never wraps.

/// Horizontal drag, in pixels, a swipe must exceed
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

/// Direction of a completed swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeGesture {
    /// Dragged left: advance to the next story
    Next,
    /// Dragged right: go back to the previous story
    Previous,
}

impl SwipeGesture {
    /// Classify a horizontal drag from `start_x` to `end_x`.
    ///
    /// Drags of [`SWIPE_THRESHOLD_PX`] or less are not swipes.
    pub fn from_drag(start_x: f64, end_x: f64) -> Option<Self> {
        let delta = end_x - start_x;
        if delta < -SWIPE_THRESHOLD_PX {
            Some(SwipeGesture::Next)
        } else if delta > SWIPE_THRESHOLD_PX {
            Some(SwipeGesture::Previous)
        } else {
            None
        }
    }
}

/// Position within an article list of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoryCursor {
    index: usize,
    len: usize,
}

impl StoryCursor {
    /// Create a cursor at the first story of a list
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Current index, or `None` when the list is empty
    pub fn index(&self) -> Option<usize> {
        (self.len > 0).then_some(self.index)
    }

    /// Length of the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Advance one story; stays put at the last one
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        if self.index + 1 < self.len {
            self.index += 1;
        }
        Some(self.index)
    }

    /// Go back one story; stays put at the first one
    pub fn prev(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.index = self.index.saturating_sub(1);
        Some(self.index)
    }

    /// Jump to `index`, clamped to the list bounds
    pub fn goto(&mut self, index: usize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.index = index.min(self.len - 1);
        Some(self.index)
    }

    /// Return to the first story
    pub fn reset(&mut self) -> Option<usize> {
        self.index = 0;
        self.index()
    }

    /// Point at a newly fetched list, starting over at its first story
    pub fn replace(&mut self, len: usize) -> Option<usize> {
        self.len = len;
        self.reset()
    }

    /// Apply a swipe gesture
    pub fn swipe(&mut self, gesture: SwipeGesture) -> Option<usize> {
        match gesture {
            SwipeGesture::Next => self.next(),
            SwipeGesture::Previous => self.prev(),
        }
    }

    /// Check if at the first story
    pub fn is_first(&self) -> bool {
        self.len > 0 && self.index == 0
    }

    /// Check if at the last story
    pub fn is_last(&self) -> bool {
        self.len > 0 && self.index + 1 == self.len
    }

    /// One-based position and total, e.g. `(3, 10)` for "3 of 10"
    pub fn position(&self) -> Option<(usize, usize)> {
        self.index().map(|i| (i + 1, self.len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_saturates_at_end() {
        let mut cursor = StoryCursor::new(3);
        assert_eq!(cursor.next(), Some(1));
        assert_eq!(cursor.next(), Some(2));
        assert_eq!(cursor.next(), Some(2));
        assert!(cursor.is_last());
    }

    #[test]
    fn test_prev_saturates_at_start() {
        let mut cursor = StoryCursor::new(3);
        assert_eq!(cursor.prev(), Some(0));
        assert!(cursor.is_first());

        cursor.goto(2);
        assert_eq!(cursor.prev(), Some(1));
    }

    #[test]
    fn test_goto_clamps() {
        let mut cursor = StoryCursor::new(10);
        assert_eq!(cursor.goto(4), Some(4));
        assert_eq!(cursor.goto(99), Some(9));
        assert_eq!(cursor.goto(0), Some(0));
    }

    #[test]
    fn test_replace_resets_to_first() {
        let mut cursor = StoryCursor::new(10);
        cursor.goto(7);

        assert_eq!(cursor.replace(4), Some(0));
        assert_eq!(cursor.len(), 4);
        assert_eq!(cursor.position(), Some((1, 4)));
    }

    #[test]
    fn test_empty_cursor_has_no_index() {
        let mut cursor = StoryCursor::new(0);
        assert_eq!(cursor.index(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.prev(), None);
        assert_eq!(cursor.goto(3), None);
        assert_eq!(cursor.reset(), None);
        assert_eq!(cursor.position(), None);
        assert!(!cursor.is_first());
        assert!(!cursor.is_last());

        cursor.goto(2);
        assert_eq!(cursor.replace(0), None);
    }

    #[test]
    fn test_single_story_is_first_and_last() {
        let mut cursor = StoryCursor::new(1);
        assert!(cursor.is_first() && cursor.is_last());
        assert_eq!(cursor.next(), Some(0));
    }

    #[test]
    fn test_swipe_threshold() {
        assert_eq!(SwipeGesture::from_drag(300.0, 200.0), Some(SwipeGesture::Next));
        assert_eq!(SwipeGesture::from_drag(200.0, 300.0), Some(SwipeGesture::Previous));
        assert_eq!(SwipeGesture::from_drag(200.0, 249.0), None);
        assert_eq!(SwipeGesture::from_drag(200.0, 151.0), None);
        assert_eq!(SwipeGesture::from_drag(100.0, 50.0), None);
        assert_eq!(SwipeGesture::from_drag(100.0, 49.5), Some(SwipeGesture::Next));
    }

    #[test]
    fn test_swipe_moves_cursor() {
        let mut cursor = StoryCursor::new(5);
        assert_eq!(cursor.swipe(SwipeGesture::Next), Some(1));
        assert_eq!(cursor.swipe(SwipeGesture::Previous), Some(0));
        assert_eq!(cursor.swipe(SwipeGesture::Previous), Some(0));
    }
}
