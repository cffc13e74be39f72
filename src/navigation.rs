//! Page navigation collaborator.
//!
//! The tracker never touches the page position directly; every fired
//! trigger is forwarded to a [`NavigationSink`]. Keyboard-driven callers
//! share the same [`PageNavigator`] through `Arc<Mutex<_>>`, giving plain
//! last-write-wins semantics between the two sources.

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use crate::gesture::Direction;

/// Receiver of page-turn triggers
pub trait NavigationSink {
    /// Move one page forward; no-op on the last page
    fn advance(&mut self);

    /// Move one page back; no-op on the first page
    fn retreat(&mut self);

    /// Dispatch a fired gesture: right advances, left retreats
    fn turn(&mut self, direction: Direction) {
        match direction {
            Direction::Right => self.advance(),
            Direction::Left => self.retreat(),
        }
    }
}

impl<N: NavigationSink> NavigationSink for Arc<Mutex<N>> {
    fn advance(&mut self) {
        self.lock().unwrap_or_else(PoisonError::into_inner).advance();
    }

    fn retreat(&mut self) {
        self.lock().unwrap_or_else(PoisonError::into_inner).retreat();
    }
}

/// 1-based page position within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNavigator {
    current_page: usize,
    total_pages: usize,
}

impl Default for PageNavigator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PageNavigator {
    /// Start on page 1 of a document with `total_pages` pages
    #[must_use]
    pub const fn new(total_pages: usize) -> Self {
        Self {
            current_page: 1,
            total_pages,
        }
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Jump to `page`, clamped into `1..=total_pages`
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages.max(1));
    }

    /// Change the document length, keeping the current page in range
    pub fn set_total_pages(&mut self, total_pages: usize) {
        self.total_pages = total_pages;
        self.set_current_page(self.current_page);
    }

    pub fn first_page(&mut self) {
        self.current_page = 1;
    }

    pub fn last_page(&mut self) {
        self.current_page = self.total_pages.max(1);
    }
}

impl NavigationSink for PageNavigator {
    fn advance(&mut self) {
        if self.current_page < self.total_pages {
            self.current_page += 1;
            debug!("Advanced to page {}/{}", self.current_page, self.total_pages);
        }
    }

    fn retreat(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
            debug!("Retreated to page {}/{}", self.current_page, self.total_pages);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_retreat_are_bounded() {
        let mut nav = PageNavigator::new(3);
        nav.retreat();
        assert_eq!(nav.current_page(), 1);
        nav.advance();
        nav.advance();
        nav.advance();
        assert_eq!(nav.current_page(), 3);
        nav.retreat();
        assert_eq!(nav.current_page(), 2);
    }

    #[test]
    fn test_turn_maps_direction() {
        let mut nav = PageNavigator::new(5);
        nav.turn(Direction::Right);
        assert_eq!(nav.current_page(), 2);
        nav.turn(Direction::Left);
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn test_set_current_page_clamps() {
        let mut nav = PageNavigator::new(10);
        nav.set_current_page(0);
        assert_eq!(nav.current_page(), 1);
        nav.set_current_page(42);
        assert_eq!(nav.current_page(), 10);
        nav.set_total_pages(4);
        assert_eq!(nav.current_page(), 4);
    }

    #[test]
    fn test_first_and_last_page() {
        let mut nav = PageNavigator::new(7);
        nav.last_page();
        assert_eq!(nav.current_page(), 7);
        nav.first_page();
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn test_empty_document() {
        let mut nav = PageNavigator::default();
        nav.advance();
        nav.last_page();
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn test_shared_navigator() {
        let shared = Arc::new(Mutex::new(PageNavigator::new(3)));
        let mut sink = Arc::clone(&shared);
        sink.advance();
        // Keyboard path mutates the same position
        shared.lock().unwrap().advance();
        assert_eq!(shared.lock().unwrap().current_page(), 3);
    }
}
