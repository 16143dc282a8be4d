//! Browser-style navigation history: a back stack whose last element is the
//! page currently showing, and a forward stack holding pages left via
//! [`NavigationHistory::go_back`].

use tracing::debug;

/// A visited page: an identifier (which may encode a subtype, e.g.
/// `Artist:<id>`) plus whatever payload the page needs to re-fetch itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<T> {
    pub id: String,
    pub payload: T,
}

#[derive(Debug, Clone)]
pub struct NavigationHistory<T> {
    back: Vec<HistoryEntry<T>>,
    forward: Vec<HistoryEntry<T>>,
}

impl<T> Default for NavigationHistory<T> {
    fn default() -> Self {
        Self {
            back: Vec::new(),
            forward: Vec::new(),
        }
    }
}

impl<T> NavigationHistory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit. Pushing a page with a new identifier clears the
    /// forward stack; re-visiting the current identifier is a no-op.
    ///
    /// Returns `true` if the entry was pushed.
    pub fn visit(&mut self, id: impl Into<String>, payload: T) -> bool {
        let id = id.into();
        if self.back.last().is_some_and(|top| top.id == id) {
            return false;
        }
        debug!(page = %id, "visit");
        self.back.push(HistoryEntry { id, payload });
        self.forward.clear();
        true
    }

    /// Step back. Moves the current page onto the forward stack and returns
    /// the entry that is now current, or `None` when already at the oldest
    /// page.
    pub fn go_back(&mut self) -> Option<&HistoryEntry<T>> {
        if self.back.len() < 2 {
            return None;
        }
        if let Some(top) = self.back.pop() {
            self.forward.push(top);
        }
        let current = self.back.last();
        if let Some(entry) = current {
            debug!(page = %entry.id, "back");
        }
        current
    }

    /// Step forward. Moves the most recently left page back onto the back
    /// stack and returns it, or `None` when the forward stack is empty.
    pub fn go_forward(&mut self) -> Option<&HistoryEntry<T>> {
        let next = self.forward.pop()?;
        debug!(page = %next.id, "forward");
        self.back.push(next);
        self.back.last()
    }

    /// The entry currently showing, if any page has been visited.
    pub fn current(&self) -> Option<&HistoryEntry<T>> {
        self.back.last()
    }

    pub fn can_go_back(&self) -> bool {
        self.back.len() > 1
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.back.len()
    }
}
