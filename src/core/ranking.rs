//! Currency picker ranking and keyboard navigation.
//!
//! [`rank`] and [`divider_index`] are pure functions of their inputs.
//! [`PickerSession`] owns the transient query and active index of one
//! open picker.

use crate::core::currency;
use std::sync::Arc;
use tracing::debug;

/// True if `query_lower` is a substring of `code` or `name`, ignoring case.
fn matches(code: &str, name: &str, query_lower: &str) -> bool {
    code.to_lowercase().contains(query_lower) || name.to_lowercase().contains(query_lower)
}

/// Filters and orders `candidates` for display.
///
/// With an empty query every candidate is kept, favorites first, each group
/// sorted by code. With a query, candidates whose code or display name
/// contains it (case-insensitive) are kept in their original order.
pub fn rank<F, N, S>(
    candidates: &[String],
    query: &str,
    is_favorite: F,
    display_name: N,
) -> Vec<String>
where
    F: Fn(&str) -> bool,
    N: Fn(&str) -> S,
    S: AsRef<str>,
{
    if query.is_empty() {
        let mut ranked = candidates.to_vec();
        ranked.sort_by(|a, b| {
            (!is_favorite(a))
                .cmp(&!is_favorite(b))
                .then_with(|| a.cmp(b))
        });
        return ranked;
    }

    let query_lower = query.to_lowercase();
    candidates
        .iter()
        .filter(|code| matches(code, display_name(code).as_ref(), &query_lower))
        .cloned()
        .collect()
}

/// Position of the first non-favorite that directly follows a favorite in an
/// unfiltered list. Filtered lists never get a divider.
pub fn divider_index<F>(ranked: &[String], query: &str, is_favorite: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    if !query.is_empty() {
        return None;
    }
    ranked
        .windows(2)
        .position(|pair| is_favorite(&pair[0]) && !is_favorite(&pair[1]))
        .map(|i| i + 1)
}

/// Background scroll control while a picker is open.
pub trait ScrollLock: Send + Sync {
    fn lock(&self);
    fn unlock(&self);
}

/// Holds the scroll lock until dropped.
pub struct ScrollGuard {
    lock: Arc<dyn ScrollLock>,
}

impl ScrollGuard {
    pub fn acquire(lock: Arc<dyn ScrollLock>) -> Self {
        lock.lock();
        Self { lock }
    }
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

/// No-op lock for front ends without a scrollable background.
pub struct NoScrollLock;

impl ScrollLock for NoScrollLock {
    fn lock(&self) {}
    fn unlock(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKey {
    Next,
    Prev,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// The picker stays open (or the key was ignored).
    Pending,
    Selected(String),
    Cancelled,
}

/// A row of the ranked list, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub code: String,
    pub name: &'static str,
    pub is_favorite: bool,
    pub is_active: bool,
    pub divider_before: bool,
}

pub struct PickerSession {
    candidates: Vec<String>,
    query: String,
    active_index: usize,
    ranked: Vec<String>,
    favorites: Vec<String>,
    scroll_lock: Arc<dyn ScrollLock>,
    guard: Option<ScrollGuard>,
}

impl PickerSession {
    pub fn new(candidates: Vec<String>, scroll_lock: Arc<dyn ScrollLock>) -> Self {
        Self {
            candidates,
            query: String::new(),
            active_index: 0,
            ranked: Vec::new(),
            favorites: Vec::new(),
            scroll_lock,
            guard: None,
        }
    }

    /// Opens the picker with a fresh query, locking background scroll.
    pub fn open(&mut self, favorites: &[String]) {
        self.favorites = favorites.to_vec();
        self.query.clear();
        self.active_index = 0;
        self.rerank();
        if self.guard.is_none() {
            self.guard = Some(ScrollGuard::acquire(Arc::clone(&self.scroll_lock)));
        }
        debug!(count = self.ranked.len(), "Picker opened");
    }

    pub fn close(&mut self) {
        if self.guard.take().is_some() {
            debug!("Picker closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn ranked(&self) -> &[String] {
        &self.ranked
    }

    pub fn active(&self) -> Option<&str> {
        self.ranked.get(self.active_index).map(String::as_str)
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.active_index = 0;
        self.rerank();
    }

    /// Re-ranks after favorites changed, keeping the active index in range.
    pub fn set_favorites(&mut self, favorites: &[String]) {
        self.favorites = favorites.to_vec();
        self.rerank();
        if self.active_index >= self.ranked.len() {
            self.active_index = 0;
        }
    }

    /// Points at the entry at `index`. Out-of-range positions are ignored.
    pub fn hover(&mut self, index: usize) {
        if self.is_open() && index < self.ranked.len() {
            self.active_index = index;
        }
    }

    /// Commits the entry at `index`, as a pointer click would.
    pub fn select(&mut self, index: usize) -> PickerOutcome {
        self.hover(index);
        if self.is_open() && index < self.ranked.len() {
            return self.handle(PickerKey::Confirm);
        }
        PickerOutcome::Pending
    }

    /// Applies a navigation key. Keys are ignored while the picker is closed.
    pub fn handle(&mut self, key: PickerKey) -> PickerOutcome {
        if !self.is_open() {
            return PickerOutcome::Pending;
        }
        let len = self.ranked.len();
        match key {
            PickerKey::Next => {
                if len > 0 {
                    self.active_index = (self.active_index + 1) % len;
                }
                PickerOutcome::Pending
            }
            PickerKey::Prev => {
                if len > 0 {
                    self.active_index = (self.active_index + len - 1) % len;
                }
                PickerOutcome::Pending
            }
            PickerKey::Confirm => match self.ranked.get(self.active_index).cloned() {
                Some(code) => {
                    self.close();
                    PickerOutcome::Selected(code)
                }
                None => PickerOutcome::Pending,
            },
            PickerKey::Cancel => {
                self.close();
                PickerOutcome::Cancelled
            }
        }
    }

    pub fn entries(&self) -> Vec<PickerEntry> {
        let divider = divider_index(&self.ranked, &self.query, |c| self.is_favorite(c));
        self.ranked
            .iter()
            .enumerate()
            .map(|(i, code)| PickerEntry {
                code: code.clone(),
                name: currency::display_name(code),
                is_favorite: self.is_favorite(code),
                is_active: i == self.active_index,
                divider_before: divider == Some(i),
            })
            .collect()
    }

    fn is_favorite(&self, code: &str) -> bool {
        self.favorites.iter().any(|f| f == code)
    }

    fn rerank(&mut self) {
        self.ranked = rank(
            &self.candidates,
            &self.query,
            |c| self.is_favorite(c),
            currency::display_name,
        );
    }
}
