//! The window registry: a hash from X window id to [`WindowRecord`], plus
//! a stack ordered bottom-to-top by X z-order (§3, §4.2).

use indexmap::IndexMap;

use x11rb::protocol::xproto::Window as XWindow;

use crate::window::{WindowRecord, WindowState};

/// Window registry and stack.
///
/// Invariant: a window id is a key of `windows` if and only if its state is
/// not [`WindowState::Destroying`]; a destroyed window is dropped from the
/// hash immediately but stays in `stack` until its fade-out finishes, so it
/// can still be painted (§3).
///
/// `windows`/`destroying` are [`IndexMap`]s rather than `HashMap`s so that
/// `iter_bottom_up`/`iter_top_down` callers who only want insertion order
/// (diagnostics, tests) don't need to consult `stack` at all.
#[derive(Debug, Default)]
pub struct Registry {
    windows: IndexMap<XWindow, WindowRecord>,
    /// Bottom-to-top stack order. May contain ids not present in `windows`
    /// (windows mid-destroy-fade).
    stack: Vec<XWindow>,
    /// Records removed from `windows` but still in `stack`, kept here so
    /// the stack can still render them until the fade-out finishes.
    destroying: IndexMap<XWindow, WindowRecord>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Inserts a new window above `prev_id` (or at the bottom if `prev_id`
    /// is `0`). Idempotent: silently does nothing if `id` is already known.
    pub fn add_window(&mut self, id: XWindow, prev_id: XWindow, record: WindowRecord) {
        if self.windows.contains_key(&id) || self.destroying.contains_key(&id) {
            return;
        }
        let insert_at = if prev_id == 0 {
            0
        } else {
            match self.stack.iter().position(|&w| w == prev_id) {
                Some(idx) => idx + 1,
                None => {
                    tracing::warn!(window = id, above = prev_id, "add_window: unknown prev_id, appending at top");
                    self.stack.len()
                }
            }
        };
        self.stack.insert(insert_at, id);
        self.windows.insert(id, record);
    }

    /// Returns the record for `id`, if present and not [`WindowState::Destroying`].
    pub fn find_window(&self, id: XWindow) -> Option<&WindowRecord> {
        self.windows.get(&id)
    }

    /// Mutable variant of [`Registry::find_window`].
    pub fn find_window_mut(&mut self, id: XWindow) -> Option<&mut WindowRecord> {
        self.windows.get_mut(&id)
    }

    /// Returns the record for `id` regardless of its state, including
    /// windows currently fading out after destruction.
    pub fn find_any(&self, id: XWindow) -> Option<&WindowRecord> {
        self.windows.get(&id).or_else(|| self.destroying.get(&id))
    }

    /// Mutable variant of [`Registry::find_any`], used by preprocess to
    /// advance the fade of windows that are fading out after destruction.
    pub fn find_any_mut(&mut self, id: XWindow) -> Option<&mut WindowRecord> {
        match self.windows.get_mut(&id) {
            Some(w) => Some(w),
            None => self.destroying.get_mut(&id),
        }
    }

    /// Linear scan for the toplevel whose `client_id` matches `client_id`
    /// (§4.2 `find_toplevel`).
    pub fn find_toplevel(&self, client_id: XWindow) -> Option<&WindowRecord> {
        self.windows.values().find(|w| w.client_id == client_id)
    }

    /// Walks the X parent chain of `any_id`, calling `parent_of` at each
    /// step, until a known window is found (§4.2 `find_toplevel2`).
    ///
    /// `parent_of` is supplied by the caller (an external collaborator,
    /// since walking the X tree requires a live connection); it returns
    /// `None` once the root or an error is reached.
    pub fn find_toplevel2(
        &self,
        any_id: XWindow,
        mut parent_of: impl FnMut(XWindow) -> Option<XWindow>,
    ) -> Option<&WindowRecord> {
        let mut current = any_id;
        loop {
            if let Some(w) = self.find_window(current) {
                return Some(w);
            }
            current = parent_of(current)?;
        }
    }

    /// Moves `window` so its upward stack neighbor is `new_above_id` (or to
    /// the top if `new_above_id == 0`). If `new_above_id` is unknown or
    /// `Destroying`, logs and leaves the stack unchanged.
    pub fn restack(&mut self, window: XWindow, new_above_id: XWindow) {
        let Some(from) = self.stack.iter().position(|&w| w == window) else {
            return;
        };
        let target = if new_above_id == 0 {
            self.stack.len() - 1
        } else {
            match self.stack.iter().position(|&w| w == new_above_id) {
                Some(idx) if self.windows.contains_key(&new_above_id) => idx,
                _ => {
                    tracing::warn!(window, above = new_above_id, "restack: unknown or dead above-id, ignoring");
                    return;
                }
            }
        };
        if target == from {
            return;
        }
        let id = self.stack.remove(from);
        let target = if target > from { target - 1 } else { target };
        self.stack.insert(target.min(self.stack.len()), id);
        self.invalidate_ignore_from(from.min(target));
    }

    /// Begins destruction of `id`: removes it from the hash immediately
    /// (so a new window reusing the same id can be created) but keeps it
    /// in the stack, owned by `destroying`, until its fade-out converges.
    pub fn begin_destroy(&mut self, id: XWindow) -> Option<&mut WindowRecord> {
        if let Some(mut record) = self.windows.remove(&id) {
            record.state = WindowState::Destroying;
            self.destroying.insert(id, record);
        }
        self.destroying.get_mut(&id)
    }

    /// Finishes destruction of `id`: unlinks it from the stack and frees
    /// its record. Called once its fade-out has converged to opacity 0.
    pub fn finish_destroy(&mut self, id: XWindow) {
        self.destroying.remove(&id);
        self.stack.retain(|&w| w != id);
    }

    /// Iterates the stack from top to bottom, yielding live and
    /// still-fading-out records.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &WindowRecord> {
        self.stack.iter().rev().filter_map(move |id| self.find_any(*id))
    }

    /// Iterates the stack from bottom to top.
    pub fn iter_bottom_up(&self) -> impl Iterator<Item = &WindowRecord> {
        self.stack.iter().filter_map(move |id| self.find_any(*id))
    }

    /// The number of windows tracked (live, excludes those mid-destroy-fade).
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True if no live windows are tracked.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty() && self.destroying.is_empty()
    }

    /// Invalidates `reg_ignore_valid` for every window at or below stack
    /// index `from` (top-down scan repairs it during preprocess).
    fn invalidate_ignore_from(&mut self, from: usize) {
        for id in self.stack.iter().take(from + 1) {
            if let Some(w) = self.windows.get_mut(id) {
                w.reg_ignore_valid = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Rectangle;

    fn rec(id: XWindow) -> WindowRecord {
        WindowRecord::new(id, Rectangle::from_loc_and_size((0, 0), (100, 100)))
    }

    #[test]
    fn add_window_twice_is_a_noop() {
        let mut r = Registry::new();
        r.add_window(1, 0, rec(1));
        r.add_window(1, 0, rec(1));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn restack_to_current_position_is_a_noop() {
        let mut r = Registry::new();
        r.add_window(1, 0, rec(1));
        r.add_window(2, 1, rec(2));
        let before: Vec<_> = r.iter_bottom_up().map(|w| w.id).collect();
        r.restack(2, 0);
        let after: Vec<_> = r.iter_bottom_up().map(|w| w.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn destroying_window_is_removed_from_hash_but_stays_in_stack() {
        let mut r = Registry::new();
        r.add_window(1, 0, rec(1));
        r.begin_destroy(1);
        assert!(r.find_window(1).is_none());
        assert_eq!(r.iter_bottom_up().count(), 1);
        r.finish_destroy(1);
        assert_eq!(r.iter_bottom_up().count(), 0);
    }

    #[test]
    fn restack_reorders_three_windows() {
        let mut r = Registry::new();
        r.add_window(1, 0, rec(1)); // A bottom
        r.add_window(2, 1, rec(2)); // B above A
        r.add_window(3, 2, rec(3)); // C above B: A < B < C
        r.restack(3, 2); // move C above B -> no-op since already there
        let order: Vec<_> = r.iter_bottom_up().map(|w| w.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn restack_upward_lands_directly_above_target() {
        let mut r = Registry::new();
        r.add_window(1, 0, rec(1)); // A
        r.add_window(2, 1, rec(2)); // B
        r.add_window(3, 2, rec(3)); // C
        r.add_window(4, 3, rec(4)); // D: A < B < C < D
        r.restack(1, 3); // move A so its upward neighbor is C -> B < A < C < D
        let order: Vec<_> = r.iter_bottom_up().map(|w| w.id).collect();
        assert_eq!(order, vec![2, 1, 3, 4]);
    }
}
