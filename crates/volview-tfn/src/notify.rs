//! Dirty flag plus a single replaceable subscriber.

use std::fmt;

/// Change tracker shared by the transfer function and isovalue engines.
///
/// The owner marks it dirty on every edit and hands it a fresh snapshot when
/// refreshing, so one refresh reports all edits since the last one.
pub struct ChangeNotifier<T> {
    dirty: bool,
    callback: Option<Box<dyn FnMut(&T)>>,
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("dirty", &self.dirty)
            .field("subscribed", &self.callback.is_some())
            .finish()
    }
}

impl<T> ChangeNotifier<T> {
    /// New notifier; starts dirty so the first refresh always reports.
    pub fn new() -> Self {
        Self {
            dirty: true,
            callback: None,
        }
    }

    /// Flags a pending change.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// True while a change is pending.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True if a subscriber is registered.
    #[inline]
    pub fn has_subscriber(&self) -> bool {
        self.callback.is_some()
    }

    /// Replaces the subscriber and fires it once with `current`.
    ///
    /// The dirty flag is left as is.
    pub fn subscribe(&mut self, callback: Box<dyn FnMut(&T)>, current: &T) {
        let cb = self.callback.insert(callback);
        cb(current);
    }

    /// Fires the subscriber with `snapshot` if dirty, then clears the flag.
    /// Returns whether a change was pending.
    pub fn refresh(&mut self, snapshot: &T) -> bool {
        if !self.dirty {
            return false;
        }
        if let Some(cb) = self.callback.as_mut() {
            cb(snapshot);
        }
        self.dirty = false;
        true
    }

    /// Clears the flag without firing. Returns whether a change was pending.
    pub fn consume(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
