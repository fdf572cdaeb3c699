//! Load-once cache cell used by every reader.

/// Explicit `{Unloaded, Loaded}` state of one field.
///
/// A loaded slot is never recomputed: [`Slot::load_with`] only runs its
/// loader while the slot is empty.
#[derive(Debug, Clone, Default)]
pub enum Slot<T> {
    /// Nothing read yet.
    #[default]
    Unloaded,
    /// Populated once, read-only afterwards.
    Loaded(T),
}

impl<T> Slot<T> {
    /// True once a value is cached.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Slot::Loaded(_))
    }

    /// Cached value, `None` while unloaded.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Loaded(v) => Some(v),
            Slot::Unloaded => None,
        }
    }

    /// Returns the cached value, running `load` first if the slot is empty.
    ///
    /// A failed load leaves the slot unloaded.
    pub fn load_with<E, F>(&mut self, load: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Slot::Unloaded = self {
            *self = Slot::Loaded(load()?);
        }
        match self {
            Slot::Loaded(v) => Ok(v),
            Slot::Unloaded => unreachable!("slot populated above"),
        }
    }

    /// Moves the value out, leaving the slot unloaded.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, Slot::Unloaded) {
            Slot::Loaded(v) => Some(v),
            Slot::Unloaded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_once() {
        let mut slot: Slot<u32> = Slot::default();
        assert!(!slot.is_loaded());
        assert_eq!(slot.get(), None);

        let mut calls = 0;
        let v = *slot
            .load_with(|| {
                calls += 1;
                Ok::<_, ()>(7)
            })
            .unwrap();
        assert_eq!(v, 7);

        let v = *slot
            .load_with(|| {
                calls += 1;
                Ok::<_, ()>(9)
            })
            .unwrap();
        assert_eq!(v, 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_failed_load_stays_unloaded() {
        let mut slot: Slot<u32> = Slot::Unloaded;
        assert!(slot.load_with(|| Err("nope")).is_err());
        assert!(!slot.is_loaded());
    }

    #[test]
    fn test_take() {
        let mut slot = Slot::Loaded(3);
        assert_eq!(slot.take(), Some(3));
        assert!(!slot.is_loaded());
    }
}
