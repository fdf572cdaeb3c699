//! Isovalue slots for isosurface rendering.

use crate::notify::ChangeNotifier;
use crate::{TfnError, TfnResult};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volview_core::ValueRange;

/// Number of isovalue slots.
pub const NUM_ISO_VALUES: usize = 4;

/// One `(threshold, enabled)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IsoSlot {
    /// Threshold in data units.
    pub value: f32,
    /// Whether the threshold is rendered.
    pub enabled: bool,
}

/// Fixed set of isovalues. Subscribers receive the enabled thresholds in
/// slot order.
#[derive(Debug)]
pub struct IsoValueSet {
    slots: [IsoSlot; NUM_ISO_VALUES],
    value_range: ValueRange,
    default_range: ValueRange,
    notifier: ChangeNotifier<Vec<f32>>,
}

impl Default for IsoValueSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IsoValueSet {
    /// All slots `0.0`, disabled; range `[-1, 1]`.
    pub fn new() -> Self {
        Self {
            slots: [IsoSlot::default(); NUM_ISO_VALUES],
            value_range: ValueRange::new(-1.0, 1.0),
            default_range: ValueRange::new(-1.0, 1.0),
            notifier: ChangeNotifier::new(),
        }
    }

    /// All slots.
    pub fn slots(&self) -> &[IsoSlot; NUM_ISO_VALUES] {
        &self.slots
    }

    /// Slot `index`.
    pub fn slot(&self, index: usize) -> TfnResult<IsoSlot> {
        self.slots
            .get(index)
            .copied()
            .ok_or(TfnError::SlotOutOfRange(index))
    }

    fn slot_mut(&mut self, index: usize) -> TfnResult<&mut IsoSlot> {
        self.slots
            .get_mut(index)
            .ok_or(TfnError::SlotOutOfRange(index))
    }

    /// Sets a threshold, clamped to the value range. Returns the stored value.
    pub fn set_value(&mut self, index: usize, value: f32) -> TfnResult<f32> {
        let value = self.value_range.clamp(value);
        self.slot_mut(index)?.value = value;
        self.notifier.mark_dirty();
        Ok(value)
    }

    /// Enables or disables a slot.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> TfnResult<()> {
        self.slot_mut(index)?.enabled = enabled;
        self.notifier.mark_dirty();
        Ok(())
    }

    /// Flips a slot's enabled flag; returns the new state.
    pub fn toggle(&mut self, index: usize) -> TfnResult<bool> {
        let slot = self.slot_mut(index)?;
        slot.enabled = !slot.enabled;
        let enabled = slot.enabled;
        self.notifier.mark_dirty();
        Ok(enabled)
    }

    /// Enabled thresholds in slot order.
    pub fn enabled_values(&self) -> Vec<f32> {
        self.slots
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.value)
            .collect()
    }

    /// Sets the value range and makes it the default. Stored thresholds are
    /// kept as they are.
    pub fn set_value_range(&mut self, range: ValueRange) -> TfnResult<()> {
        range.validate()?;
        debug!("isovalue range [{}, {}]", range.min, range.max);
        self.value_range = range;
        self.default_range = range;
        self.notifier.mark_dirty();
        Ok(())
    }

    /// Restores the default value range.
    pub fn reset_value_range(&mut self) {
        self.value_range = self.default_range;
        self.notifier.mark_dirty();
    }

    /// Current value range.
    pub fn value_range(&self) -> ValueRange {
        self.value_range
    }

    /// Drag increment for threshold editing: 1/128 of the range.
    pub fn drag_step(&self) -> f32 {
        self.value_range.width() / 128.0
    }

    /// Registers the single subscriber and fires it with the current values.
    pub fn set_update_callback(&mut self, callback: impl FnMut(&Vec<f32>) + 'static) {
        let current = self.enabled_values();
        self.notifier.subscribe(Box::new(callback), &current);
    }

    /// Fires the subscriber once if anything changed.
    pub fn refresh(&mut self) -> bool {
        if !self.notifier.is_dirty() {
            return false;
        }
        let values = self.enabled_values();
        self.notifier.refresh(&values)
    }

    /// True while a change is pending.
    pub fn is_dirty(&self) -> bool {
        self.notifier.is_dirty()
    }

    /// Polling variant of [`refresh`](Self::refresh).
    pub fn consume(&mut self) -> Option<Vec<f32>> {
        self.notifier.consume().then(|| self.enabled_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state() {
        let iso = IsoValueSet::new();
        assert!(iso.slots().iter().all(|s| *s == IsoSlot::default()));
        assert!(iso.enabled_values().is_empty());
        assert!(iso.is_dirty());
        assert_relative_eq!(iso.drag_step(), 2.0 / 128.0);
    }

    #[test]
    fn test_filter_keeps_slot_order() {
        let mut iso = IsoValueSet::new();
        iso.set_value_range(ValueRange::new(0.0, 10.0)).unwrap();
        for (i, (v, on)) in [(1.0, false), (2.0, true), (3.0, true), (4.0, false)]
            .into_iter()
            .enumerate()
        {
            iso.set_value(i, v).unwrap();
            iso.set_enabled(i, on).unwrap();
        }
        assert_eq!(iso.enabled_values(), vec![2.0, 3.0]);

        iso.set_value(3, 0.5).unwrap();
        assert!(iso.toggle(3).unwrap());
        assert_eq!(iso.enabled_values(), vec![2.0, 3.0, 0.5]);
    }

    #[test]
    fn test_values_clamped() {
        let mut iso = IsoValueSet::new();
        assert_eq!(iso.set_value(0, 5.0).unwrap(), 1.0);
        assert_eq!(iso.set_value(0, -5.0).unwrap(), -1.0);
        assert!(matches!(iso.set_value(4, 0.0), Err(TfnError::SlotOutOfRange(4))));
        assert!(iso.slot(4).is_err());
    }

    #[test]
    fn test_range_change_keeps_values() {
        let mut iso = IsoValueSet::new();
        iso.set_value(0, 0.9).unwrap();
        iso.set_value_range(ValueRange::new(0.0, 0.5)).unwrap();
        assert_eq!(iso.slot(0).unwrap().value, 0.9);
    }
}
