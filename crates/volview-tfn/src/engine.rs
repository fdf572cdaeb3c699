//! Transfer function engine: preset catalog, edits, dense sampling.

use crate::interp::interpolate;
use crate::notify::ChangeNotifier;
use crate::point::{ColorPoint, ControlPoint, OpacityPoint};
use crate::preset::{self, TransferFunction};
use crate::{TfnError, TfnResult};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volview_core::ValueRange;

/// Samples produced per refresh unless changed.
pub const DEFAULT_SAMPLE_COUNT: usize = 256;

/// What a transfer function subscriber receives: the data range the samples
/// span and `sample_count` RGBA entries with opacity in `w`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfnUpdate {
    /// Data value range mapped onto `x in [0, 1]`.
    pub value_range: ValueRange,
    /// Sampled `[r, g, b, opacity]`.
    pub samples: Vec<[f32; 4]>,
}

/// Owns the transfer function catalog and turns the active entry into dense
/// color and opacity arrays.
///
/// Control-point edits only apply to editable entries. Value range and
/// opacity scale are view settings and apply to any entry.
#[derive(Debug)]
pub struct TransferFunctionEngine {
    catalog: Vec<TransferFunction>,
    active: usize,
    opacity_scale: f32,
    value_range: ValueRange,
    default_range: ValueRange,
    sample_count: usize,
    notifier: ChangeNotifier<TfnUpdate>,
}

impl Default for TransferFunctionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferFunctionEngine {
    /// Engine over the built-in catalog with Jet active, range `[-1, 1]`.
    pub fn new() -> Self {
        Self {
            catalog: preset::builtin(),
            active: 0,
            opacity_scale: 1.0,
            value_range: ValueRange::new(-1.0, 1.0),
            default_range: ValueRange::new(-1.0, 1.0),
            sample_count: DEFAULT_SAMPLE_COUNT,
            notifier: ChangeNotifier::new(),
        }
    }

    // ---- catalog ----

    /// Catalog names in order.
    pub fn preset_names(&self) -> Vec<&str> {
        self.catalog.iter().map(|t| t.name.as_str()).collect()
    }

    /// Catalog entries.
    pub fn presets(&self) -> &[TransferFunction] {
        &self.catalog
    }

    /// Makes entry `index` active.
    pub fn select_preset(&mut self, index: usize) -> TfnResult<()> {
        if index >= self.catalog.len() {
            return Err(TfnError::PresetOutOfRange {
                index,
                count: self.catalog.len(),
            });
        }
        debug!("transfer function -> {}", self.catalog[index].name);
        self.active = index;
        self.notifier.mark_dirty();
        Ok(())
    }

    /// Makes the entry with the given name active (case-insensitive).
    pub fn select_preset_by_name(&mut self, name: &str) -> TfnResult<usize> {
        let index = self
            .catalog
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| TfnError::UnknownPreset(name.to_string()))?;
        self.select_preset(index)?;
        Ok(index)
    }

    /// Appends an editable entry and returns its index. Does not select it.
    pub fn add_preset(&mut self, mut tfn: TransferFunction) -> TfnResult<usize> {
        tfn.validate()?;
        tfn.editable = true;
        self.catalog.push(tfn);
        Ok(self.catalog.len() - 1)
    }

    /// Active entry.
    pub fn active(&self) -> &TransferFunction {
        &self.catalog[self.active]
    }

    /// Index of the active entry.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Whether the active entry accepts control-point edits.
    pub fn is_editable(&self) -> bool {
        self.active().editable
    }

    fn active_mut(&mut self) -> TfnResult<&mut TransferFunction> {
        let tfn = &mut self.catalog[self.active];
        if !tfn.editable {
            return Err(TfnError::ReadOnly(tfn.name.clone()));
        }
        Ok(tfn)
    }

    // ---- view settings ----

    /// Sets the value range and makes it the default for
    /// [`reset_value_range`](Self::reset_value_range).
    pub fn set_value_range(&mut self, range: ValueRange) -> TfnResult<()> {
        range.validate()?;
        self.value_range = range;
        self.default_range = range;
        self.notifier.mark_dirty();
        Ok(())
    }

    /// Sets the value range, keeping the default.
    pub fn set_value_range_override(&mut self, range: ValueRange) -> TfnResult<()> {
        range.validate()?;
        self.value_range = range;
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

    /// Data value at normalized position `x`: `min + x * (max - min)`.
    pub fn data_value_at(&self, x: f32) -> f32 {
        self.value_range.lerp(x)
    }

    /// Sets the global opacity multiplier. Negative values become 0.
    pub fn set_opacity_scale(&mut self, scale: f32) {
        self.opacity_scale = scale.max(0.0);
        self.notifier.mark_dirty();
    }

    /// Global opacity multiplier.
    pub fn opacity_scale(&self) -> f32 {
        self.opacity_scale
    }

    // ---- control points ----

    /// Inserts a color point in x order; returns its index.
    pub fn add_color_point(&mut self, x: f32, rgb: [f32; 3]) -> TfnResult<usize> {
        check_finite("color point", &[x, rgb[0], rgb[1], rgb[2]])?;
        let tfn = self.active_mut()?;
        let point = ColorPoint {
            x: clamp01(x),
            rgb: rgb.map(clamp01),
        };
        let index = insert_sorted(&mut tfn.colors, point);
        self.notifier.mark_dirty();
        Ok(index)
    }

    /// Moves color point `index` to `x` and recolors it. Returns the x
    /// actually applied.
    pub fn move_color_point(&mut self, index: usize, x: f32, rgb: [f32; 3]) -> TfnResult<f32> {
        check_finite("color point", &[x, rgb[0], rgb[1], rgb[2]])?;
        let tfn = self.active_mut()?;
        let x = move_point(&mut tfn.colors, index, x)?;
        tfn.colors[index].rgb = rgb.map(clamp01);
        self.notifier.mark_dirty();
        Ok(x)
    }

    /// Removes an interior color point.
    pub fn remove_color_point(&mut self, index: usize) -> TfnResult<ColorPoint> {
        let tfn = self.active_mut()?;
        let p = remove_point(&mut tfn.colors, index)?;
        self.notifier.mark_dirty();
        Ok(p)
    }

    /// Inserts an opacity point in x order; returns its index.
    pub fn add_opacity_point(&mut self, x: f32, opacity: f32) -> TfnResult<usize> {
        check_finite("opacity point", &[x, opacity])?;
        let tfn = self.active_mut()?;
        let point = OpacityPoint::new(clamp01(x), clamp01(opacity));
        let index = insert_sorted(&mut tfn.opacities, point);
        self.notifier.mark_dirty();
        Ok(index)
    }

    /// Moves opacity point `index` to `(x, opacity)`. Returns the x actually
    /// applied.
    pub fn move_opacity_point(&mut self, index: usize, x: f32, opacity: f32) -> TfnResult<f32> {
        check_finite("opacity point", &[x, opacity])?;
        let tfn = self.active_mut()?;
        let x = move_point(&mut tfn.opacities, index, x)?;
        tfn.opacities[index].opacity = clamp01(opacity);
        self.notifier.mark_dirty();
        Ok(x)
    }

    /// Removes an interior opacity point.
    pub fn remove_opacity_point(&mut self, index: usize) -> TfnResult<OpacityPoint> {
        let tfn = self.active_mut()?;
        let p = remove_point(&mut tfn.opacities, index)?;
        self.notifier.mark_dirty();
        Ok(p)
    }

    // ---- sampling ----

    /// Evaluates the active entry at `x = i / (n - 1)` for `i in 0..n`.
    ///
    /// Opacity is multiplied by the opacity scale and clamped to `[0, 1]`.
    /// Color and opacity share sample positions.
    pub fn sample(&self, n: usize) -> Vec<[f32; 4]> {
        let tfn = self.active();
        let denom = n.saturating_sub(1).max(1) as f32;
        (0..n)
            .map(|i| {
                let x = i as f32 / denom;
                let [r, g, b] = interpolate(&tfn.colors, x);
                let a = (interpolate(&tfn.opacities, x) * self.opacity_scale).clamp(0.0, 1.0);
                [r, g, b, a]
            })
            .collect()
    }

    /// Samples at the configured sample count.
    pub fn sampled_colors_and_opacities(&self) -> Vec<[f32; 4]> {
        self.sample(self.sample_count)
    }

    /// RGB palette image of `width` texels from the same sampling as
    /// [`sample`](Self::sample).
    pub fn palette(&self, width: usize) -> Vec<[f32; 3]> {
        self.sample(width)
            .into_iter()
            .map(|[r, g, b, _]| [r, g, b])
            .collect()
    }

    /// 8-bit palette image.
    pub fn palette_rgb8(&self, width: usize) -> Vec<[u8; 3]> {
        self.palette(width)
            .into_iter()
            .map(|c| c.map(|v| (clamp01(v) * 255.0).round() as u8))
            .collect()
    }

    /// Sets how many samples updates carry (at least 2).
    pub fn set_sample_count(&mut self, n: usize) {
        let n = n.max(2);
        if n != self.sample_count {
            self.sample_count = n;
            self.notifier.mark_dirty();
        }
    }

    /// Samples per update.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    // ---- notification ----

    /// Current state as a subscriber would receive it.
    pub fn snapshot(&self) -> TfnUpdate {
        TfnUpdate {
            value_range: self.value_range,
            samples: self.sampled_colors_and_opacities(),
        }
    }

    /// Registers the single subscriber, replacing any previous one, and fires
    /// it immediately with the current state.
    pub fn set_update_callback(&mut self, callback: impl FnMut(&TfnUpdate) + 'static) {
        let current = self.snapshot();
        self.notifier.subscribe(Box::new(callback), &current);
    }

    /// Per-frame step: fires the subscriber once if anything changed since
    /// the last refresh. Returns whether it did.
    pub fn refresh(&mut self) -> bool {
        if !self.notifier.is_dirty() {
            return false;
        }
        let update = self.snapshot();
        self.notifier.refresh(&update)
    }

    /// True while a change is pending.
    pub fn is_dirty(&self) -> bool {
        self.notifier.is_dirty()
    }

    /// Polling variant of [`refresh`](Self::refresh): returns the coalesced
    /// update if anything changed and clears the flag.
    pub fn consume(&mut self) -> Option<TfnUpdate> {
        self.notifier.consume().then(|| self.snapshot())
    }
}

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn check_finite(what: &str, values: &[f32]) -> TfnResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(TfnError::Invalid(format!("{} has a non-finite component: {:?}", what, values)))
    }
}

fn insert_sorted<P: ControlPoint>(points: &mut Vec<P>, p: P) -> usize {
    let index = points.partition_point(|q| q.x() <= p.x());
    points.insert(index, p);
    index
}

fn move_point<P: ControlPoint>(points: &mut [P], index: usize, x: f32) -> TfnResult<f32> {
    let count = points.len();
    if index >= count {
        return Err(TfnError::PointOutOfRange { index, count });
    }
    let x = if index == 0 || index == count - 1 {
        points[index].x()
    } else {
        x.clamp(points[index - 1].x(), points[index + 1].x())
    };
    points[index].set_x(x);
    Ok(x)
}

fn remove_point<P: ControlPoint>(points: &mut Vec<P>, index: usize) -> TfnResult<P> {
    let count = points.len();
    if index >= count {
        return Err(TfnError::PointOutOfRange { index, count });
    }
    if index == 0 || index == count - 1 {
        return Err(TfnError::Endpoint(index));
    }
    Ok(points.remove(index))
}
