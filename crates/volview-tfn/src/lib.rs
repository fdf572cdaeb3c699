//! # volview-tfn
//!
//! Control-point engines that turn sparse user edits into the dense arrays a
//! volume renderer consumes.
//!
//! - [`interpolate`] - piecewise-linear evaluation over x-ordered control points
//! - [`TransferFunction`] - named color and opacity control-point sets
//! - [`TransferFunctionEngine`] - preset catalog, value range, opacity scale and
//!   dense sampling, with change notification
//! - [`IsoValueSet`] - four `(threshold, enabled)` slots for isosurfacing
//!
//! # Change notification
//!
//! Both engines start dirty. Every edit marks them dirty again; a per-frame
//! [`refresh`](TransferFunctionEngine::refresh) fires the single registered
//! callback once with the coalesced state and clears the flag. Consumers that
//! prefer polling call [`consume`](TransferFunctionEngine::consume) instead.
//!
//! ```rust
//! use volview_core::ValueRange;
//! use volview_tfn::TransferFunctionEngine;
//!
//! let mut tfn = TransferFunctionEngine::new();
//! tfn.set_value_range(ValueRange::new(0.0, 255.0)).unwrap();
//! let update = tfn.consume().unwrap();
//! assert_eq!(update.samples.len(), 256);
//! assert!(tfn.consume().is_none());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod engine;
mod error;
mod interp;
mod iso;
mod notify;
mod point;
pub mod preset;

pub use engine::{DEFAULT_SAMPLE_COUNT, TfnUpdate, TransferFunctionEngine};
pub use error::{TfnError, TfnResult};
pub use interp::interpolate;
pub use iso::{IsoSlot, IsoValueSet, NUM_ISO_VALUES};
pub use notify::ChangeNotifier;
pub use point::{ColorPoint, ControlPoint, Lerp, OpacityPoint};
pub use preset::TransferFunction;
