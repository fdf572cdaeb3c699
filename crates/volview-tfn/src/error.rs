//! Transfer function error types.

use thiserror::Error;

/// Result type for transfer function and isovalue operations.
pub type TfnResult<T> = Result<T, TfnError>;

/// Errors from control-point edits, preset selection and preset files.
#[derive(Debug, Error)]
pub enum TfnError {
    /// Edit attempted on a built-in preset.
    #[error("transfer function '{0}' is read-only")]
    ReadOnly(String),

    /// Preset index past the catalog.
    #[error("preset index {index} out of range ({count} presets)")]
    PresetOutOfRange {
        /// Requested index
        index: usize,
        /// Catalog size
        count: usize,
    },

    /// No preset with that name.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// Control-point index past the sequence.
    #[error("control point {index} out of range ({count} points)")]
    PointOutOfRange {
        /// Requested index
        index: usize,
        /// Sequence length
        count: usize,
    },

    /// First and last control points cannot be removed.
    #[error("control point {0} is an endpoint")]
    Endpoint(usize),

    /// Isovalue slot past the fixed capacity.
    #[error("isovalue slot {0} out of range")]
    SlotOutOfRange(usize),

    /// Malformed preset (empty or unordered sequences).
    #[error("invalid transfer function: {0}")]
    Invalid(String),

    /// Value range rejected.
    #[error(transparent)]
    Range(#[from] volview_core::Error),

    /// Preset file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
