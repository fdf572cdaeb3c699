//! Error types for field invariant checks.
//!
//! Fields are plain data, so the only failures at this level are broken
//! invariants: arrays that should be index-parallel but are not, buffers whose
//! length disagrees with their declared dimensions, or indices that point past
//! the end of the vertex array.
//!
//! # Used By
//!
//! - `volview-io` - readers validate what they produced before handing it off
//! - `volview-cli` - the debug layer re-validates every field it receives

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broken field invariants.
#[derive(Debug, Error)]
pub enum Error {
    /// Two arrays that must describe the same elements have different lengths.
    ///
    /// AMR per-block arrays and unstructured per-cell arrays are index-parallel:
    /// entry `i` of each describes the same block or cell.
    #[error("arrays '{left}' ({left_len}) and '{right}' ({right_len}) must be index-parallel")]
    NotParallel {
        /// First array name
        left: &'static str,
        /// First array length
        left_len: usize,
        /// Second array name
        right: &'static str,
        /// Second array length
        right_len: usize,
    },

    /// A buffer holds a different number of values than its dims require.
    #[error("{what}: expected {expected} values, got {actual}")]
    SizeMismatch {
        /// What was being checked
        what: String,
        /// Value count implied by the dims
        expected: usize,
        /// Actual value count
        actual: usize,
    },

    /// A vertex index points past the vertex array.
    #[error("cell {cell} references vertex {vertex}, mesh has {num_vertices} vertices")]
    VertexOutOfRange {
        /// Cell number
        cell: usize,
        /// Offending vertex index
        vertex: u64,
        /// Number of vertices in the mesh
        num_vertices: usize,
    },

    /// A cell type tag outside tetrahedron/hexahedron/wedge/pyramid.
    #[error("unknown cell type tag {0}")]
    UnknownCellType(u8),

    /// A cell's index run extends past the end of the index buffer.
    #[error("cell {cell} index run [{start}, {end}) exceeds index buffer of length {len}")]
    CellOutOfRange {
        /// Cell number
        cell: usize,
        /// First index position
        start: usize,
        /// One past the last index position
        end: usize,
        /// Index buffer length
        len: usize,
    },

    /// Value range is not finite or has min > max.
    #[error("invalid value range [{min}, {max}]")]
    InvalidRange {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// Unsupported cell byte width for a structured grid.
    #[error("unsupported bytes per cell: {0} (expected 1, 2 or 4)")]
    UnsupportedCellWidth(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_parallel() {
        let err = Error::NotParallel {
            left: "blockBounds",
            left_len: 3,
            right: "blockLevel",
            right_len: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("blockBounds"));
        assert!(msg.contains("index-parallel"));
    }

    #[test]
    fn test_display_vertex_out_of_range() {
        let err = Error::VertexOutOfRange {
            cell: 1,
            vertex: 99,
            num_vertices: 8,
        };
        assert!(err.to_string().contains("99"));
    }
}
