//! # volview-core
//!
//! Normalized in-memory scalar fields for volume visualization.
//!
//! Every format reader in `volview-io` produces one of three shapes, and every
//! consumer (renderer, validation layer, trace writer) reads them:
//!
//! - [`StructuredField`] - dense regular 3D grid of 8-bit, 16-bit or float cells
//! - [`AmrField`] - forest of axis-aligned adaptive-mesh-refinement blocks
//! - [`UnstructuredField`] - indexed mesh of tets, pyramids, wedges and hexes
//!   with one scalar per vertex
//!
//! [`Field`] wraps the three so callers can pass a loaded dataset around
//! without knowing which reader produced it.
//!
//! ## Crate Structure
//!
//! ```text
//! volview-core (this crate)
//!    ^
//!    |
//!    +-- volview-io  (format readers)
//!    +-- volview-tfn (transfer function + isovalues, uses ValueRange)
//!    +-- volview-cli
//! ```
//!
//! Fields carry no behavior beyond construction helpers and invariant checks.
//! They are filled once by a reader and treated as read-only afterwards.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod amr;
pub mod error;
pub mod field;
pub mod range;
pub mod structured;
pub mod unstructured;

pub use amr::{AmrField, BlockBounds, BlockData};
pub use error::{Error, Result};
pub use field::{Field, FieldKind};
pub use range::ValueRange;
pub use structured::{ScalarType, StructuredData, StructuredField};
pub use unstructured::{CellKind, GridData, GridDomain, UnstructuredField};
