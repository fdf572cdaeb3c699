//! # volview-io
//!
//! Readers that turn on-disk volume data into the normalized fields of
//! [`volview_core`]:
//!
//! - **RAW** - headerless flat grids, dims and cell type supplied externally
//!   or guessed from the file name
//! - **FLASH** - block-structured AMR in HDF5 (feature `flash`)
//! - **VTK** - legacy/XML unstructured grids (feature `vtk`, default)
//! - **UMesh** - binary unstructured meshes with optional background grids
//!
//! # Architecture
//!
//! - [`FieldReader`] - open a resource, then lazily load numbered fields
//! - [`Slot`] - explicit unloaded/loaded state behind each reader's cache
//! - [`FormatProbe`] / [`PROBE_ORDER`] - ordered format dispatch by trial
//! - [`open_field`] - high-level entry point that walks the probe order
//! - [`BlockTable`] - places FLASH-style AMR blocks on their level grids
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use volview_io::{open_field, OpenHints};
//!
//! let loaded = open_field("volume_64x64x64_uint8.raw", &OpenHints::guess("volume_64x64x64_uint8.raw"))?;
//! println!("{} field, range {:?}", loaded.kind, loaded.field.value_range());
//! ```
//!
//! # Feature Flags
//!
//! - `vtk` - VTK unstructured grids via `vtkio` (default)
//! - `flash` - FLASH AMR via `hdf5` (needs libhdf5)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod slot;
mod traits;

pub mod amr;
pub mod layout;
pub mod probe;
pub mod raw;
pub mod umesh;

#[cfg(feature = "flash")]
pub mod flash;

#[cfg(feature = "vtk")]
pub mod vtk;

pub use amr::BlockTable;
pub use error::{IoError, IoResult};
pub use layout::{RawLayout, resolve_layout};
pub use probe::{FormatKind, FormatProbe, LoadedField, OpenHints, PROBE_ORDER, open_field};
pub use raw::RawReader;
pub use slot::Slot;
pub use traits::FieldReader;
pub use umesh::UMeshReader;

#[cfg(feature = "flash")]
pub use flash::FlashReader;

#[cfg(feature = "vtk")]
pub use vtk::VtkReader;
