//! Reader trait shared by every format.

use crate::IoResult;
use std::path::Path;
use volview_core::Field;

/// A format-specific reader.
///
/// Usage is two-phase: [`open`](FieldReader::open) checks that the resource
/// exists and is recognized, [`load`](FieldReader::load) materializes a
/// numbered field on first request and caches it. Loading is idempotent: a
/// populated field is never re-read.
///
/// # Example
///
/// ```rust,ignore
/// use volview_io::{FieldReader, UMeshReader};
///
/// let mut reader = UMeshReader::new();
/// reader.open("mesh.umesh".as_ref())?;
/// let field = reader.load(0)?;
/// println!("range {:?}", field.value_range());
/// ```
pub trait FieldReader {
    /// Human-readable format name.
    fn format_name(&self) -> &'static str;

    /// Opens a resource. An error means this reader does not accept it.
    fn open(&mut self, path: &Path) -> IoResult<()>;

    /// Number of fields the open resource provides.
    fn num_fields(&self) -> usize {
        1
    }

    /// Index of the field with the given name, for readers whose fields are
    /// named (VTK arrays, FLASH variables).
    fn field_index_of(&self, _name: &str) -> Option<usize> {
        None
    }

    /// Returns field `index`, reading it on first access.
    fn load(&mut self, index: usize) -> IoResult<&Field>;

    /// Field `index` if it has been loaded.
    fn field(&self, index: usize) -> Option<&Field>;

    /// Moves a loaded field out of the reader.
    fn take(&mut self, index: usize) -> Option<Field>;
}

/// Validates a field index against a reader's field count.
pub(crate) fn check_index(index: usize, count: usize) -> IoResult<()> {
    if index >= count {
        return Err(crate::IoError::IndexOutOfRange { index, count });
    }
    Ok(())
}
