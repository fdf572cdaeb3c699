//! Headerless raw grid reader.
//!
//! Cells are little-endian, x fastest. The layout is not stored in the file
//! and must be supplied as a [`RawLayout`].

use crate::traits::check_index;
use crate::{FieldReader, IoError, IoResult, RawLayout, Slot};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use volview_core::{Field, ScalarType, StructuredData, StructuredField, ValueRange};

/// Reader for flat `.raw` grids.
#[derive(Debug)]
pub struct RawReader {
    layout: RawLayout,
    compute_range: bool,
    path: Option<PathBuf>,
    field: Slot<Field>,
}

impl RawReader {
    /// Creates a reader for grids of the given layout.
    pub fn new(layout: RawLayout) -> Self {
        Self {
            layout,
            compute_range: false,
            path: None,
            field: Slot::Unloaded,
        }
    }

    /// Derive the data range from the cells instead of reporting `[0, 1]`.
    pub fn with_computed_range(mut self, compute: bool) -> Self {
        self.compute_range = compute;
        self
    }

    /// Layout the reader expects.
    pub fn layout(&self) -> RawLayout {
        self.layout
    }
}

fn overflow(layout: &RawLayout) -> IoError {
    IoError::DimensionMismatch {
        expected: "a grid size that fits in memory".into(),
        actual: format!(
            "{}x{}x{} {} cells",
            layout.dims[0],
            layout.dims[1],
            layout.dims[2],
            layout.scalar.name()
        ),
    }
}

fn read_grid(path: &Path, layout: RawLayout, compute_range: bool) -> IoResult<Field> {
    let RawLayout { dims, scalar } = layout;
    let n = layout.num_cells().ok_or_else(|| overflow(&layout))?;
    let mut reader = BufReader::new(File::open(path)?);

    let data = match scalar {
        ScalarType::U8 => {
            let mut buf = vec![0u8; n];
            reader.read_exact(&mut buf)?;
            StructuredData::U8(buf)
        }
        ScalarType::U16 => {
            let mut buf = vec![0u16; n];
            reader.read_u16_into::<LittleEndian>(&mut buf)?;
            StructuredData::U16(buf)
        }
        ScalarType::F32 => {
            let mut buf = vec![0f32; n];
            reader.read_f32_into::<LittleEndian>(&mut buf)?;
            StructuredData::F32(buf)
        }
    };

    let range = if compute_range {
        data.value_range()
    } else {
        ValueRange::unit()
    };

    let field = StructuredField::with_data(dims, data, range);
    field.validate()?;
    info!(
        "loaded raw grid {}x{}x{} {} from {}",
        dims[0],
        dims[1],
        dims[2],
        scalar.name(),
        path.display()
    );
    Ok(Field::Structured(field))
}

impl FieldReader for RawReader {
    fn format_name(&self) -> &'static str {
        "RAW"
    }

    fn open(&mut self, path: &Path) -> IoResult<()> {
        let len = std::fs::metadata(path)?.len();
        let expected = self
            .layout
            .byte_len()
            .ok_or_else(|| overflow(&self.layout))?;
        if expected == 0 {
            return Err(IoError::Parse("raw layout has zero cells".into()));
        }
        if len < expected {
            return Err(IoError::DimensionMismatch {
                expected: format!("{} bytes", expected),
                actual: format!("{} bytes", len),
            });
        }
        if len > expected {
            debug!(
                "{} has {} trailing bytes past the grid",
                path.display(),
                len - expected
            );
        }
        self.path = Some(path.to_path_buf());
        self.field = Slot::Unloaded;
        Ok(())
    }

    fn load(&mut self, index: usize) -> IoResult<&Field> {
        check_index(index, 1)?;
        let Self {
            layout,
            compute_range,
            path,
            field,
        } = self;
        let path = path.as_deref().ok_or(IoError::NotOpen)?;
        field.load_with(|| read_grid(path, *layout, *compute_range))
    }

    fn field(&self, index: usize) -> Option<&Field> {
        (index == 0).then(|| self.field.get()).flatten()
    }

    fn take(&mut self, index: usize) -> Option<Field> {
        if index != 0 {
            return None;
        }
        self.field.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f
    }

    #[test]
    fn test_load_not_open() {
        let mut r = RawReader::new(RawLayout::new([2, 2, 2], ScalarType::U8));
        assert!(matches!(r.load(0), Err(IoError::NotOpen)));
    }

    #[test]
    fn test_u16_little_endian() {
        let bytes: Vec<u8> = [1u16, 256, 513, 65535]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let f = write_tmp(&bytes);
        let mut r = RawReader::new(RawLayout::new([2, 2, 1], ScalarType::U16))
            .with_computed_range(true);
        r.open(f.path()).unwrap();
        let field = r.load(0).unwrap().as_structured().unwrap().clone();
        assert_eq!(field.data, StructuredData::U16(vec![1, 256, 513, 65535]));
        assert_eq!(field.data_range, ValueRange::new(1.0, 65535.0));
    }

    #[test]
    fn test_short_file_rejected() {
        let f = write_tmp(&[0u8; 7]);
        let mut r = RawReader::new(RawLayout::new([2, 2, 2], ScalarType::U8));
        assert!(matches!(
            r.open(f.path()),
            Err(IoError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let f = write_tmp(&[0u8; 8]);
        let mut r = RawReader::new(RawLayout::new([2, 2, 2], ScalarType::U8));
        r.open(f.path()).unwrap();
        assert!(matches!(
            r.load(1),
            Err(IoError::IndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_overflowing_dims_rejected() {
        let f = write_tmp(&[0u8; 8]);
        let mut r = RawReader::new(RawLayout::new([usize::MAX, 2, 2], ScalarType::F32));
        assert!(matches!(
            r.open(f.path()),
            Err(IoError::DimensionMismatch { .. })
        ));
    }
}
