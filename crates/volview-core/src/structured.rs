//! Dense regular 3D grids.

use crate::{Error, Result, ValueRange};
use serde::{Deserialize, Serialize};

/// Cell storage type of a structured grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// 8-bit unsigned normalized.
    U8,
    /// 16-bit unsigned normalized.
    U16,
    /// 32-bit float.
    F32,
}

impl ScalarType {
    /// Bytes per cell: 1, 2 or 4.
    #[inline]
    pub const fn bytes_per_cell(self) -> u32 {
        match self {
            ScalarType::U8 => 1,
            ScalarType::U16 => 2,
            ScalarType::F32 => 4,
        }
    }

    /// Maps a byte width back to a type.
    pub fn from_bytes_per_cell(bytes: u32) -> Result<Self> {
        match bytes {
            1 => Ok(ScalarType::U8),
            2 => Ok(ScalarType::U16),
            4 => Ok(ScalarType::F32),
            other => Err(Error::UnsupportedCellWidth(other)),
        }
    }

    /// Lowercase name as accepted on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::U8 => "uint8",
            ScalarType::U16 => "uint16",
            ScalarType::F32 => "float32",
        }
    }
}

/// Cell buffer of a structured grid.
///
/// Exactly one typed buffer exists, matching the grid's byte width.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredData {
    /// 8-bit cells.
    U8(Vec<u8>),
    /// 16-bit cells.
    U16(Vec<u16>),
    /// 32-bit float cells.
    F32(Vec<f32>),
}

impl StructuredData {
    /// Zero-filled buffer of `len` cells.
    pub fn zeroed(scalar: ScalarType, len: usize) -> Self {
        match scalar {
            ScalarType::U8 => StructuredData::U8(vec![0; len]),
            ScalarType::U16 => StructuredData::U16(vec![0; len]),
            ScalarType::F32 => StructuredData::F32(vec![0.0; len]),
        }
    }

    /// Empty buffer of the given type.
    pub fn empty(scalar: ScalarType) -> Self {
        Self::zeroed(scalar, 0)
    }

    /// Storage type of this buffer.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            StructuredData::U8(_) => ScalarType::U8,
            StructuredData::U16(_) => ScalarType::U16,
            StructuredData::F32(_) => ScalarType::F32,
        }
    }

    /// Number of cells stored.
    pub fn len(&self) -> usize {
        match self {
            StructuredData::U8(v) => v.len(),
            StructuredData::U16(v) => v.len(),
            StructuredData::F32(v) => v.len(),
        }
    }

    /// True if the buffer holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Min/max over the stored cells, in storage units.
    pub fn value_range(&self) -> ValueRange {
        match self {
            StructuredData::U8(v) => ValueRange::from_values(v.iter().copied()),
            StructuredData::U16(v) => ValueRange::from_values(v.iter().copied()),
            StructuredData::F32(v) => ValueRange::from_values(v.iter().copied()),
        }
    }
}

/// Dense regular grid of `dims[0] * dims[1] * dims[2]` cells, x fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredField {
    /// Cell counts along x, y, z.
    pub dims: [usize; 3],
    /// Cell buffer.
    pub data: StructuredData,
    /// Scalar range of the data.
    pub data_range: ValueRange,
}

impl StructuredField {
    /// Creates an unfilled grid: dims and type are known, the buffer is empty.
    pub fn new(dims: [usize; 3], scalar: ScalarType) -> Self {
        Self {
            dims,
            data: StructuredData::empty(scalar),
            data_range: ValueRange::unit(),
        }
    }

    /// Creates a filled grid.
    pub fn with_data(dims: [usize; 3], data: StructuredData, data_range: ValueRange) -> Self {
        Self {
            dims,
            data,
            data_range,
        }
    }

    /// Storage type.
    #[inline]
    pub fn scalar_type(&self) -> ScalarType {
        self.data.scalar_type()
    }

    /// Byte width of one cell (1, 2 or 4).
    #[inline]
    pub fn bytes_per_cell(&self) -> u32 {
        self.scalar_type().bytes_per_cell()
    }

    /// `nx * ny * nz`.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Bytes the filled buffer occupies on disk.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.num_cells() * self.bytes_per_cell() as usize
    }

    /// True iff the buffer matching the byte width has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks buffer size against dims and the data range.
    pub fn validate(&self) -> Result<()> {
        if self.data.len() != self.num_cells() {
            return Err(Error::SizeMismatch {
                what: format!(
                    "structured grid {}x{}x{}",
                    self.dims[0], self.dims[1], self.dims[2]
                ),
                expected: self.num_cells(),
                actual: self.data.len(),
            });
        }
        self.data_range.validate()
    }
}
