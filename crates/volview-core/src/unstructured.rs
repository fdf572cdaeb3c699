//! Unstructured meshes with per-vertex scalars.
//!
//! Cells are stored as runs in one shared index buffer. `cell_index[i]` is
//! where cell `i`'s run begins, `cell_type[i]` says how many vertices it has.
//! When `index_prefixed` is set every run starts with its own vertex count,
//! as in legacy VTK cell lists.

use crate::{Error, Result, ValueRange};

/// Cell topology, tagged with the VTK/VKL cell type numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellKind {
    /// 4 vertices.
    Tetrahedron = 10,
    /// 8 vertices.
    Hexahedron = 12,
    /// 6 vertices.
    Wedge = 13,
    /// 5 vertices.
    Pyramid = 14,
}

impl CellKind {
    /// Numeric type tag stored in `cell_type`.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a type tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            10 => Some(CellKind::Tetrahedron),
            12 => Some(CellKind::Hexahedron),
            13 => Some(CellKind::Wedge),
            14 => Some(CellKind::Pyramid),
            _ => None,
        }
    }

    /// Corner count.
    #[inline]
    pub const fn vertex_count(self) -> usize {
        match self {
            CellKind::Tetrahedron => 4,
            CellKind::Pyramid => 5,
            CellKind::Wedge => 6,
            CellKind::Hexahedron => 8,
        }
    }
}

/// World-space box of a background grid: `(lo.x, lo.y, lo.z, hi.x, hi.y, hi.z)`.
pub type GridDomain = [f32; 6];

/// Vertex-centered values of one background grid, x fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct GridData {
    /// Sample counts along x, y, z.
    pub dims: [usize; 3],
    /// `dims[0] * dims[1] * dims[2]` values.
    pub values: Vec<f32>,
}

/// Indexed mesh with one scalar per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstructuredField {
    /// Vertex positions.
    pub vertex_position: Vec<[f32; 3]>,
    /// One scalar per vertex.
    pub vertex_data: Vec<f32>,
    /// Flattened cell vertex runs.
    pub index: Vec<u64>,
    /// Each run starts with its vertex count.
    pub index_prefixed: bool,
    /// Start of each cell's run in `index`.
    pub cell_index: Vec<u64>,
    /// Type tag per cell, see [`CellKind`].
    pub cell_type: Vec<u8>,
    /// Min/max over `vertex_data`.
    pub data_range: ValueRange,
    /// Optional background grid domains.
    pub grid_domains: Vec<GridDomain>,
    /// Optional background grid values, parallel to `grid_domains`.
    pub grid_data: Vec<GridData>,
}

impl Default for UnstructuredField {
    fn default() -> Self {
        Self::new(false)
    }
}

impl UnstructuredField {
    /// Empty mesh.
    pub fn new(index_prefixed: bool) -> Self {
        Self {
            vertex_position: Vec::new(),
            vertex_data: Vec::new(),
            index: Vec::new(),
            index_prefixed,
            cell_index: Vec::new(),
            cell_type: Vec::new(),
            data_range: ValueRange::empty(),
            grid_domains: Vec::new(),
            grid_data: Vec::new(),
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertex_position.len()
    }

    /// Number of cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cell_index.len()
    }

    /// Appends a vertex and its scalar, extending the data range.
    pub fn push_vertex(&mut self, position: [f32; 3], value: f32) {
        self.vertex_position.push(position);
        self.vertex_data.push(value);
        self.data_range.extend(value);
    }

    /// Appends a cell. Vertices are stored in the order given.
    pub fn push_cell(&mut self, kind: CellKind, vertices: &[u64]) {
        self.cell_type.push(kind.tag());
        self.cell_index.push(self.index.len() as u64);
        if self.index_prefixed {
            self.index.push(vertices.len() as u64);
        }
        self.index.extend_from_slice(vertices);
    }

    /// Adds a background grid.
    pub fn push_grid(&mut self, domain: GridDomain, data: GridData) {
        self.grid_domains.push(domain);
        self.grid_data.push(data);
    }

    /// True if the mesh carries background grids.
    #[inline]
    pub fn has_grids(&self) -> bool {
        !self.grid_data.is_empty() && !self.grid_domains.is_empty()
    }

    /// Vertex run of cell `i`, without the count prefix.
    pub fn cell_vertices(&self, i: usize) -> Option<&[u64]> {
        let start = *self.cell_index.get(i)? as usize;
        let (start, count) = if self.index_prefixed {
            (start + 1, *self.index.get(start)? as usize)
        } else {
            (start, CellKind::from_tag(*self.cell_type.get(i)?)?.vertex_count())
        };
        self.index.get(start..start + count)
    }

    /// Checks array parallelism, cell runs and vertex indices.
    pub fn validate(&self) -> Result<()> {
        if self.vertex_position.len() != self.vertex_data.len() {
            return Err(Error::NotParallel {
                left: "vertex.position",
                left_len: self.vertex_position.len(),
                right: "vertex.data",
                right_len: self.vertex_data.len(),
            });
        }
        if self.cell_index.len() != self.cell_type.len() {
            return Err(Error::NotParallel {
                left: "cell.index",
                left_len: self.cell_index.len(),
                right: "cell.type",
                right_len: self.cell_type.len(),
            });
        }
        if self.grid_domains.len() != self.grid_data.len() {
            return Err(Error::NotParallel {
                left: "grid.domains",
                left_len: self.grid_domains.len(),
                right: "grid.data",
                right_len: self.grid_data.len(),
            });
        }

        for (cell, (&start, &tag)) in self.cell_index.iter().zip(&self.cell_type).enumerate() {
            let kind = CellKind::from_tag(tag).ok_or(Error::UnknownCellType(tag))?;
            let start = start as usize;
            let (first, count) = if self.index_prefixed {
                let count = self.index.get(start).copied().ok_or(Error::CellOutOfRange {
                    cell,
                    start,
                    end: start + 1,
                    len: self.index.len(),
                })?;
                (start + 1, count as usize)
            } else {
                (start, kind.vertex_count())
            };
            let run = self.index.get(first..first + count).ok_or(Error::CellOutOfRange {
                cell,
                start: first,
                end: first + count,
                len: self.index.len(),
            })?;
            if let Some(&vertex) = run.iter().find(|&&v| v as usize >= self.num_vertices()) {
                return Err(Error::VertexOutOfRange {
                    cell,
                    vertex,
                    num_vertices: self.num_vertices(),
                });
            }
        }

        for (i, grid) in self.grid_data.iter().enumerate() {
            let expected = grid.dims[0] * grid.dims[1] * grid.dims[2];
            if grid.values.len() != expected {
                return Err(Error::SizeMismatch {
                    what: format!("background grid {}", i),
                    expected,
                    actual: grid.values.len(),
                });
            }
        }

        if !self.vertex_data.is_empty() {
            self.data_range.validate()?;
        }
        Ok(())
    }
}
