//! UMesh binary unstructured mesh reader.
//!
//! # Layout
//!
//! Little-endian throughout. `vec<T>` is a `u64` count followed by the
//! elements.
//!
//! ```text
//! u64            magic            0x234235566, or 0x234235567 with grids
//! vec<[f32;3]>   vertices
//! u64 + bytes    attribute name
//! vec<f32>       per-vertex values
//! vec<[i32;3]>   triangles        (skipped)
//! vec<[i32;4]>   quads            (skipped)
//! vec<[i32;4]>   tets
//! vec<[i32;5]>   pyramids
//! vec<[i32;6]>   wedges
//! vec<[i32;8]>   hexes
//! -- grid magic only --
//! vec<grid>      grids            [f32;6] domain, [i32;3] cells, i32 offset
//! vec<f32>       grid scalars
//! ```

use crate::traits::check_index;
use crate::{FieldReader, IoError, IoResult, Slot};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use volview_core::{CellKind, Field, GridData, GridDomain, UnstructuredField};

/// Magic of a mesh without background grids.
pub const UMESH_MAGIC: u64 = 0x2_3423_5566;
/// Magic of a mesh followed by background grids.
pub const UMESH_MAGIC_WITH_GRIDS: u64 = 0x2_3423_5567;

/// Reader for `.umesh` files.
#[derive(Debug, Default)]
pub struct UMeshReader {
    index_prefixed: bool,
    path: Option<PathBuf>,
    with_grids: bool,
    field: Slot<Field>,
}

impl UMeshReader {
    /// Creates a reader with flat (non-prefixed) cell indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a vertex count before each cell's index run.
    pub fn with_index_prefixed(mut self, prefixed: bool) -> Self {
        self.index_prefixed = prefixed;
        self
    }

    /// True if the open file carries background grids.
    pub fn has_grids(&self) -> bool {
        self.with_grids
    }
}

impl FieldReader for UMeshReader {
    fn format_name(&self) -> &'static str {
        "UMesh"
    }

    fn open(&mut self, path: &Path) -> IoResult<()> {
        let mut file = BufReader::new(File::open(path)?);
        let magic = file.read_u64::<LittleEndian>()?;
        self.with_grids = match magic {
            UMESH_MAGIC => false,
            UMESH_MAGIC_WITH_GRIDS => true,
            other => {
                return Err(IoError::UnsupportedFormat(format!(
                    "not a umesh file (magic {:#x})",
                    other
                )));
            }
        };
        debug!("umesh {} (grids: {})", path.display(), self.with_grids);
        self.path = Some(path.to_path_buf());
        self.field = Slot::Unloaded;
        Ok(())
    }

    fn load(&mut self, index: usize) -> IoResult<&Field> {
        check_index(index, 1)?;
        let Self {
            index_prefixed,
            path,
            field,
            ..
        } = self;
        let path = path.as_deref().ok_or(IoError::NotOpen)?;
        field.load_with(|| {
            let bytes = std::fs::read(path)?;
            let mesh = parse_umesh(&bytes, *index_prefixed)?;
            info!(
                "loaded umesh {}: {} vertices, {} cells, {} grids",
                path.display(),
                mesh.num_vertices(),
                mesh.num_cells(),
                mesh.grid_data.len()
            );
            Ok(Field::Unstructured(mesh))
        })
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

/// Parses a complete UMesh image.
pub fn parse_umesh(bytes: &[u8], index_prefixed: bool) -> IoResult<UnstructuredField> {
    let mut r = Source::new(bytes);

    let with_grids = match r.u64()? {
        UMESH_MAGIC => false,
        UMESH_MAGIC_WITH_GRIDS => true,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "not a umesh file (magic {:#x})",
                other
            )));
        }
    };

    let num_vertices = r.count(12)?;
    let mut positions = Vec::with_capacity(num_vertices);
    for _ in 0..num_vertices {
        positions.push(r.f32s::<3>()?);
    }

    let name_len = r.count(1)?;
    let name = String::from_utf8_lossy(&r.bytes(name_len)?).into_owned();
    let num_values = r.count(4)?;
    let mut values = vec![0f32; num_values];
    r.inner.read_f32_into::<LittleEndian>(&mut values)?;

    if values.len() < positions.len() {
        return Err(IoError::MissingData(format!(
            "per-vertex attribute '{}' has {} values for {} vertices",
            name,
            values.len(),
            positions.len()
        )));
    }

    let mut mesh = UnstructuredField::new(index_prefixed);
    for (p, &v) in positions.iter().zip(&values) {
        mesh.push_vertex(*p, v);
    }

    let triangles = r.count(12)?;
    r.bytes(triangles * 12)?;
    let quads = r.count(16)?;
    r.bytes(quads * 16)?;
    if triangles + quads > 0 {
        debug!("skipping {} triangles, {} quads", triangles, quads);
    }

    read_cells::<4>(&mut r, &mut mesh, CellKind::Tetrahedron)?;
    read_cells::<5>(&mut r, &mut mesh, CellKind::Pyramid)?;
    read_cells::<6>(&mut r, &mut mesh, CellKind::Wedge)?;
    read_cells::<8>(&mut r, &mut mesh, CellKind::Hexahedron)?;

    if with_grids {
        read_grids(&mut r, &mut mesh)?;
    }

    mesh.validate()?;
    Ok(mesh)
}

fn read_cells<const N: usize>(
    r: &mut Source<'_>,
    mesh: &mut UnstructuredField,
    kind: CellKind,
) -> IoResult<()> {
    let count = r.count(N * 4)?;
    let mut verts = [0u64; N];
    for cell in 0..count {
        for v in verts.iter_mut() {
            let i = r.inner.read_i32::<LittleEndian>()?;
            *v = u64::try_from(i).map_err(|_| {
                IoError::InvalidFile(format!("negative vertex index {} in {:?} {}", i, kind, cell))
            })?;
        }
        mesh.push_cell(kind, &verts);
    }
    Ok(())
}

struct GridHeader {
    domain: GridDomain,
    num_cells: [i32; 3],
    offset: i32,
}

fn read_grids(r: &mut Source<'_>, mesh: &mut UnstructuredField) -> IoResult<()> {
    let count = r.count(40)?;
    let mut headers = Vec::with_capacity(count);
    for _ in 0..count {
        let domain = r.f32s::<6>()?;
        let mut num_cells = [0i32; 3];
        r.inner.read_i32_into::<LittleEndian>(&mut num_cells)?;
        let offset = r.inner.read_i32::<LittleEndian>()?;
        headers.push(GridHeader {
            domain,
            num_cells,
            offset,
        });
    }

    let num_scalars = r.count(4)?;
    let mut scalars = vec![0f32; num_scalars];
    r.inner.read_f32_into::<LittleEndian>(&mut scalars)?;

    for (i, g) in headers.into_iter().enumerate() {
        if g.offset < 0 || g.num_cells.iter().any(|&n| n < 0) {
            return Err(IoError::InvalidFile(format!("grid {} has negative extents", i)));
        }
        let dims = g.num_cells.map(|n| n as usize + 1);
        let start = g.offset as usize;
        let len = dims
            .iter()
            .try_fold(1usize, |n, &d| n.checked_mul(d))
            .ok_or_else(|| {
                IoError::InvalidFile(format!("grid {} extents {:?} overflow", i, g.num_cells))
            })?;
        let values = start
            .checked_add(len)
            .and_then(|end| scalars.get(start..end))
            .ok_or_else(|| IoError::DimensionMismatch {
                expected: format!("{} grid scalars from offset {}", len, start),
                actual: format!("{} scalars", scalars.len()),
            })?;
        mesh.push_grid(
            g.domain,
            GridData {
                dims,
                values: values.to_vec(),
            },
        );
    }
    Ok(())
}

/// Bounded cursor over the file image.
struct Source<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> Source<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(bytes),
        }
    }

    fn remaining(&self) -> u64 {
        self.inner.get_ref().len() as u64 - self.inner.position()
    }

    fn u64(&mut self) -> IoResult<u64> {
        Ok(self.inner.read_u64::<LittleEndian>()?)
    }

    /// Reads a `vec` count and checks the elements fit in the file.
    fn count(&mut self, elem_size: usize) -> IoResult<usize> {
        let n = self.u64()?;
        let needed = n.checked_mul(elem_size as u64);
        match needed {
            Some(b) if b <= self.remaining() => Ok(n as usize),
            _ => Err(IoError::InvalidFile(format!(
                "element count {} exceeds remaining {} bytes",
                n,
                self.remaining()
            ))),
        }
    }

    fn bytes(&mut self, n: usize) -> IoResult<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn f32s<const N: usize>(&mut self) -> IoResult<[f32; N]> {
        let mut out = [0f32; N];
        self.inner.read_f32_into::<LittleEndian>(&mut out)?;
        Ok(out)
    }
}
