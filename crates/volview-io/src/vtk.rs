//! VTK unstructured grid reader (legacy and XML) via `vtkio`.
//!
//! Every single-component point-data array is exposed as one field. Cells
//! other than tetrahedra, hexahedra, wedges and pyramids are skipped.

use crate::traits::check_index;
use crate::{FieldReader, IoError, IoResult, Slot};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use volview_core::{CellKind, Field, UnstructuredField};
use vtkio::model::{
    Attribute, CellType, DataSet, ElementType, IOBuffer, UnstructuredGridPiece, VertexNumbers,
};
use vtkio::Vtk;

/// Reader for `.vtk` / `.vtu` unstructured grids.
#[derive(Debug, Default)]
pub struct VtkReader {
    index_prefixed: bool,
    path: Option<PathBuf>,
    grid: Option<UnstructuredGridPiece>,
    names: Vec<String>,
    fields: Vec<Slot<Field>>,
}

impl VtkReader {
    /// Creates a reader with flat (non-prefixed) cell indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a vertex count before each cell's index run.
    pub fn with_index_prefixed(mut self, prefixed: bool) -> Self {
        self.index_prefixed = prefixed;
        self
    }

    /// Names of the point scalar arrays, one per field.
    pub fn field_names(&self) -> &[String] {
        &self.names
    }
}

impl FieldReader for VtkReader {
    fn format_name(&self) -> &'static str {
        "VTK"
    }

    fn open(&mut self, path: &Path) -> IoResult<()> {
        let vtk = Vtk::import(path)
            .map_err(|e| IoError::UnsupportedFormat(format!("vtk: {}", e)))?;

        let DataSet::UnstructuredGrid { pieces, .. } = vtk.data else {
            return Err(IoError::UnsupportedFormat(
                "vtk dataset is not an unstructured grid".into(),
            ));
        };
        let piece = pieces
            .into_iter()
            .next()
            .ok_or_else(|| IoError::MissingData("unstructured grid has no pieces".into()))?
            .into_loaded_piece_data(Some(path))
            .map_err(|e| IoError::InvalidFile(format!("vtk piece: {}", e)))?;

        let names: Vec<String> = point_scalars(&piece)
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect();
        if names.is_empty() {
            return Err(IoError::MissingData(
                "no point scalar arrays in vtk grid".into(),
            ));
        }
        debug!("vtk {} scalar arrays: {:?}", path.display(), names);

        self.fields = names.iter().map(|_| Slot::Unloaded).collect();
        self.names = names;
        self.grid = Some(piece);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn num_fields(&self) -> usize {
        self.names.len()
    }

    fn field_index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn load(&mut self, index: usize) -> IoResult<&Field> {
        let Self {
            index_prefixed,
            path,
            grid,
            names,
            fields,
        } = self;
        let grid = grid.as_ref().ok_or(IoError::NotOpen)?;
        check_index(index, fields.len())?;
        let name = &names[index];
        let path = path.as_deref().unwrap_or(Path::new(""));
        fields[index].load_with(|| {
            let mesh = build_field(grid, index, *index_prefixed)?;
            info!(
                "loaded vtk field '{}' from {}: {} vertices, {} cells",
                name,
                path.display(),
                mesh.num_vertices(),
                mesh.num_cells()
            );
            Ok(Field::Unstructured(mesh))
        })
    }

    fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index).and_then(Slot::get)
    }

    fn take(&mut self, index: usize) -> Option<Field> {
        self.fields.get_mut(index).and_then(Slot::take)
    }
}

/// Single-component point arrays, in file order.
fn point_scalars(piece: &UnstructuredGridPiece) -> Vec<(&str, &IOBuffer)> {
    let mut out = Vec::new();
    for attr in &piece.data.point {
        match attr {
            Attribute::DataArray(arr) => {
                let scalar = matches!(
                    arr.elem,
                    ElementType::Scalars { num_comp: 1, .. } | ElementType::Generic(1)
                );
                if scalar {
                    out.push((arr.name.as_str(), &arr.data));
                }
            }
            Attribute::Field { data_array, .. } => {
                for arr in data_array.iter().filter(|a| a.elem == 1) {
                    out.push((arr.name.as_str(), &arr.data));
                }
            }
        }
    }
    out
}

fn cell_kind(ty: &CellType) -> Option<CellKind> {
    match ty {
        CellType::Tetra => Some(CellKind::Tetrahedron),
        CellType::Hexahedron => Some(CellKind::Hexahedron),
        CellType::Wedge => Some(CellKind::Wedge),
        CellType::Pyramid => Some(CellKind::Pyramid),
        _ => None,
    }
}

fn build_field(
    piece: &UnstructuredGridPiece,
    index: usize,
    prefixed: bool,
) -> IoResult<UnstructuredField> {
    let points: Vec<f32> = piece
        .points
        .clone()
        .cast_into::<f32>()
        .ok_or_else(|| IoError::InvalidFile("vtk points are not numeric".into()))?;
    if points.len() % 3 != 0 {
        return Err(IoError::InvalidFile(format!(
            "vtk point buffer length {} is not a multiple of 3",
            points.len()
        )));
    }

    let scalars = point_scalars(piece);
    let (name, buffer) = scalars
        .get(index)
        .ok_or(IoError::IndexOutOfRange {
            index,
            count: scalars.len(),
        })?;
    let values: Vec<f32> = (*buffer)
        .clone()
        .cast_into::<f32>()
        .ok_or_else(|| IoError::InvalidFile(format!("array '{}' is not numeric", name)))?;

    let num_points = points.len() / 3;
    if values.len() < num_points {
        return Err(IoError::MissingData(format!(
            "array '{}' has {} values for {} points",
            name,
            values.len(),
            num_points
        )));
    }

    let mut mesh = UnstructuredField::new(prefixed);
    for (p, &v) in points.chunks_exact(3).zip(&values) {
        mesh.push_vertex([p[0], p[1], p[2]], v);
    }

    let (connectivity, offsets) = match &piece.cells.cell_verts {
        VertexNumbers::Legacy { vertices, .. } => legacy_to_runs(vertices)?,
        VertexNumbers::XML {
            connectivity,
            offsets,
        } => (connectivity.clone(), offsets.clone()),
    };

    let mut skipped = 0usize;
    let mut start = 0usize;
    for (cell, (ty, &end)) in piece.cells.types.iter().zip(&offsets).enumerate() {
        let end = end as usize;
        let run = connectivity.get(start..end).ok_or_else(|| {
            IoError::InvalidFile(format!("cell {} runs past the connectivity array", cell))
        })?;
        start = end;
        match cell_kind(ty) {
            Some(kind) if run.len() == kind.vertex_count() => mesh.push_cell(kind, run),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("skipped {} unsupported vtk cells", skipped);
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Converts legacy `n, v0..vn` runs into flat connectivity plus end offsets.
fn legacy_to_runs(vertices: &[u32]) -> IoResult<(Vec<u64>, Vec<u64>)> {
    let mut connectivity = Vec::with_capacity(vertices.len());
    let mut offsets = Vec::new();
    let mut i = 0usize;
    while i < vertices.len() {
        let n = vertices[i] as usize;
        let run = vertices.get(i + 1..i + 1 + n).ok_or_else(|| {
            IoError::InvalidFile("legacy cell list is truncated".into())
        })?;
        connectivity.extend(run.iter().map(|&v| v as u64));
        offsets.push(connectivity.len() as u64);
        i += 1 + n;
    }
    Ok((connectivity, offsets))
}
