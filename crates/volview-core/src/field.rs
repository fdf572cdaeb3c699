//! Type-erased field handed from readers to consumers.

use crate::{AmrField, Result, StructuredField, UnstructuredField, ValueRange};
use std::fmt;

/// Which of the three normalized shapes a field has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Dense regular grid.
    Structured,
    /// Adaptive mesh refinement blocks.
    Amr,
    /// Indexed unstructured mesh.
    Unstructured,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Structured => "structuredRegular",
            FieldKind::Amr => "amr",
            FieldKind::Unstructured => "unstructured",
        };
        f.write_str(s)
    }
}

/// A fully populated field of one of the three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Dense regular grid.
    Structured(StructuredField),
    /// AMR blocks.
    Amr(AmrField),
    /// Unstructured mesh.
    Unstructured(UnstructuredField),
}

impl Field {
    /// Shape of this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Structured(_) => FieldKind::Structured,
            Field::Amr(_) => FieldKind::Amr,
            Field::Unstructured(_) => FieldKind::Unstructured,
        }
    }

    /// Scalar range: data range for grids and meshes, voxel range for AMR.
    pub fn value_range(&self) -> ValueRange {
        match self {
            Field::Structured(f) => f.data_range,
            Field::Amr(f) => f.voxel_range,
            Field::Unstructured(f) => f.data_range,
        }
    }

    /// Checks the invariants of the wrapped field.
    pub fn validate(&self) -> Result<()> {
        match self {
            Field::Structured(f) => f.validate(),
            Field::Amr(f) => f.validate(),
            Field::Unstructured(f) => f.validate(),
        }
    }

    /// Names and lengths of the arrays a renderer receives.
    pub fn array_sizes(&self) -> Vec<(&'static str, usize)> {
        match self {
            Field::Structured(f) => vec![("data", f.data.len())],
            Field::Amr(f) => vec![
                ("cellWidth", f.cell_width.len()),
                ("blockBounds", f.block_bounds.len()),
                ("blockLevel", f.block_level.len()),
                ("blockData", f.block_data.len()),
            ],
            Field::Unstructured(f) => {
                let mut sizes = vec![
                    ("vertexPosition", f.vertex_position.len()),
                    ("vertexData", f.vertex_data.len()),
                    ("index", f.index.len()),
                    ("cellIndex", f.cell_index.len()),
                    ("cellType", f.cell_type.len()),
                ];
                if f.has_grids() {
                    sizes.push(("gridData", f.grid_data.len()));
                    sizes.push(("gridDomains", f.grid_domains.len()));
                }
                sizes
            }
        }
    }

    /// The structured grid, if this is one.
    pub fn as_structured(&self) -> Option<&StructuredField> {
        match self {
            Field::Structured(f) => Some(f),
            _ => None,
        }
    }

    /// The AMR field, if this is one.
    pub fn as_amr(&self) -> Option<&AmrField> {
        match self {
            Field::Amr(f) => Some(f),
            _ => None,
        }
    }

    /// The unstructured mesh, if this is one.
    pub fn as_unstructured(&self) -> Option<&UnstructuredField> {
        match self {
            Field::Unstructured(f) => Some(f),
            _ => None,
        }
    }
}

impl From<StructuredField> for Field {
    fn from(f: StructuredField) -> Self {
        Field::Structured(f)
    }
}

impl From<AmrField> for Field {
    fn from(f: AmrField) -> Self {
        Field::Amr(f)
    }
}

impl From<UnstructuredField> for Field {
    fn from(f: UnstructuredField) -> Self {
        Field::Unstructured(f)
    }
}
