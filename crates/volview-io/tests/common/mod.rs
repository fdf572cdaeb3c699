//! Fixture writers shared by the reader tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const UMESH_MAGIC: u64 = 0x2_3423_5566;
pub const UMESH_MAGIC_WITH_GRIDS: u64 = 0x2_3423_5567;

/// In-memory UMesh image builder.
#[derive(Default)]
pub struct UMeshBuilder {
    pub vertices: Vec<[f32; 3]>,
    pub values: Vec<f32>,
    pub triangles: Vec<[i32; 3]>,
    pub tets: Vec<[i32; 4]>,
    pub pyramids: Vec<[i32; 5]>,
    pub wedges: Vec<[i32; 6]>,
    pub hexes: Vec<[i32; 8]>,
    /// `(domain, num_cells, offset)` per grid, plus the shared scalar pool.
    pub grids: Option<(Vec<([f32; 6], [i32; 3], i32)>, Vec<f32>)>,
}

fn put_vec<T, const N: usize>(out: &mut Vec<u8>, items: &[[T; N]], enc: fn(&T) -> [u8; 4]) {
    out.extend_from_slice(&(items.len() as u64).to_le_bytes());
    for item in items {
        for v in item {
            out.extend_from_slice(&enc(v));
        }
    }
}

impl UMeshBuilder {
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let magic = if self.grids.is_some() {
            UMESH_MAGIC_WITH_GRIDS
        } else {
            UMESH_MAGIC
        };
        out.extend_from_slice(&magic.to_le_bytes());
        put_vec(&mut out, &self.vertices, |v| v.to_le_bytes());

        let name = b"scalar";
        out.extend_from_slice(&(name.len() as u64).to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(&(self.values.len() as u64).to_le_bytes());
        for v in &self.values {
            out.extend_from_slice(&v.to_le_bytes());
        }

        put_vec(&mut out, &self.triangles, |v| v.to_le_bytes());
        put_vec::<i32, 4>(&mut out, &[], |v| v.to_le_bytes());
        put_vec(&mut out, &self.tets, |v| v.to_le_bytes());
        put_vec(&mut out, &self.pyramids, |v| v.to_le_bytes());
        put_vec(&mut out, &self.wedges, |v| v.to_le_bytes());
        put_vec(&mut out, &self.hexes, |v| v.to_le_bytes());

        if let Some((grids, scalars)) = &self.grids {
            out.extend_from_slice(&(grids.len() as u64).to_le_bytes());
            for (domain, cells, offset) in grids {
                for v in domain {
                    out.extend_from_slice(&v.to_le_bytes());
                }
                for v in cells {
                    out.extend_from_slice(&v.to_le_bytes());
                }
                out.extend_from_slice(&offset.to_le_bytes());
            }
            out.extend_from_slice(&(scalars.len() as u64).to_le_bytes());
            for v in scalars {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.bytes()).unwrap();
        path
    }
}

/// Unit tetrahedron with values 0..4.
pub fn unit_tet() -> UMeshBuilder {
    UMeshBuilder {
        vertices: vec![[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [0., 0., 1.]],
        values: vec![0., 1., 2., 3.],
        tets: vec![[0, 1, 2, 3]],
        ..Default::default()
    }
}

/// Tetrahedron followed by a unit hexahedron sharing no vertices.
pub fn tet_and_hex() -> UMeshBuilder {
    let mut b = unit_tet();
    for z in 0..2 {
        for (x, y) in [(0., 0.), (1., 0.), (1., 1.), (0., 1.)] {
            b.vertices.push([x + 2., y, z as f32]);
        }
    }
    b.values.extend((4..12).map(|v| v as f32));
    b.hexes.push([4, 5, 6, 7, 8, 9, 10, 11]);
    b
}

/// Writes a little-endian float grid.
pub fn write_f32_raw(dir: &Path, name: &str, values: &[f32]) -> PathBuf {
    let path = dir.join(name);
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    std::fs::write(&path, bytes).unwrap();
    path
}

pub const LEGACY_TET_HEX: &str = "# vtk DataFile Version 3.0
tet hex and triangle
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 12 float
0 0 0
1 0 0
0 1 0
0 0 1
2 0 0
3 0 0
3 1 0
2 1 0
2 0 1
3 0 1
3 1 1
2 1 1
CELLS 3 18
4 0 1 2 3
8 4 5 6 7 8 9 10 11
3 0 1 2
CELL_TYPES 3
10
12
5
POINT_DATA 12
SCALARS density float 1
LOOKUP_TABLE default
0 1 2 3 4 5 6 7 8 9 10 11
SCALARS temperature float 1
LOOKUP_TABLE default
-1 -1 -1 -1 5 5 5 5 5 5 5 20
";
