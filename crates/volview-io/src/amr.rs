//! Block table to [`AmrField`] conversion shared by AMR readers.
//!
//! The HDF5 side only reads datasets; placing blocks on the level grids
//! happens here so it does not depend on libhdf5.

use crate::{IoError, IoResult};
use volview_core::{AmrField, BlockData};

/// `node type` of a leaf block.
pub const LEAF_NODE: i32 = 1;

/// Per-block metadata shared by every variable of a FLASH file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockTable {
    /// One-based refinement level per block.
    pub refine_level: Vec<i32>,
    /// Node type per block; only [`LEAF_NODE`] blocks carry emitted data.
    pub node_type: Vec<i32>,
    /// `[x0, x1, y0, y1, z0, z1]` per block.
    pub bbox: Vec<[f64; 6]>,
}

impl BlockTable {
    /// Builds a table from flat datasets; `bbox` holds six values per block.
    pub fn from_flat(refine_level: Vec<i32>, node_type: Vec<i32>, bbox: &[f64]) -> IoResult<Self> {
        if bbox.len() != refine_level.len() * 6 || node_type.len() != refine_level.len() {
            return Err(IoError::DimensionMismatch {
                expected: format!("{} blocks in every metadata dataset", refine_level.len()),
                actual: format!(
                    "{} node types, {} bounding box values",
                    node_type.len(),
                    bbox.len()
                ),
            });
        }
        if let Some(&bad) = refine_level.iter().find(|&&l| l < 1) {
            return Err(IoError::InvalidFile(format!(
                "refine level {} is not one-based",
                bad
            )));
        }
        let bbox = bbox
            .chunks_exact(6)
            .map(|c| [c[0], c[1], c[2], c[3], c[4], c[5]])
            .collect();
        Ok(Self {
            refine_level,
            node_type,
            bbox,
        })
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.refine_level.len()
    }

    /// True if the table has no blocks.
    pub fn is_empty(&self) -> bool {
        self.refine_level.is_empty()
    }

    /// Finest one-based refinement level.
    pub fn max_level(&self) -> i32 {
        self.refine_level.iter().copied().max().unwrap_or(1)
    }

    /// Lower corner of the union of all block boxes.
    pub fn lower_corner(&self) -> [f64; 3] {
        let mut lo = [f64::MAX; 3];
        for b in &self.bbox {
            for (axis, l) in lo.iter_mut().enumerate() {
                *l = l.min(b[axis * 2]);
            }
        }
        lo
    }

    /// Places the leaf blocks of one variable.
    ///
    /// `values` holds `len() * nx * ny * nz` cells, block-major, x fastest
    /// inside a block. Levels become zero-based, `cell_width[l]` is
    /// `2^(max_level - 1 - l)` in finest-cell units, and bounds are cell
    /// coordinates on the block's own level counted from
    /// [`lower_corner`](Self::lower_corner).
    pub fn build_field(&self, dims: [usize; 3], values: &[f32]) -> IoResult<AmrField> {
        let block_len = dims
            .iter()
            .try_fold(1usize, |n, &d| n.checked_mul(d))
            .filter(|&n| n > 0)
            .ok_or_else(|| IoError::InvalidFile(format!("block dims {:?} are unusable", dims)))?;
        let expected = block_len.checked_mul(self.len());
        if expected != Some(values.len()) {
            return Err(IoError::DimensionMismatch {
                expected: format!("{} blocks of {:?} cells", self.len(), dims),
                actual: format!("{} values", values.len()),
            });
        }
        let extent: [i32; 3] = [
            cell_count(dims[0])?,
            cell_count(dims[1])?,
            cell_count(dims[2])?,
        ];

        let max_level = self.max_level();
        let cell_width = (0..max_level)
            .map(|l| 2f32.powi(max_level - 1 - l))
            .collect();
        let mut amr = AmrField::new(cell_width);
        let origin = self.lower_corner();

        for (b, block) in values.chunks_exact(block_len).enumerate() {
            if self.node_type[b] != LEAF_NODE {
                continue;
            }
            let bbox = self.bbox[b];
            let mut bounds = [0i32; 6];
            for axis in 0..3 {
                let cell = (bbox[axis * 2 + 1] - bbox[axis * 2]) / dims[axis] as f64;
                let lower = ((bbox[axis * 2] - origin[axis]) / cell).round();
                if !lower.is_finite() || lower < 0.0 || lower > i32::MAX as f64 {
                    return Err(IoError::InvalidFile(format!(
                        "block {} has a degenerate bounding box {:?}",
                        b, bbox
                    )));
                }
                let lower = lower as i32;
                bounds[axis] = lower;
                bounds[axis + 3] = lower.checked_add(extent[axis] - 1).ok_or_else(|| {
                    IoError::InvalidFile(format!("block {} bounds overflow", b))
                })?;
            }
            amr.push_block(
                self.refine_level[b] - 1,
                bounds,
                BlockData {
                    dims,
                    values: block.to_vec(),
                },
            );
        }

        amr.validate()?;
        Ok(amr)
    }
}

fn cell_count(n: usize) -> IoResult<i32> {
    i32::try_from(n).map_err(|_| IoError::InvalidFile(format!("block size {} is too large", n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use volview_core::ValueRange;

    /// Two-level layout on `[0, 2] x [0, 1] x [0, 1]` with 2x2x2 cell blocks:
    /// a coarse parent covering the left half, its two fine children, and a
    /// coarse leaf on the right.
    fn table() -> BlockTable {
        #[rustfmt::skip]
        let bbox = [
            0.0, 1.0, 0.0, 1.0, 0.0, 1.0, // parent, level 1
            0.0, 0.5, 0.0, 0.5, 0.0, 0.5, // child, level 2
            0.5, 1.0, 0.5, 1.0, 0.0, 0.5, // child, level 2
            1.0, 2.0, 0.0, 1.0, 0.0, 1.0, // leaf, level 1
        ];
        BlockTable::from_flat(vec![1, 2, 2, 1], vec![2, 1, 1, 1], &bbox).unwrap()
    }

    fn values() -> Vec<f32> {
        (0..32).map(|v| v as f32).collect()
    }

    #[test]
    fn test_leaf_blocks_only() {
        let amr = table().build_field([2, 2, 2], &values()).unwrap();
        assert_eq!(amr.num_blocks(), 3);
        assert_eq!(amr.block_data[0].values, (8..16).map(|v| v as f32).collect::<Vec<_>>());
        amr.validate().unwrap();
    }

    #[test]
    fn test_levels_and_widths() {
        let amr = table().build_field([2, 2, 2], &values()).unwrap();
        assert_eq!(amr.block_level, vec![1, 1, 0]);
        assert_eq!(amr.cell_width, vec![2.0, 1.0]);
    }

    #[test]
    fn test_bounds_on_own_level() {
        let amr = table().build_field([2, 2, 2], &values()).unwrap();
        assert_eq!(amr.block_bounds[0], [0, 0, 0, 1, 1, 1]);
        assert_eq!(amr.block_bounds[1], [2, 2, 0, 3, 3, 1]);
        assert_eq!(amr.block_bounds[2], [2, 0, 0, 3, 1, 1]);
    }

    #[test]
    fn test_voxel_range_skips_parents() {
        let mut v = values();
        v[0] = -100.0;
        let amr = table().build_field([2, 2, 2], &v).unwrap();
        assert_eq!(amr.voxel_range, ValueRange::new(8.0, 31.0));
    }

    #[test]
    fn test_value_count_mismatch() {
        assert!(matches!(
            table().build_field([2, 2, 2], &values()[..31]),
            Err(IoError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            table().build_field([usize::MAX, 2, 2], &values()),
            Err(IoError::InvalidFile(_))
        ));
    }

    #[test]
    fn test_metadata_checks() {
        assert!(BlockTable::from_flat(vec![1, 1], vec![1], &[0.0; 12]).is_err());
        assert!(BlockTable::from_flat(vec![0], vec![1], &[0.0; 6]).is_err());
        assert_eq!(table().lower_corner(), [0.0, 0.0, 0.0]);
        assert_eq!(table().max_level(), 2);
    }
}
