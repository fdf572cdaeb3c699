//! Adaptive mesh refinement fields.
//!
//! An AMR field is a forest of axis-aligned blocks. Each block lives on one
//! refinement level and carries its own dense value array. Block bounds are
//! integer cell coordinates in the index space of the block's level; the
//! level's cell width scales them into a common space.

use crate::{Error, Result, ValueRange};

/// Integer block bounds `(lo.x, lo.y, lo.z, hi.x, hi.y, hi.z)`, inclusive.
pub type BlockBounds = [i32; 6];

/// Dense cell values of one block, x fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockData {
    /// Cell counts along x, y, z.
    pub dims: [usize; 3],
    /// `dims[0] * dims[1] * dims[2]` values.
    pub values: Vec<f32>,
}

impl BlockData {
    /// Number of cells implied by `dims`.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }
}

/// Block-structured AMR field.
///
/// `block_bounds`, `block_level` and `block_data` are index-parallel: entry
/// `i` of each describes block `i`. `cell_width` holds one width per
/// refinement level, indexed by `block_level`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmrField {
    /// Cell width per refinement level.
    pub cell_width: Vec<f32>,
    /// Refinement level per block.
    pub block_level: Vec<i32>,
    /// Integer bounds per block.
    pub block_bounds: Vec<BlockBounds>,
    /// Values per block.
    pub block_data: Vec<BlockData>,
    /// Min/max over all block values.
    pub voxel_range: ValueRange,
}

impl Default for AmrField {
    fn default() -> Self {
        Self {
            cell_width: Vec::new(),
            block_level: Vec::new(),
            block_bounds: Vec::new(),
            block_data: Vec::new(),
            voxel_range: ValueRange::empty(),
        }
    }
}

impl AmrField {
    /// Empty field with the given per-level cell widths.
    pub fn new(cell_width: Vec<f32>) -> Self {
        Self {
            cell_width,
            ..Self::default()
        }
    }

    /// Number of blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.block_data.len()
    }

    /// Appends one block to all per-block arrays and folds its values into
    /// the voxel range.
    pub fn push_block(&mut self, level: i32, bounds: BlockBounds, data: BlockData) {
        for &v in &data.values {
            self.voxel_range.extend(v);
        }
        self.block_level.push(level);
        self.block_bounds.push(bounds);
        self.block_data.push(data);
    }

    /// Checks the index-parallel invariant, per-block sizes and level indices.
    pub fn validate(&self) -> Result<()> {
        let n = self.block_data.len();
        check_parallel("blockData", n, "blockBounds", self.block_bounds.len())?;
        check_parallel("blockData", n, "blockLevel", self.block_level.len())?;

        for (i, block) in self.block_data.iter().enumerate() {
            if block.values.len() != block.num_cells() {
                return Err(Error::SizeMismatch {
                    what: format!("AMR block {}", i),
                    expected: block.num_cells(),
                    actual: block.values.len(),
                });
            }
        }

        for (i, &level) in self.block_level.iter().enumerate() {
            if level < 0 || level as usize >= self.cell_width.len() {
                return Err(Error::SizeMismatch {
                    what: format!("cellWidth entries for level of block {}", i),
                    expected: level.max(0) as usize + 1,
                    actual: self.cell_width.len(),
                });
            }
        }

        if n > 0 {
            self.voxel_range.validate()?;
        }
        Ok(())
    }
}

fn check_parallel(left: &'static str, left_len: usize, right: &'static str, right_len: usize) -> Result<()> {
    if left_len != right_len {
        return Err(Error::NotParallel {
            left,
            left_len,
            right,
            right_len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(values: Vec<f32>) -> BlockData {
        BlockData {
            dims: [values.len(), 1, 1],
            values,
        }
    }

    #[test]
    fn test_push_block_keeps_arrays_parallel() {
        let mut amr = AmrField::new(vec![2.0, 1.0]);
        amr.push_block(0, [0, 0, 0, 1, 0, 0], block(vec![0.5, 2.0]));
        amr.push_block(1, [2, 0, 0, 3, 0, 0], block(vec![-1.0, 0.0]));

        assert_eq!(amr.num_blocks(), 2);
        assert_eq!(amr.block_level, vec![0, 1]);
        assert_eq!(amr.voxel_range, ValueRange::new(-1.0, 2.0));
        assert!(amr.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_broken_parallelism() {
        let mut amr = AmrField::new(vec![1.0]);
        amr.push_block(0, [0; 6], block(vec![1.0]));
        amr.block_level.push(0);
        assert!(matches!(amr.validate(), Err(Error::NotParallel { .. })));
    }

    #[test]
    fn test_validate_detects_missing_level_width() {
        let mut amr = AmrField::new(vec![1.0]);
        amr.push_block(3, [0; 6], block(vec![1.0]));
        assert!(amr.validate().is_err());
    }
}
