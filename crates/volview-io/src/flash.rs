//! FLASH block-structured AMR reader (HDF5).
//!
//! A FLASH checkpoint or plot file stores per-block metadata in the
//! `refine level`, `node type` and `bounding box` datasets and one
//! `[blocks, nz, ny, nx]` dataset per variable, named in `unknown names`.
//! Only leaf blocks (`node type == 1`) are emitted.

use crate::amr::BlockTable;
use crate::traits::check_index;
use crate::{FieldReader, IoError, IoResult, Slot};
use hdf5::File as Hdf5File;
use hdf5::types::FixedAscii;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use volview_core::{AmrField, Field};

/// Reader for FLASH HDF5 files.
#[derive(Debug, Default)]
pub struct FlashReader {
    path: Option<PathBuf>,
    names: Vec<String>,
    fields: Vec<Slot<Field>>,
}

impl FlashReader {
    /// Creates an unopened reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable names in file order, one per field.
    pub fn variable_names(&self) -> &[String] {
        &self.names
    }
}

fn h5err(what: &str) -> impl FnOnce(hdf5::Error) -> IoError + '_ {
    move |e| IoError::InvalidFile(format!("flash '{}': {}", what, e))
}

impl FieldReader for FlashReader {
    fn format_name(&self) -> &'static str {
        "FLASH"
    }

    fn open(&mut self, path: &Path) -> IoResult<()> {
        let file = Hdf5File::open(path)
            .map_err(|e| IoError::UnsupportedFormat(format!("hdf5: {}", e)))?;

        for required in ["refine level", "node type", "bounding box"] {
            if file.dataset(required).is_err() {
                return Err(IoError::UnsupportedFormat(format!(
                    "hdf5 file has no '{}' dataset",
                    required
                )));
            }
        }

        let names: Vec<String> = file
            .dataset("unknown names")
            .map_err(|e| IoError::UnsupportedFormat(format!("unknown names: {}", e)))?
            .read_raw::<FixedAscii<4>>()
            .map_err(h5err("unknown names"))?
            .iter()
            .map(|n| n.as_str().trim().to_string())
            .collect();
        if names.is_empty() {
            return Err(IoError::MissingData("flash file lists no variables".into()));
        }
        debug!("flash {} variables: {:?}", path.display(), names);

        self.fields = names.iter().map(|_| Slot::Unloaded).collect();
        self.names = names;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn num_fields(&self) -> usize {
        self.names.len()
    }

    fn field_index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name.trim())
    }

    fn load(&mut self, index: usize) -> IoResult<&Field> {
        let Self {
            path,
            names,
            fields,
        } = self;
        let path = path.as_deref().ok_or(IoError::NotOpen)?;
        check_index(index, fields.len())?;
        let name = &names[index];
        fields[index].load_with(|| {
            let amr = read_variable(path, name)?;
            info!(
                "loaded flash variable '{}' from {}: {} leaf blocks, {} levels",
                name,
                path.display(),
                amr.num_blocks(),
                amr.cell_width.len()
            );
            Ok(Field::Amr(amr))
        })
    }

    fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index).and_then(Slot::get)
    }

    fn take(&mut self, index: usize) -> Option<Field> {
        self.fields.get_mut(index).and_then(Slot::take)
    }
}

fn read_table(file: &Hdf5File) -> IoResult<BlockTable> {
    let refine_level = file
        .dataset("refine level")
        .and_then(|d| d.read_raw::<i32>())
        .map_err(h5err("refine level"))?;
    let node_type = file
        .dataset("node type")
        .and_then(|d| d.read_raw::<i32>())
        .map_err(h5err("node type"))?;
    let bbox = file
        .dataset("bounding box")
        .and_then(|d| d.read_raw::<f64>())
        .map_err(h5err("bounding box"))?;
    BlockTable::from_flat(refine_level, node_type, &bbox)
}

fn read_variable(path: &Path, name: &str) -> IoResult<AmrField> {
    let file = Hdf5File::open(path).map_err(h5err("file"))?;
    let table = read_table(&file)?;

    let var = file.dataset(name).map_err(|e| {
        IoError::MissingData(format!("flash variable '{}': {}", name, e))
    })?;
    let shape = var.shape();
    let [blocks, nz, ny, nx] = shape[..] else {
        return Err(IoError::DimensionMismatch {
            expected: "[blocks, nz, ny, nx]".into(),
            actual: format!("{:?}", shape),
        });
    };
    if blocks != table.len() {
        return Err(IoError::DimensionMismatch {
            expected: format!("{} blocks", table.len()),
            actual: format!("{} blocks in '{}'", blocks, name),
        });
    }
    let values = var.read_raw::<f32>().map_err(h5err(name))?;
    table.build_field([nx, ny, nz], &values)
}
