//! Format dispatch by trial.
//!
//! Formats are not sniffed by extension. Each [`FormatProbe`] builds a
//! configured reader and tries to open the file; the first probe in
//! [`PROBE_ORDER`] that accepts it wins. The structured probe only runs when a
//! raw layout is known.

use crate::{FieldReader, IoError, IoResult, RawLayout, RawReader, UMeshReader};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};
use volview_core::Field;

/// Reader family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Headerless regular grid.
    Structured,
    /// FLASH AMR blocks.
    Amr,
    /// VTK unstructured grid.
    Vtk,
    /// UMesh unstructured mesh.
    UMesh,
}

/// Order in which readers are tried.
pub const PROBE_ORDER: [FormatKind; 4] = [
    FormatKind::Structured,
    FormatKind::Amr,
    FormatKind::Vtk,
    FormatKind::UMesh,
];

impl FormatKind {
    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            FormatKind::Structured => "structured",
            FormatKind::Amr => "amr",
            FormatKind::Vtk => "vtk",
            FormatKind::UMesh => "umesh",
        }
    }

    /// Probe for this kind.
    pub fn probe(self) -> &'static dyn FormatProbe {
        match self {
            FormatKind::Structured => &StructuredProbe,
            FormatKind::Amr => &AmrProbe,
            FormatKind::Vtk => &VtkProbe,
            FormatKind::UMesh => &UMeshProbe,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options that steer reader construction and field selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenHints {
    /// Raw grid layout. The structured probe declines without one.
    pub layout: Option<RawLayout>,
    /// Prefix each unstructured cell's index run with its vertex count.
    pub index_prefixed: bool,
    /// Compute the raw grid's range from its cells instead of `[0, 1]`.
    pub compute_raw_range: bool,
    /// Field to load from multi-field files.
    pub field_index: usize,
    /// Field to load by name; overrides `field_index` when the reader knows it.
    pub variable: Option<String>,
}

impl OpenHints {
    /// Hints with the raw layout guessed from the file name.
    pub fn guess(path: impl AsRef<Path>) -> Self {
        Self {
            layout: RawLayout::guess_from_path(path.as_ref()),
            ..Self::default()
        }
    }

    /// Sets an explicit raw layout.
    pub fn with_layout(mut self, layout: Option<RawLayout>) -> Self {
        self.layout = layout;
        self
    }
}

/// A field together with the reader family that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedField {
    /// Reader family.
    pub kind: FormatKind,
    /// Loaded field.
    pub field: Field,
}

/// One reader family in the dispatch chain.
pub trait FormatProbe: Sync {
    /// Family this probe builds readers for.
    fn kind(&self) -> FormatKind;

    /// Builds a reader from the hints. An error means the probe declines
    /// before touching the file.
    fn reader(&self, hints: &OpenHints) -> IoResult<Box<dyn FieldReader>>;

    /// Builds and opens a reader. An error means the file is not accepted.
    fn open(&self, path: &Path, hints: &OpenHints) -> IoResult<Box<dyn FieldReader>> {
        let mut reader = self.reader(hints)?;
        reader.open(path)?;
        Ok(reader)
    }
}

struct StructuredProbe;
struct AmrProbe;
struct VtkProbe;
struct UMeshProbe;

impl FormatProbe for StructuredProbe {
    fn kind(&self) -> FormatKind {
        FormatKind::Structured
    }

    fn reader(&self, hints: &OpenHints) -> IoResult<Box<dyn FieldReader>> {
        let layout = hints
            .layout
            .ok_or_else(|| IoError::UnsupportedFormat("no raw dims or type known".into()))?;
        Ok(Box::new(
            RawReader::new(layout).with_computed_range(hints.compute_raw_range),
        ))
    }
}

impl FormatProbe for AmrProbe {
    fn kind(&self) -> FormatKind {
        FormatKind::Amr
    }

    #[cfg(feature = "flash")]
    fn reader(&self, _hints: &OpenHints) -> IoResult<Box<dyn FieldReader>> {
        Ok(Box::new(crate::FlashReader::new()))
    }

    #[cfg(not(feature = "flash"))]
    fn reader(&self, _hints: &OpenHints) -> IoResult<Box<dyn FieldReader>> {
        Err(IoError::UnsupportedFeature("built without 'flash'".into()))
    }
}

impl FormatProbe for VtkProbe {
    fn kind(&self) -> FormatKind {
        FormatKind::Vtk
    }

    #[cfg(feature = "vtk")]
    fn reader(&self, hints: &OpenHints) -> IoResult<Box<dyn FieldReader>> {
        Ok(Box::new(
            crate::VtkReader::new().with_index_prefixed(hints.index_prefixed),
        ))
    }

    #[cfg(not(feature = "vtk"))]
    fn reader(&self, _hints: &OpenHints) -> IoResult<Box<dyn FieldReader>> {
        Err(IoError::UnsupportedFeature("built without 'vtk'".into()))
    }
}

impl FormatProbe for UMeshProbe {
    fn kind(&self) -> FormatKind {
        FormatKind::UMesh
    }

    fn reader(&self, hints: &OpenHints) -> IoResult<Box<dyn FieldReader>> {
        Ok(Box::new(
            UMeshReader::new().with_index_prefixed(hints.index_prefixed),
        ))
    }
}

/// Picks the field index from the hints, resolving names where possible.
fn select_field(reader: &dyn FieldReader, hints: &OpenHints) -> IoResult<usize> {
    if let Some(name) = &hints.variable {
        if let Some(i) = reader.field_index_of(name) {
            return Ok(i);
        }
        if reader.num_fields() > 1 {
            return Err(IoError::MissingData(format!(
                "{} file has no field named '{}'",
                reader.format_name(),
                name
            )));
        }
        debug!("{} fields are unnamed, ignoring '{}'", reader.format_name(), name);
    }
    Ok(hints.field_index)
}

/// Opens `path` with the first reader in [`PROBE_ORDER`] that accepts it and
/// loads the selected field.
///
/// A reader that accepts the file but then fails to load it is an error; it
/// does not fall through to later readers.
pub fn open_field(path: impl AsRef<Path>, hints: &OpenHints) -> IoResult<LoadedField> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let mut declined = Vec::with_capacity(PROBE_ORDER.len());
    for kind in PROBE_ORDER {
        let probe = kind.probe();
        let mut reader = match probe.open(path, hints) {
            Ok(r) => r,
            Err(e) => {
                debug!("{} reader declined {}: {}", kind, path.display(), e);
                declined.push(format!("{}: {}", kind, e));
                continue;
            }
        };

        let index = select_field(reader.as_ref(), hints)?;
        info!(
            "opened {} as {} ({} field(s), loading #{})",
            path.display(),
            reader.format_name(),
            reader.num_fields(),
            index
        );
        reader.load(index)?;
        let field = reader.take(index).ok_or(IoError::NotOpen)?;
        return Ok(LoadedField { kind, field });
    }

    Err(IoError::UnsupportedFormat(format!(
        "no reader accepted {} ({})",
        path.display(),
        declined.join("; ")
    )))
}
