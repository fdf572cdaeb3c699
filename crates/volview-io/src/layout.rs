//! Raw grid layout: dimensions and cell type.
//!
//! Raw files carry no header, so the layout comes from the command line or,
//! failing that, from underscore-separated file name tokens such as
//! `skull_256x256x256_uint8.raw`.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;
use volview_core::ScalarType;

/// Dimensions and cell type of a headerless grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLayout {
    /// Cell counts along x, y, z.
    pub dims: [usize; 3],
    /// Cell storage type.
    pub scalar: ScalarType,
}

impl RawLayout {
    /// Creates a layout.
    pub fn new(dims: [usize; 3], scalar: ScalarType) -> Self {
        Self { dims, scalar }
    }

    /// Bytes per cell (1, 2 or 4).
    #[inline]
    pub fn bytes_per_cell(&self) -> u32 {
        self.scalar.bytes_per_cell()
    }

    /// `nx * ny * nz`, or `None` if the product overflows.
    pub fn num_cells(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |n, &d| n.checked_mul(d))
    }

    /// Total bytes of one grid, or `None` if it does not fit in a `u64`.
    pub fn byte_len(&self) -> Option<u64> {
        let cells = u64::try_from(self.num_cells()?).ok()?;
        cells.checked_mul(self.bytes_per_cell() as u64)
    }

    /// Guesses the layout from a `.raw` file name.
    ///
    /// The name is split on `_`. A token beginning with `<X>x<Y>x<Z>` sets the
    /// dims, a token beginning with `int<N>` or `uint<N>` sets `N / 8` bytes
    /// per cell. Scanning stops once both are known. If dims were found but no
    /// width token, cells default to 4-byte floats.
    pub fn guess_from_path(path: &Path) -> Option<RawLayout> {
        let is_raw = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("raw"));
        if !is_raw {
            return None;
        }
        let name = path.file_name()?.to_str()?;

        let mut dims: Option<[usize; 3]> = None;
        let mut scalar: Option<ScalarType> = None;

        for token in name.split('_') {
            if let Some(d) = parse_dims(token) {
                dims = Some(d);
            }
            if let Some(s) = parse_width(token) {
                scalar = Some(s);
            }
            if dims.is_some() && scalar.is_some() {
                break;
            }
        }

        let dims = dims?;
        let layout = RawLayout::new(dims, scalar.unwrap_or(ScalarType::F32));
        debug!(
            "guessed raw layout {}x{}x{} {} from '{}'",
            dims[0],
            dims[1],
            dims[2],
            layout.scalar.name(),
            name
        );
        Some(layout)
    }
}

/// Resolves the raw layout from explicit options and the file name.
///
/// - explicit dims win; a missing type defaults to float32
/// - with neither dims nor type given, the layout is guessed from the name
/// - a type without dims yields no layout
pub fn resolve_layout(
    dims: Option<[usize; 3]>,
    scalar: Option<ScalarType>,
    path: &Path,
) -> Option<RawLayout> {
    match (dims, scalar) {
        (Some(d), s) if d.iter().all(|&n| n > 0) => {
            Some(RawLayout::new(d, s.unwrap_or(ScalarType::F32)))
        }
        (Some(_), _) => None,
        (None, None) => RawLayout::guess_from_path(path),
        (None, Some(_)) => None,
    }
}

fn dims_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\+?(\d+)x\+?(\d+)x\+?(\d+)").expect("valid dims regex"))
}

fn width_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^u?int\s*\+?(\d+)").expect("valid width regex"))
}

fn parse_dims(token: &str) -> Option<[usize; 3]> {
    let caps = dims_regex().captures(token)?;
    let mut dims = [0usize; 3];
    for (i, d) in dims.iter_mut().enumerate() {
        *d = caps.get(i + 1)?.as_str().parse().ok()?;
    }
    dims.iter().all(|&d| d > 0).then_some(dims)
}

fn parse_width(token: &str) -> Option<ScalarType> {
    let caps = width_regex().captures(token)?;
    let bits: u32 = caps.get(1)?.as_str().parse().ok()?;
    ScalarType::from_bytes_per_cell(bits / 8).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_dims_and_uint8() {
        let l = RawLayout::guess_from_path(Path::new("volume_64x64x64_uint8.raw")).unwrap();
        assert_eq!(l.dims, [64, 64, 64]);
        assert_eq!(l.bytes_per_cell(), 1);
    }

    #[test]
    fn test_guess_int16_with_directory() {
        let l = RawLayout::guess_from_path(Path::new("/data/my_scans/head_256x256x113_int16.raw"))
            .unwrap();
        assert_eq!(l.dims, [256, 256, 113]);
        assert_eq!(l.scalar, ScalarType::U16);
    }

    #[test]
    fn test_guess_defaults_to_float() {
        let l = RawLayout::guess_from_path(Path::new("sim_32x16x8.raw")).unwrap();
        assert_eq!(l.dims, [32, 16, 8]);
        assert_eq!(l.scalar, ScalarType::F32);
        assert_eq!(l.byte_len(), Some(32 * 16 * 8 * 4));
    }

    #[test]
    fn test_sizes_overflow_to_none() {
        let l = RawLayout::new([usize::MAX, 2, 1], ScalarType::U8);
        assert_eq!(l.num_cells(), None);
        assert_eq!(l.byte_len(), None);
    }

    #[test]
    fn test_guess_requires_raw_extension_and_dims() {
        assert!(RawLayout::guess_from_path(Path::new("volume_64x64x64_uint8.dat")).is_none());
        assert!(RawLayout::guess_from_path(Path::new("volume_uint8.raw")).is_none());
    }

    #[test]
    fn test_uint_not_taken_as_int() {
        assert_eq!(parse_width("uint16.raw"), Some(ScalarType::U16));
        assert_eq!(parse_width("int8"), Some(ScalarType::U8));
        assert_eq!(parse_width("int64"), None);
        assert_eq!(parse_width("print8"), None);
    }

    #[test]
    fn test_resolve_layout() {
        let p = Path::new("volume_64x64x64_uint8.raw");
        assert_eq!(
            resolve_layout(Some([4, 4, 4]), None, p),
            Some(RawLayout::new([4, 4, 4], ScalarType::F32))
        );
        assert_eq!(
            resolve_layout(None, None, p),
            Some(RawLayout::new([64, 64, 64], ScalarType::U8))
        );
        assert_eq!(resolve_layout(None, Some(ScalarType::U16), p), None);
        assert_eq!(resolve_layout(Some([0, 4, 4]), None, p), None);
    }
}
