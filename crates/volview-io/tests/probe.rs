mod common;

use common::*;
use volview_core::{FieldKind, ScalarType, ValueRange};
use volview_io::{FormatKind, IoError, OpenHints, RawLayout, open_field, resolve_layout};

#[test]
fn guessed_raw_opens_as_structured() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_f32_raw(dir.path(), "blob_4x4x4.raw", &[0.25; 64]);

    let loaded = open_field(&path, &OpenHints::guess(&path)).unwrap();
    assert_eq!(loaded.kind, FormatKind::Structured);
    assert_eq!(loaded.field.kind(), FieldKind::Structured);
    assert_eq!(loaded.field.value_range(), ValueRange::unit());
}

#[test]
fn explicit_layout_wins_over_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_f32_raw(dir.path(), "blob_4x4x4.raw", &[0.25; 64]);
    let layout = resolve_layout(Some([8, 8, 1]), None, &path);

    let hints = OpenHints::default().with_layout(layout);
    let loaded = open_field(&path, &hints).unwrap();
    assert_eq!(loaded.field.as_structured().unwrap().dims, [8, 8, 1]);
    assert_eq!(
        loaded.field.as_structured().unwrap().scalar_type(),
        ScalarType::F32
    );
}

#[test]
fn umesh_falls_through_earlier_probes() {
    let dir = tempfile::tempdir().unwrap();
    let path = tet_and_hex().write(dir.path(), "mesh.umesh");

    let loaded = open_field(&path, &OpenHints::guess(&path)).unwrap();
    assert_eq!(loaded.kind, FormatKind::UMesh);
    assert_eq!(loaded.field.kind(), FieldKind::Unstructured);
}

#[test]
fn raw_layout_is_tried_before_umesh() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = unit_tet().bytes();
    let path = dir.path().join("mesh.umesh");
    std::fs::write(&path, &bytes).unwrap();

    // Any file long enough for the given layout is accepted as raw.
    let hints = OpenHints::default().with_layout(Some(RawLayout::new([1, 1, 1], ScalarType::U8)));
    let loaded = open_field(&path, &hints).unwrap();
    assert_eq!(loaded.kind, FormatKind::Structured);
}

#[test]
fn unknown_content_lists_every_probe() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let err = open_field(&path, &OpenHints::guess(&path)).unwrap_err();
    let msg = match err {
        IoError::UnsupportedFormat(msg) => msg,
        other => panic!("unexpected error {}", other),
    };
    for kind in ["structured", "amr", "vtk", "umesh"] {
        assert!(msg.contains(kind), "{} missing from '{}'", kind, msg);
    }
}

#[cfg(feature = "vtk")]
#[test]
fn vtk_variable_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tet_hex.vtk");
    std::fs::write(&path, LEGACY_TET_HEX).unwrap();

    let hints = OpenHints {
        variable: Some("temperature".into()),
        ..OpenHints::default()
    };
    let loaded = open_field(&path, &hints).unwrap();
    assert_eq!(loaded.kind, FormatKind::Vtk);
    assert_eq!(loaded.field.value_range(), ValueRange::new(-1.0, 20.0));

    let hints = OpenHints {
        variable: Some("pressure".into()),
        ..OpenHints::default()
    };
    assert!(matches!(
        open_field(&path, &hints),
        Err(IoError::MissingData(_))
    ));
}
