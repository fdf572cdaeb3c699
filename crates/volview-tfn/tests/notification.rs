use std::cell::RefCell;
use std::rc::Rc;
use volview_core::ValueRange;
use volview_tfn::{IsoValueSet, TfnUpdate, TransferFunction, TransferFunctionEngine};

fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    (log, move |v: &T| sink.borrow_mut().push(v.clone()))
}

#[test]
fn subscribing_fires_immediately_and_keeps_dirty() {
    let mut tfn = TransferFunctionEngine::new();
    let (log, cb) = recorder::<TfnUpdate>();
    tfn.set_update_callback(cb);
    assert_eq!(log.borrow().len(), 1);
    assert!(tfn.is_dirty());

    assert!(tfn.refresh());
    assert_eq!(log.borrow().len(), 2);
    assert!(!tfn.refresh());
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn edits_coalesce_into_one_update() {
    let mut tfn = TransferFunctionEngine::new();
    let (log, cb) = recorder::<TfnUpdate>();
    tfn.set_update_callback(cb);
    tfn.refresh();
    log.borrow_mut().clear();

    tfn.set_value_range(ValueRange::new(0.0, 100.0)).unwrap();
    tfn.select_preset(2).unwrap();
    tfn.set_opacity_scale(0.5);
    assert!(tfn.refresh());
    assert!(!tfn.refresh());

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].value_range, ValueRange::new(0.0, 100.0));
    assert_eq!(log[0].samples.len(), 256);
    assert_eq!(log[0].samples[255][3], 0.5);
}

#[test]
fn replacing_the_callback_silences_the_old_one() {
    let mut tfn = TransferFunctionEngine::new();
    let (first, cb1) = recorder::<TfnUpdate>();
    let (second, cb2) = recorder::<TfnUpdate>();
    tfn.set_update_callback(cb1);
    tfn.set_update_callback(cb2);
    tfn.refresh();
    assert_eq!(first.borrow().len(), 1);
    assert_eq!(second.borrow().len(), 2);
}

#[test]
fn polling_reports_once() {
    let mut tfn = TransferFunctionEngine::new();
    tfn.set_sample_count(16);
    let update = tfn.consume().unwrap();
    assert_eq!(update.samples.len(), 16);
    assert!(tfn.consume().is_none());

    // Rejected edits leave the engine clean.
    assert!(tfn.add_opacity_point(0.5, 0.5).is_err());
    assert!(tfn.consume().is_none());
}

#[test]
fn yaml_preset_becomes_editable_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fire.yaml");
    std::fs::write(
        &path,
        "name: Fire
colors:
  - { x: 0.0, rgb: [0.0, 0.0, 0.0] }
  - { x: 1.0, rgb: [1.0, 0.5, 0.0] }
opacities:
  - { x: 0.0, opacity: 0.0 }
  - { x: 1.0, opacity: 0.8 }
",
    )
    .unwrap();

    let mut tfn = TransferFunctionEngine::new();
    let index = tfn.add_preset(TransferFunction::load_yaml(&path).unwrap()).unwrap();
    tfn.select_preset(index).unwrap();
    assert!(tfn.is_editable());
    assert!(tfn.preset_names().contains(&"Fire"));
    let samples = tfn.sample(3);
    assert_eq!(samples[2], [1.0, 0.5, 0.0, 0.8]);
    assert!(tfn.add_color_point(0.5, [1.0, 0.0, 0.0]).is_ok());
}

#[test]
fn isovalues_notify_filtered_list() {
    let mut iso = IsoValueSet::new();
    let (log, cb) = recorder::<Vec<f32>>();
    iso.set_update_callback(cb);
    iso.refresh();
    assert_eq!(*log.borrow(), vec![Vec::<f32>::new(), Vec::new()]);

    iso.set_value_range(ValueRange::new(0.0, 10.0)).unwrap();
    iso.set_value(1, 2.0).unwrap();
    iso.set_enabled(1, true).unwrap();
    iso.set_value(2, 3.0).unwrap();
    iso.set_enabled(2, true).unwrap();
    assert!(iso.refresh());
    assert!(!iso.refresh());
    assert_eq!(log.borrow().last().unwrap(), &vec![2.0, 3.0]);
    assert_eq!(log.borrow().len(), 3);
}
