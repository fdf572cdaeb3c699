//! Headless viewer session: load, seed the editors, run frames.

use crate::Cli;
use crate::backend::{RenderConsumer, ValidatingConsumer, load_library};
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{debug, info, warn};
use volview_core::{ScalarType, ValueRange};
use volview_io::{OpenHints, RawLayout, open_field, resolve_layout};
use volview_tfn::{IsoValueSet, NUM_ISO_VALUES, TransferFunction, TransferFunctionEngine};

/// What a session delivered to its consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: usize,
    pub tfn_updates: usize,
    pub iso_updates: usize,
}

/// Runs a session with the library named on the command line.
pub fn run(cli: &Cli) -> Result<SessionStats> {
    let consumer = load_library(&cli.library)?;
    run_with(cli, consumer)
}

/// Runs a session against an already chosen consumer.
pub fn run_with(cli: &Cli, consumer: Box<dyn RenderConsumer>) -> Result<SessionStats> {
    let Some(path) = cli.file.as_deref() else {
        bail!("no input file provided");
    };
    if cli.no_default_layout {
        debug!("--noDefaultLayout has no effect");
    }

    let mut consumer: Box<dyn RenderConsumer> = if cli.debug || cli.trace.is_some() {
        Box::new(ValidatingConsumer::new(consumer, cli.trace.clone())?)
    } else {
        consumer
    };
    info!("library: {}", consumer.name());

    let hints = OpenHints {
        layout: raw_layout(cli, path).0,
        index_prefixed: cli.index_prefixed,
        compute_raw_range: cli.compute_range,
        field_index: cli.field,
        variable: cli.variable.clone(),
    };
    let loaded = open_field(path, &hints).with_context(|| format!("loading {}", path.display()))?;
    let range = loaded.field.value_range();
    consumer.set_field(&loaded)?;

    let mut tfn = transfer_function(cli, range)?;
    let mut iso = isovalues(cli, range)?;

    let mut stats = SessionStats::default();
    for frame in 0..cli.frames {
        if let Some(update) = tfn.consume() {
            consumer.set_transfer_function(&update)?;
            stats.tfn_updates += 1;
        }
        if let Some(values) = iso.consume() {
            consumer.set_isovalues(&values)?;
            stats.iso_updates += 1;
        }
        consumer.render_frame(frame)?;
        stats.frames += 1;
    }
    Ok(stats)
}

/// Where the raw layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutSource {
    Options,
    FileName,
    Missing,
}

fn raw_layout(cli: &Cli, path: &Path) -> (Option<RawLayout>, LayoutSource) {
    let dims = cli.dims();
    let scalar = cli.scalar_type.map(ScalarType::from);
    if dims.is_none() && scalar.is_some() {
        warn!("--type without --dims is ignored");
    }
    let layout = resolve_layout(dims, scalar, path);
    let source = match (&layout, dims, scalar) {
        (None, ..) => LayoutSource::Missing,
        (Some(_), None, None) => LayoutSource::FileName,
        (Some(_), ..) => LayoutSource::Options,
    };
    match &layout {
        Some(l) => {
            if source == LayoutSource::FileName {
                info!("Guessing dimensions and data type from file name");
            }
            debug!(
                "raw layout {}x{}x{} {}",
                l.dims[0],
                l.dims[1],
                l.dims[2],
                l.scalar.name()
            );
        }
        None => debug!("no raw layout, raw reader will be skipped"),
    }
    (layout, source)
}

fn transfer_function(cli: &Cli, range: ValueRange) -> Result<TransferFunctionEngine> {
    let mut tfn = TransferFunctionEngine::new();

    if let Some(file) = &cli.tfn {
        let preset = TransferFunction::load_yaml(file)
            .with_context(|| format!("loading transfer function {}", file.display()))?;
        let index = tfn.add_preset(preset)?;
        tfn.select_preset(index)?;
    } else if let Some(name) = &cli.preset {
        tfn.select_preset_by_name(name).with_context(|| {
            format!("available presets: {}", tfn.preset_names().join(", "))
        })?;
    }
    info!("transfer function: {}", tfn.active().name);

    if let Err(e) = tfn.set_value_range(range) {
        warn!("keeping default value range: {}", e);
    }
    tfn.set_sample_count(cli.samples);
    tfn.set_opacity_scale(cli.opacity_scale);
    Ok(tfn)
}

fn isovalues(cli: &Cli, range: ValueRange) -> Result<IsoValueSet> {
    if cli.iso.len() > NUM_ISO_VALUES {
        bail!(
            "{} isovalues given, at most {} are supported",
            cli.iso.len(),
            NUM_ISO_VALUES
        );
    }

    let mut iso = IsoValueSet::new();
    if let Err(e) = iso.set_value_range(range) {
        warn!("keeping default isovalue range: {}", e);
    }
    for (slot, &value) in cli.iso.iter().enumerate() {
        let applied = iso.set_value(slot, value)?;
        if applied != value {
            warn!("isovalue {} clamped to {}", value, applied);
        }
        iso.set_enabled(slot, true)?;
    }
    Ok(iso)
}
