//! Render consumers ("libraries") that receive fields and updates.
//!
//! A consumer stands in for the renderer: it gets the loaded field once and
//! then every transfer function and isovalue update the session forwards.

use anyhow::{Context, Result, bail, ensure};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use volview_core::ValueRange;
use volview_io::LoadedField;
use volview_tfn::{NUM_ISO_VALUES, TfnUpdate};

/// Environment variable consulted by `--library environment`.
pub const LIBRARY_ENV: &str = "VOLVIEW_LIBRARY";

/// Library used when the environment names none.
pub const DEFAULT_LIBRARY: &str = "summary";

/// Receiver of everything a renderer would be handed.
pub trait RenderConsumer {
    /// Library name.
    fn name(&self) -> &str;

    /// Called once with the loaded field.
    fn set_field(&mut self, loaded: &LoadedField) -> Result<()>;

    /// Called with each coalesced transfer function update.
    fn set_transfer_function(&mut self, update: &TfnUpdate) -> Result<()>;

    /// Called with each coalesced set of enabled isovalues.
    fn set_isovalues(&mut self, values: &[f32]) -> Result<()>;

    /// Called after the updates of one frame were delivered.
    fn render_frame(&mut self, _frame: usize) -> Result<()> {
        Ok(())
    }
}

/// Logs a one-line summary of everything it receives.
#[derive(Debug, Default)]
pub struct SummaryConsumer;

impl RenderConsumer for SummaryConsumer {
    fn name(&self) -> &str {
        "summary"
    }

    fn set_field(&mut self, loaded: &LoadedField) -> Result<()> {
        let field = &loaded.field;
        let range = field.value_range();
        info!(
            "field: {} via {} reader, range [{}, {}]",
            field.kind(),
            loaded.kind,
            range.min,
            range.max
        );
        for (name, len) in field.array_sizes() {
            info!("  {}: {} elements", name, len);
        }
        Ok(())
    }

    fn set_transfer_function(&mut self, update: &TfnUpdate) -> Result<()> {
        let peak = update
            .samples
            .iter()
            .map(|s| s[3])
            .fold(0.0f32, f32::max);
        info!(
            "transfer function: {} samples over [{}, {}], peak opacity {:.3}",
            update.samples.len(),
            update.value_range.min,
            update.value_range.max,
            peak
        );
        Ok(())
    }

    fn set_isovalues(&mut self, values: &[f32]) -> Result<()> {
        info!("isovalues: {:?}", values);
        Ok(())
    }

    fn render_frame(&mut self, frame: usize) -> Result<()> {
        debug!("frame {}", frame);
        Ok(())
    }
}

/// Accepts everything silently.
#[derive(Debug, Default)]
pub struct NullConsumer;

impl RenderConsumer for NullConsumer {
    fn name(&self) -> &str {
        "null"
    }

    fn set_field(&mut self, _loaded: &LoadedField) -> Result<()> {
        Ok(())
    }

    fn set_transfer_function(&mut self, _update: &TfnUpdate) -> Result<()> {
        Ok(())
    }

    fn set_isovalues(&mut self, _values: &[f32]) -> Result<()> {
        Ok(())
    }
}

/// Resolves `environment` through [`LIBRARY_ENV`].
pub fn resolve_library_name(name: &str) -> String {
    if name != "environment" {
        return name.to_string();
    }
    match std::env::var(LIBRARY_ENV) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => DEFAULT_LIBRARY.to_string(),
    }
}

/// Instantiates a consumer by library name.
pub fn load_library(name: &str) -> Result<Box<dyn RenderConsumer>> {
    let resolved = resolve_library_name(name);
    debug!("library '{}' -> '{}'", name, resolved);
    match resolved.to_ascii_lowercase().as_str() {
        "summary" => Ok(Box::new(SummaryConsumer)),
        "null" => Ok(Box::new(NullConsumer)),
        other => bail!("failed to load library '{}' (known: summary, null)", other),
    }
}

/// Field description written to `field.yaml`.
#[derive(Debug, Serialize)]
struct FieldTrace<'a> {
    kind: String,
    reader: &'a str,
    value_range: ValueRange,
    arrays: Vec<ArrayTrace>,
}

#[derive(Debug, Serialize)]
struct ArrayTrace {
    name: &'static str,
    len: usize,
}

#[derive(Debug, Serialize)]
struct IsoTrace<'a> {
    values: &'a [f32],
}

/// Wraps a consumer, checks every update and optionally traces it to disk.
///
/// Any violation is returned as an error, which ends the session.
pub struct ValidatingConsumer {
    inner: Box<dyn RenderConsumer>,
    trace_dir: Option<PathBuf>,
    tfn_updates: usize,
    iso_updates: usize,
}

impl ValidatingConsumer {
    /// Wraps `inner`. With a trace directory every update is also written
    /// there as YAML.
    pub fn new(inner: Box<dyn RenderConsumer>, trace_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &trace_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating trace directory {}", dir.display()))?;
            info!("tracing updates to {}", dir.display());
        }
        Ok(Self {
            inner,
            trace_dir,
            tfn_updates: 0,
            iso_updates: 0,
        })
    }

    fn write_trace<T: Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        let Some(dir) = &self.trace_dir else {
            return Ok(());
        };
        write_yaml(&dir.join(file_name), value)
    }
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_yaml::to_string(value).context("serializing trace")?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn check_range(range: &ValueRange, what: &str) -> Result<()> {
    range
        .validate()
        .with_context(|| format!("{} value range", what))
}

impl RenderConsumer for ValidatingConsumer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn set_field(&mut self, loaded: &LoadedField) -> Result<()> {
        let field = &loaded.field;
        field
            .validate()
            .with_context(|| format!("invalid {} field", field.kind()))?;
        check_range(&field.value_range(), "field")?;

        self.write_trace(
            "field.yaml",
            &FieldTrace {
                kind: field.kind().to_string(),
                reader: loaded.kind.name(),
                value_range: field.value_range(),
                arrays: field
                    .array_sizes()
                    .into_iter()
                    .map(|(name, len)| ArrayTrace { name, len })
                    .collect(),
            },
        )?;
        self.inner.set_field(loaded)
    }

    fn set_transfer_function(&mut self, update: &TfnUpdate) -> Result<()> {
        check_range(&update.value_range, "transfer function")?;
        ensure!(
            !update.samples.is_empty(),
            "transfer function update has no samples"
        );
        if let Some((i, s)) = update
            .samples
            .iter()
            .enumerate()
            .find(|(_, s)| s.iter().any(|c| !c.is_finite() || *c < 0.0))
        {
            bail!("transfer function sample {} is out of range: {:?}", i, s);
        }
        if let Some((i, s)) = update
            .samples
            .iter()
            .enumerate()
            .find(|(_, s)| s[..3].iter().any(|&c| c > 1.0))
        {
            bail!("transfer function color {} exceeds 1: {:?}", i, s);
        }

        self.write_trace(&format!("tfn_{:04}.yaml", self.tfn_updates), update)?;
        self.tfn_updates += 1;
        self.inner.set_transfer_function(update)
    }

    fn set_isovalues(&mut self, values: &[f32]) -> Result<()> {
        ensure!(
            values.len() <= NUM_ISO_VALUES,
            "{} isovalues exceed the {} slots",
            values.len(),
            NUM_ISO_VALUES
        );
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            bail!("isovalue {} is not finite", v);
        }

        self.write_trace(
            &format!("iso_{:04}.yaml", self.iso_updates),
            &IsoTrace { values },
        )?;
        self.iso_updates += 1;
        self.inner.set_isovalues(values)
    }

    fn render_frame(&mut self, frame: usize) -> Result<()> {
        self.inner.render_frame(frame)
    }
}
