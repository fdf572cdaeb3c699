//! Named transfer functions and the built-in catalog.
//!
//! Presets can be stored as YAML:
//!
//! ```yaml
//! name: Fire
//! editable: true
//! colors:
//!   - { x: 0.0, rgb: [0.0, 0.0, 0.0] }
//!   - { x: 1.0, rgb: [1.0, 0.5, 0.0] }
//! opacities:
//!   - { x: 0.0, opacity: 0.0 }
//!   - { x: 1.0, opacity: 1.0 }
//! ```

use crate::{ColorPoint, OpacityPoint, TfnError, TfnResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named pair of color and opacity control-point sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    /// Display name.
    pub name: String,
    /// Color knots, sorted by x.
    pub colors: Vec<ColorPoint>,
    /// Opacity knots, sorted by x.
    pub opacities: Vec<OpacityPoint>,
    /// Whether control points may be edited.
    #[serde(default)]
    pub editable: bool,
}

impl TransferFunction {
    /// Creates a transfer function with the default linear opacity ramp.
    pub fn new(name: impl Into<String>, colors: Vec<ColorPoint>, editable: bool) -> Self {
        Self {
            name: name.into(),
            colors,
            opacities: linear_ramp(),
            editable,
        }
    }

    /// Checks that both sequences are non-empty, inside `[0, 1]` and sorted.
    pub fn validate(&self) -> TfnResult<()> {
        check_sequence(&self.name, "color", self.colors.iter().map(|p| p.x))?;
        check_sequence(&self.name, "opacity", self.opacities.iter().map(|p| p.x))
    }

    /// Parses and validates a YAML preset.
    pub fn from_yaml_str(s: &str) -> TfnResult<Self> {
        let tfn: Self = serde_yaml::from_str(s)?;
        tfn.validate()?;
        Ok(tfn)
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> TfnResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Loads a YAML preset file.
    pub fn load_yaml(path: impl AsRef<Path>) -> TfnResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

fn check_sequence(
    name: &str,
    what: &str,
    xs: impl Iterator<Item = f32>,
) -> TfnResult<()> {
    let mut prev: Option<f32> = None;
    for x in xs {
        if !(0.0..=1.0).contains(&x) {
            return Err(TfnError::Invalid(format!(
                "'{}': {} point x={} outside [0, 1]",
                name, what, x
            )));
        }
        if prev.is_some_and(|p| x < p) {
            return Err(TfnError::Invalid(format!(
                "'{}': {} points not sorted by x",
                name, what
            )));
        }
        prev = Some(x);
    }
    if prev.is_none() {
        return Err(TfnError::Invalid(format!("'{}': no {} points", name, what)));
    }
    Ok(())
}

/// Opacity ramp shared by all built-in presets.
pub fn linear_ramp() -> Vec<OpacityPoint> {
    vec![OpacityPoint::new(0.0, 0.0), OpacityPoint::new(1.0, 1.0)]
}

fn jet() -> Vec<ColorPoint> {
    vec![
        ColorPoint::new(0.0, 0.0, 0.0, 1.0),
        ColorPoint::new(0.3, 0.0, 1.0, 1.0),
        ColorPoint::new(0.6, 1.0, 1.0, 0.0),
        ColorPoint::new(1.0, 1.0, 0.0, 0.0),
    ]
}

const ICE_FIRE: [[f32; 3]; 17] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.120394, 0.302678],
    [0.0, 0.216587, 0.524575],
    [0.0552529, 0.345022, 0.659495],
    [0.128054, 0.492592, 0.720287],
    [0.188952, 0.641306, 0.792096],
    [0.327672, 0.784939, 0.873426],
    [0.60824, 0.892164, 0.935546],
    [0.881376, 0.912184, 0.818097],
    [0.9514, 0.835615, 0.449271],
    [0.904479, 0.690486, 0.0],
    [0.854063, 0.510857, 0.0],
    [0.777096, 0.330175, 0.000885023],
    [0.672862, 0.139086, 0.00270085],
    [0.508812, 0.0, 0.0],
    [0.299413, 0.000366217, 0.000549325],
    [0.0157473, 0.00332647, 0.0],
];

fn ice_fire() -> Vec<ColorPoint> {
    let spacing = 1.0 / (ICE_FIRE.len() - 1) as f32;
    ICE_FIRE
        .iter()
        .enumerate()
        .map(|(i, &[r, g, b])| ColorPoint::new(i as f32 * spacing, r, g, b))
        .collect()
}

fn cool_warm() -> Vec<ColorPoint> {
    vec![
        ColorPoint::new(0.0, 0.231, 0.298, 0.752),
        ColorPoint::new(0.25, 0.552, 0.690, 0.996),
        ColorPoint::new(0.5, 0.866, 0.866, 0.866),
        ColorPoint::new(0.75, 0.956, 0.603, 0.486),
        ColorPoint::new(1.0, 0.705, 0.015, 0.149),
    ]
}

fn blue_red() -> Vec<ColorPoint> {
    vec![
        ColorPoint::new(0.0, 0.0, 0.0, 1.0),
        ColorPoint::new(1.0, 1.0, 0.0, 0.0),
    ]
}

fn grayscale() -> Vec<ColorPoint> {
    vec![
        ColorPoint::new(0.0, 0.0, 0.0, 0.0),
        ColorPoint::new(1.0, 1.0, 1.0, 1.0),
    ]
}

/// Built-in catalog: read-only presets followed by an editable `Custom`
/// entry seeded from Jet.
pub fn builtin() -> Vec<TransferFunction> {
    vec![
        TransferFunction::new("Jet", jet(), false),
        TransferFunction::new("Ice Fire", ice_fire(), false),
        TransferFunction::new("Cool Warm", cool_warm(), false),
        TransferFunction::new("Blue Red", blue_red(), false),
        TransferFunction::new("Grayscale", grayscale(), false),
        TransferFunction::new("Custom", jet(), true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let names: Vec<_> = builtin().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            ["Jet", "Ice Fire", "Cool Warm", "Blue Red", "Grayscale", "Custom"]
        );
        for tfn in builtin() {
            tfn.validate().unwrap();
            assert_eq!(tfn.opacities, linear_ramp());
            assert_eq!(tfn.editable, tfn.name == "Custom");
        }
    }

    #[test]
    fn test_ice_fire_spacing() {
        let pts = ice_fire();
        assert_eq!(pts.len(), 17);
        assert_eq!(pts[0].x, 0.0);
        assert_eq!(pts[8].x, 0.5);
        assert_eq!(pts[16].x, 1.0);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let tfn = TransferFunction::new("Mine", blue_red(), true);
        let text = tfn.to_yaml_string().unwrap();
        assert_eq!(TransferFunction::from_yaml_str(&text).unwrap(), tfn);
    }

    #[test]
    fn test_yaml_rejects_unsorted() {
        let text = "
name: Bad
colors:
  - { x: 0.8, rgb: [0, 0, 0] }
  - { x: 0.2, rgb: [1, 1, 1] }
opacities:
  - { x: 0.0, opacity: 0.0 }
";
        assert!(matches!(
            TransferFunction::from_yaml_str(text),
            Err(TfnError::Invalid(_))
        ));
    }

    #[test]
    fn test_yaml_editable_defaults_false() {
        let text = "
name: Loaded
colors: [{ x: 0.0, rgb: [0, 0, 0] }]
opacities: [{ x: 0.0, opacity: 1.0 }]
";
        let tfn = TransferFunction::from_yaml_str(text).unwrap();
        assert!(!tfn.editable);
    }
}
