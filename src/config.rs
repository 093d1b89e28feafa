use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::automaton::Neighborhood;
use crate::error::FieldError;
use crate::grid::Boundary;
use crate::kernel::Shape;
use crate::render::Palette;
use crate::simulator::{POINTER_ADD, POINTER_MULT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] FieldError),
}

/// Which engine drives the field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Convolution,
    Parity,
    Decay,
}

/// Scripted pointer press: applied to the committed field right before
/// step number `step` runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub step: usize,
    pub x: i64,
    pub y: i64,
}

/// All tunable parameters. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Field
    pub width: usize,
    pub height: usize,
    pub mode: Mode,

    // Convolution
    pub filter_size: usize,
    pub gain: f32,
    pub shape: Shape,
    pub boundary: Boundary,
    pub wrap_limit: Option<f32>,
    pub seed_mass: f32,

    // Automaton
    pub neighborhood: Neighborhood,
    pub decay_scale: f32,
    pub density: f32,
    pub rng_seed: u64,

    // Pointer
    pub pointer_add: f32,
    pub pointer_mult: f32,
    /// Scripted pointer events. Convolution mode only; `validate` rejects
    /// them for the automaton modes.
    pub perturbations: Vec<Perturbation>,

    // Run
    pub steps: usize,
    pub snapshot_every: usize,
    pub palette: Palette,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            mode: Mode::Convolution,
            filter_size: 5,
            gain: 0.9998,
            shape: Shape::Circular,
            boundary: Boundary::Toroidal,
            wrap_limit: None,
            seed_mass: 30000.0,
            neighborhood: Neighborhood::Moore3,
            decay_scale: 0.15,
            density: 0.5,
            rng_seed: 42,
            pointer_add: POINTER_ADD,
            pointer_mult: POINTER_MULT,
            perturbations: Vec::new(),
            steps: 100,
            snapshot_every: 25,
            palette: Palette::Gray,
        }
    }
}

impl Params {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let params: Params = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Structural checks only; field values are never validated.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.width == 0 {
            return Err(FieldError::InvalidDimension { what: "width", value: 0 });
        }
        if self.height == 0 {
            return Err(FieldError::InvalidDimension { what: "height", value: 0 });
        }
        if self.filter_size == 0 {
            return Err(FieldError::InvalidDimension {
                what: "kernel size",
                value: 0,
            });
        }
        if let Some(limit) = self.wrap_limit {
            if limit.is_nan() || limit <= 0.0 {
                return Err(FieldError::InvalidValue {
                    what: "wrap limit",
                    value: limit,
                });
            }
        }
        if self.mode != Mode::Convolution && !self.perturbations.is_empty() {
            return Err(FieldError::ModeMismatch { what: "perturbations" });
        }
        for p in &self.perturbations {
            if p.x < 0 || p.y < 0 || p.x >= self.width as i64 || p.y >= self.height as i64 {
                return Err(FieldError::OutOfRange {
                    x: p.x,
                    y: p.y,
                    width: self.width,
                    height: self.height,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo() {
        let p = Params::default();
        assert_eq!((p.width, p.height, p.filter_size), (512, 512, 5));
        assert_eq!(p.gain, 0.9998);
        assert_eq!(p.seed_mass, 30000.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p = Params::from_json(r#"{"width": 64, "shape": "ring", "boundary": "clamped_skip"}"#).unwrap();
        assert_eq!(p.width, 64);
        assert_eq!(p.height, 512);
        assert_eq!(p.shape, Shape::Ring);
        assert_eq!(p.boundary, Boundary::ClampedSkip);
    }

    #[test]
    fn json_round_trips() {
        let p = Params {
            boundary: Boundary::ClampedSkip,
            wrap_limit: Some(5.0 * std::f32::consts::PI),
            perturbations: vec![Perturbation { step: 3, x: 1, y: 2 }],
            ..Params::default()
        };
        let text = serde_json::to_string(&p).unwrap();
        assert_eq!(Params::from_json(&text).unwrap(), p);
    }

    #[test]
    fn rejects_bad_structure() {
        assert!(matches!(
            Params::from_json(r#"{"width": 0}"#),
            Err(ConfigError::Invalid(FieldError::InvalidDimension { what: "width", .. }))
        ));
        assert!(matches!(
            Params::from_json(r#"{"filter_size": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Params::from_json(r#"{"wrap_limit": 0.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Params::from_json(r#"{"width": 8, "perturbations": [{"step": 0, "x": 8, "y": 0}]}"#),
            Err(ConfigError::Invalid(FieldError::OutOfRange { x: 8, .. }))
        ));
        assert!(matches!(Params::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn wrap_limit_error_keeps_fraction() {
        let err = Params::from_json(r#"{"wrap_limit": -0.3}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(FieldError::InvalidValue { what: "wrap limit", value }) if value == -0.3
        ));
        assert!(err.to_string().contains("-0.3"));
        let half = Params {
            wrap_limit: Some(0.5),
            ..Params::default()
        };
        assert!(half.validate().is_ok());
    }

    #[test]
    fn perturbations_rejected_outside_convolution() {
        for mode in [Mode::Parity, Mode::Decay] {
            let p = Params {
                mode,
                perturbations: vec![Perturbation { step: 0, x: 1, y: 1 }],
                ..Params::default()
            };
            assert_eq!(
                p.validate(),
                Err(FieldError::ModeMismatch { what: "perturbations" })
            );
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Params::load(Path::new("/nonexistent/fieldsim.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
