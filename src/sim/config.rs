// Live solver configuration and tuning presets

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::sim::error::{FluidError, FluidResult};

/// Tunables read by the solver at the start of every step. A host may change
/// any of them between steps.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct FluidConfig {
    /// Time increment per step
    pub dt: f32,

    /// Dye diffusion rate
    pub diffusion: f32,

    /// Kinematic viscosity of the velocity field
    pub viscosity: f32,

    /// Relaxation sweeps for both diffusion and projection
    pub iterations: usize,

    /// Per-step multiplier on density, in (0, 1]
    pub density_dissipation: f32,

    /// Per-step multiplier on velocity, in (0, 1]
    pub velocity_dissipation: f32,

    /// Scale applied to injected force vectors
    pub force_multiplier: f32,

    /// Radius, in cells, of the disc a force is spread over
    pub force_radius: f32,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            diffusion: 0.0001,
            viscosity: 0.0001,
            iterations: 16,
            density_dissipation: 0.99,
            velocity_dissipation: 0.99,
            force_multiplier: 5.,
            force_radius: 4.,
        }
    }
}

impl FluidConfig {
    /// Check every value against its documented range.
    pub fn validate(&self) -> FluidResult<()> {
        positive("dt", self.dt)?;
        non_negative("diffusion", self.diffusion)?;
        non_negative("viscosity", self.viscosity)?;
        unit_fraction("density_dissipation", self.density_dissipation)?;
        unit_fraction("velocity_dissipation", self.velocity_dissipation)?;
        positive("force_multiplier", self.force_multiplier)?;
        non_negative("force_radius", self.force_radius)?;

        if self.iterations == 0 {
            return Err(FluidError::InvalidConfig {
                name: "iterations",
                value: 0.,
                expected: "at least 1",
            });
        }

        Ok(())
    }

    /// A copy that is safe to feed into the kernels whatever the host wrote.
    /// Non-finite values become zero (dissipation becomes one, i.e. no decay),
    /// negatives are clamped to zero, dissipation is clamped into [0, 1] and
    /// at least one sweep is run.
    pub fn sanitized(&self) -> FluidConfig {
        let finite_or = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        let rate = |v: f32| finite_or(v, 0.).max(0.);
        let decay = |v: f32| finite_or(v, 1.).clamp(0., 1.);

        FluidConfig {
            dt: rate(self.dt),
            diffusion: rate(self.diffusion),
            viscosity: rate(self.viscosity),
            iterations: self.iterations.max(1),
            density_dissipation: decay(self.density_dissipation),
            velocity_dissipation: decay(self.velocity_dissipation),
            force_multiplier: rate(self.force_multiplier),
            force_radius: rate(self.force_radius),
        }
    }
}

fn positive(name: &'static str, value: f32) -> FluidResult<()> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(invalid(name, value, "finite and > 0"))
    }
}

fn non_negative(name: &'static str, value: f32) -> FluidResult<()> {
    if value.is_finite() && value >= 0. {
        Ok(())
    } else {
        Err(invalid(name, value, "finite and >= 0"))
    }
}

fn unit_fraction(name: &'static str, value: f32) -> FluidResult<()> {
    if value > 0. && value <= 1. {
        Ok(())
    } else {
        Err(invalid(name, value, "in (0, 1]"))
    }
}

fn invalid(name: &'static str, value: f32, expected: &'static str) -> FluidError {
    FluidError::InvalidConfig {
        name,
        value: value as f64,
        expected,
    }
}

/// Hand-tuned starting points for [`FluidConfig`]
#[derive(Serialize, Deserialize, ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Default,
    /// Light, quickly fading smoke
    Smoke,
    /// Dye that never fades in an almost inviscid fluid
    Ink,
    /// Thick fluid that resists stirring
    Syrup,
    /// Fixed 0.99 decay on both fields with four sweeps
    Classic,
}

impl Preset {
    pub fn config(self) -> FluidConfig {
        let base = FluidConfig::default();

        match self {
            Preset::Default => base,
            Preset::Smoke => FluidConfig {
                diffusion: 0.00005,
                viscosity: 0.00001,
                density_dissipation: 0.97,
                velocity_dissipation: 0.995,
                force_radius: 6.,
                ..base
            },
            Preset::Ink => FluidConfig {
                diffusion: 0.,
                viscosity: 0.,
                iterations: 20,
                density_dissipation: 1.,
                velocity_dissipation: 0.995,
                ..base
            },
            Preset::Syrup => FluidConfig {
                viscosity: 0.01,
                iterations: 30,
                velocity_dissipation: 0.95,
                force_multiplier: 20.,
                ..base
            },
            Preset::Classic => FluidConfig {
                diffusion: 0.,
                viscosity: 0.,
                iterations: 4,
                density_dissipation: 0.99,
                velocity_dissipation: 0.99,
                ..base
            },
        }
    }
}

/// Which field a renderer reads back
#[derive(Serialize, Deserialize, ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldView {
    #[default]
    Density,
    /// Per-cell speed
    Velocity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for preset in Preset::value_variants() {
            preset
                .config()
                .validate()
                .unwrap_or_else(|err| panic!("{preset:?}: {err}"));
        }
    }

    #[test]
    fn test_validate_rejects() {
        let bad = [
            FluidConfig { dt: 0., ..Default::default() },
            FluidConfig { dt: f32::NAN, ..Default::default() },
            FluidConfig { viscosity: -1., ..Default::default() },
            FluidConfig { diffusion: f32::INFINITY, ..Default::default() },
            FluidConfig { iterations: 0, ..Default::default() },
            FluidConfig { density_dissipation: 0., ..Default::default() },
            FluidConfig { velocity_dissipation: 1.5, ..Default::default() },
            FluidConfig { force_multiplier: -2., ..Default::default() },
            FluidConfig { force_radius: -1., ..Default::default() },
        ];

        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_reports_field() {
        let config = FluidConfig {
            velocity_dissipation: 2.,
            ..Default::default()
        };

        match config.validate() {
            Err(FluidError::InvalidConfig { name, value, .. }) => {
                assert_eq!(name, "velocity_dissipation");
                assert_eq!(value, 2.);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sanitized() {
        let config = FluidConfig {
            dt: f32::NAN,
            diffusion: -3.,
            viscosity: f32::INFINITY,
            iterations: 0,
            density_dissipation: f32::NAN,
            velocity_dissipation: 4.,
            force_multiplier: f32::NEG_INFINITY,
            force_radius: 2.5,
        };

        let clean = config.sanitized();

        assert_eq!(clean.dt, 0.);
        assert_eq!(clean.diffusion, 0.);
        assert_eq!(clean.viscosity, 0.);
        assert_eq!(clean.iterations, 1);
        assert_eq!(clean.density_dissipation, 1.);
        assert_eq!(clean.velocity_dissipation, 1.);
        assert_eq!(clean.force_multiplier, 0.);
        assert_eq!(clean.force_radius, 2.5);
    }

    #[test]
    fn test_sanitized_keeps_valid() {
        let config = Preset::Smoke.config();
        assert_eq!(config, config.sanitized());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FluidConfig = serde_json::from_str(r#"{ "dt": 0.05, "iterations": 8 }"#).unwrap();

        assert_eq!(config.dt, 0.05);
        assert_eq!(config.iterations, 8);
        assert_eq!(config.viscosity, FluidConfig::default().viscosity);
    }
}
