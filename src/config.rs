//! Scenario manifests loaded from TOML.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::physics::thrust::ThrustMode;
use crate::sim::adaptive::AdaptiveStepControl;

/// A complete scenario as written in a manifest. Validated into a
/// [`Scenario`](crate::scenario::Scenario) before use.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioConfig {
    pub name: String,
    pub bodies: Vec<BodyConfig>,
    /// Name of the body that receives thrust and impulses.
    pub thrust_target: String,
    /// Name of the body radial modes and maneuvers are measured against.
    pub thrust_reference: String,
    #[serde(default)]
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub thrust: ThrustConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub transfer: Option<TransferConfig>,
}

/// Initial conditions of one body, SI units.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    pub mass: f64,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
}

impl BodyConfig {
    pub fn new(name: impl Into<String>, mass: f64, position: [f64; 3], velocity: [f64; 3]) -> Self {
        Self { name: name.into(), mass, position, velocity }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum IntegratorConfig {
    #[default]
    SemiImplicitEuler,
    DormandPrince(AdaptiveStepControl),
}

/// Tick length and the selectable time factors.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    /// Simulated seconds per tick at time factor 1.
    pub base_dt: f64,
    pub time_factors: Vec<f64>,
    /// Fixed-step substeps per tick at the largest time factor.
    pub fast_substeps: usize,
    /// Projection record interval at the largest time factor.
    pub fast_record_every: usize,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            base_dt: 10.0,
            time_factors: vec![1.0, 10.0, 50.0],
            fast_substeps: 10,
            fast_record_every: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ThrustConfig {
    pub mode: ThrustMode,
    /// Thrust acceleration, m/s^2.
    pub magnitude: f64,
}

impl Default for ThrustConfig {
    fn default() -> Self {
        Self { mode: ThrustMode::Prograde, magnitude: 1.0 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    pub steps: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { steps: 500 }
    }
}

/// Hohmann transfer of the thrust target to `target_radius` around the
/// reference body.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TransferConfig {
    pub target_radius: f64,
    #[serde(default = "default_arrival_tolerance")]
    pub tolerance: f64,
}

fn default_arrival_tolerance() -> f64 {
    50_000.0
}

impl ScenarioConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Load a scenario manifest from a TOML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    ScenarioConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::thrust::Sign;

    const MINIMAL: &str = r#"
        name = "two-body"
        thrust_target = "craft"
        thrust_reference = "earth"

        [[bodies]]
        name = "earth"
        mass = 5.9723e24

        [[bodies]]
        name = "craft"
        mass = 8000.0
        position = [7.0e6, 0.0, 0.0]
        velocity = [0.0, 7546.0, 0.0]
    "#;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = ScenarioConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(cfg.bodies.len(), 2);
        assert_eq!(cfg.bodies[0].position, [0.0; 3]);
        assert_eq!(cfg.integrator, IntegratorConfig::SemiImplicitEuler);
        assert_eq!(cfg.clock, ClockConfig::default());
        assert_eq!(cfg.thrust, ThrustConfig::default());
        assert_eq!(cfg.projection.steps, 500);
        assert!(cfg.transfer.is_none());
    }

    #[test]
    fn adaptive_integrator_and_transfer() {
        let text = format!(
            "{MINIMAL}
            [integrator]
            method = \"dormand-prince\"
            rel_tol = 1e-8

            [thrust]
            mode = \"fixed-\"
            magnitude = 1e-3

            [transfer]
            target_radius = 3.844e8
            "
        );
        let cfg = ScenarioConfig::from_toml_str(&text).unwrap();
        let IntegratorConfig::DormandPrince(control) = cfg.integrator else {
            panic!("expected dormand-prince, got {:?}", cfg.integrator);
        };
        assert_eq!(control.rel_tol, 1e-8);
        assert_eq!(control.abs_tol, 1e-12);
        assert_eq!(control.max_steps, 100_000);
        assert_eq!(cfg.thrust.mode, ThrustMode::FixedSign(Sign::Negative));
        let transfer = cfg.transfer.unwrap();
        assert_eq!(transfer.target_radius, 3.844e8);
        assert_eq!(transfer.tolerance, 50_000.0);
    }

    #[test]
    fn unknown_thrust_mode_is_rejected() {
        let text = format!("{MINIMAL}\n[thrust]\nmode = \"sideways\"\n");
        let err = ScenarioConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_scenario("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn shipped_manifests_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        for name in ["earth_moon_craft.toml", "lunar_transfer.toml"] {
            let cfg = load_scenario(dir.join(name)).unwrap();
            assert!(cfg.bodies.len() >= 2, "{name}");
        }
    }
}
