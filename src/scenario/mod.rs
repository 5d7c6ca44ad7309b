pub mod presets;

use std::collections::HashSet;

use crate::config::{ClockConfig, IntegratorConfig, ScenarioConfig, TransferConfig};
use crate::dynamics::state::{Body, BodyState, State, System, Vec3};
use crate::error::ConfigError;
use crate::physics::thrust::ThrustDirective;

// ---------------------------------------------------------------------------
// Validated scenario
// ---------------------------------------------------------------------------

/// Everything needed to (re)start a simulation, checked for consistency.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub system: System,
    initial: State,
    pub integrator: IntegratorConfig,
    pub clock: ClockConfig,
    /// Directive applied when the operator switches thrust on.
    pub thrust: ThrustDirective,
    pub projection_steps: usize,
    pub transfer: Option<TransferConfig>,
}

impl Scenario {
    /// Fresh copy of the initial conditions at t = 0.
    pub fn initial_state(&self) -> State {
        self.initial.clone()
    }

    /// Largest configured time factor.
    pub fn max_time_factor(&self) -> f64 {
        self.clock.time_factors.iter().copied().fold(f64::MIN, f64::max)
    }
}

impl TryFrom<&ScenarioConfig> for Scenario {
    type Error = ConfigError;

    fn try_from(cfg: &ScenarioConfig) -> Result<Self, Self::Error> {
        if cfg.bodies.len() < 2 {
            return Err(ConfigError::NotEnoughBodies(cfg.bodies.len()));
        }

        let mut seen = HashSet::new();
        for b in &cfg.bodies {
            if !b.mass.is_finite() || b.mass <= 0.0 {
                return Err(ConfigError::InvalidMass { name: b.name.clone(), mass: b.mass });
            }
            if !seen.insert(b.name.as_str()) {
                return Err(ConfigError::DuplicateBody(b.name.clone()));
            }
            if b.position.iter().chain(&b.velocity).any(|x| !x.is_finite()) {
                return Err(ConfigError::NonFiniteInitialState(b.name.clone()));
            }
        }

        for (i, a) in cfg.bodies.iter().enumerate() {
            for b in &cfg.bodies[i + 1..] {
                if a.position == b.position {
                    return Err(ConfigError::CoincidentBodies {
                        a: a.name.clone(),
                        b: b.name.clone(),
                    });
                }
            }
        }

        let index_of = |name: &str| {
            cfg.bodies
                .iter()
                .position(|b| b.name == name)
                .ok_or_else(|| ConfigError::UnknownBody(name.to_string()))
        };
        let target = index_of(&cfg.thrust_target)?;
        let reference = index_of(&cfg.thrust_reference)?;
        if target == reference {
            return Err(ConfigError::SelfReference(cfg.thrust_target.clone()));
        }

        let clock = &cfg.clock;
        if !clock.base_dt.is_finite() || clock.base_dt <= 0.0 {
            return Err(ConfigError::InvalidTimeStep(clock.base_dt));
        }
        if clock.time_factors.is_empty()
            || clock.time_factors.iter().any(|f| !f.is_finite() || *f <= 0.0)
        {
            return Err(ConfigError::InvalidTimeFactors);
        }

        if let Some(t) = &cfg.transfer {
            if !t.target_radius.is_finite() || t.target_radius <= 0.0 {
                return Err(ConfigError::InvalidTransfer(t.target_radius));
            }
            if !t.tolerance.is_finite() || t.tolerance <= 0.0 {
                return Err(ConfigError::InvalidArrivalTolerance(t.tolerance));
            }
        }

        let thrust = ThrustDirective::new(false, cfg.thrust.mode, cfg.thrust.magnitude)?;

        let system = System::new(
            cfg.bodies.iter().map(|b| Body::new(b.name.clone(), b.mass)).collect(),
            target,
            reference,
        );
        let initial = State::new(
            0.0,
            cfg.bodies
                .iter()
                .map(|b| BodyState::new(Vec3::from(b.position), Vec3::from(b.velocity)))
                .collect(),
        );

        Ok(Scenario {
            name: cfg.name.clone(),
            system,
            initial,
            integrator: cfg.integrator,
            clock: cfg.clock.clone(),
            thrust,
            projection_steps: cfg.projection.steps,
            transfer: cfg.transfer,
        })
    }
}

impl TryFrom<ScenarioConfig> for Scenario {
    type Error = ConfigError;

    fn try_from(cfg: ScenarioConfig) -> Result<Self, Self::Error> {
        Scenario::try_from(&cfg)
    }
}
