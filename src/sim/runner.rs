use log::debug;

use crate::config::{IntegratorConfig, ScenarioConfig};
use crate::dynamics::state::{State, System, Vec3};
use crate::error::{ConfigError, IntegrationError};
use crate::orbital::maneuvers::HohmannManeuver;
use crate::physics::thrust::ThrustDirective;
use crate::scenario::Scenario;

use super::event::{ApsisDetector, EventDetector, EventKind, SimEvent};
use super::integrator::{advance, StepMethod};
use super::projector::{project, ProjectionSettings};

// ---------------------------------------------------------------------------
// Simulation context
// ---------------------------------------------------------------------------

/// Owns the authoritative state and everything the driving loop mutates
/// between ticks.
#[derive(Debug, Clone)]
pub struct Simulation {
    scenario: Scenario,
    state: State,
    directive: ThrustDirective,
    maneuver: Option<HohmannManeuver>,
    time_factor_idx: usize,
    apsis: ApsisDetector,
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Self {
        let state = scenario.initial_state();
        let maneuver = plan_transfer(&scenario, &state);
        Self {
            scenario,
            state,
            directive: ThrustDirective::off(),
            maneuver,
            time_factor_idx: 0,
            apsis: ApsisDetector,
        }
    }

    pub fn from_config(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Scenario::try_from(config)?))
    }

    /// Back to the scenario's initial conditions: thrust off, transfer not
    /// started, slowest time factor.
    pub fn reset(&mut self) -> &State {
        self.state = self.scenario.initial_state();
        self.directive = ThrustDirective::off();
        if let Some(m) = self.maneuver.as_mut() {
            m.reset();
        }
        self.time_factor_idx = 0;
        debug!("reset scenario `{}`", self.scenario.name);
        &self.state
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn system(&self) -> &System {
        &self.scenario.system
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn maneuver(&self) -> Option<&HohmannManeuver> {
        self.maneuver.as_ref()
    }

    pub fn directive(&self) -> ThrustDirective {
        self.directive
    }

    pub fn set_directive(&mut self, directive: ThrustDirective) {
        self.directive = directive;
    }

    /// Switch thrust on or off using the scenario's configured mode and
    /// magnitude.
    pub fn set_thrust(&mut self, enabled: bool) {
        self.directive = self.scenario.thrust.with_enabled(enabled);
    }

    /// Apply the first transfer burn. `None` when the scenario has no
    /// transfer or it has already started.
    pub fn trigger_maneuver(&mut self) -> Option<SimEvent> {
        let maneuver = self.maneuver.as_mut()?;
        let delta_v = maneuver.trigger(&self.scenario.system, &mut self.state)?;
        Some(SimEvent { time: self.state.time, kind: EventKind::FirstBurn { delta_v } })
    }

    pub fn time_factor(&self) -> f64 {
        self.scenario.clock.time_factors[self.time_factor_idx]
    }

    /// Select the next time factor, wrapping around. Returns the new factor.
    pub fn cycle_time_factor(&mut self) -> f64 {
        self.time_factor_idx = (self.time_factor_idx + 1) % self.scenario.clock.time_factors.len();
        debug!("time factor {}x", self.time_factor());
        self.time_factor()
    }

    /// Returns the selected factor, or `None` if `idx` is out of range.
    pub fn set_time_factor_index(&mut self, idx: usize) -> Option<f64> {
        if idx >= self.scenario.clock.time_factors.len() {
            return None;
        }
        self.time_factor_idx = idx;
        Some(self.time_factor())
    }

    /// Simulated seconds covered by one tick.
    pub fn tick_dt(&self) -> f64 {
        self.scenario.clock.base_dt * self.time_factor()
    }

    fn at_fastest(&self) -> bool {
        self.time_factor() >= self.scenario.max_time_factor()
    }

    fn fixed_substeps(&self) -> usize {
        if self.at_fastest() {
            self.scenario.clock.fast_substeps
        } else {
            1
        }
    }

    pub fn step_method(&self) -> StepMethod {
        match self.scenario.integrator {
            IntegratorConfig::SemiImplicitEuler => {
                StepMethod::SemiImplicitEuler { substeps: self.fixed_substeps() }
            }
            IntegratorConfig::DormandPrince(control) => StepMethod::DormandPrince(control),
        }
    }

    /// Advance one tick, then run the transfer sequencing and the detectors.
    ///
    /// On error the state is left as it was before the tick.
    pub fn tick(&mut self) -> Result<Vec<SimEvent>, IntegrationError> {
        let (dt, method) = (self.tick_dt(), self.step_method());
        let next = advance(&self.scenario.system, &self.state, dt, &self.directive, &method)?;
        let prev = std::mem::replace(&mut self.state, next);
        let system = &self.scenario.system;

        let mut events = Vec::new();
        if let Some(m) = self.maneuver.as_mut() {
            if let Some(delta_v) = m.update(system, &prev, &mut self.state) {
                let kind = EventKind::SecondBurn { delta_v };
                events.push(SimEvent { time: self.state.time, kind });
            }
        }
        if let Some(kind) = self.apsis.check(&prev, &self.state, system) {
            debug!("{kind:?} at t={:.1} s", self.state.time);
            events.push(SimEvent { time: self.state.time, kind });
        }
        Ok(events)
    }

    /// Run `ticks` ticks, collecting every event.
    pub fn run(&mut self, ticks: usize) -> Result<Vec<SimEvent>, IntegrationError> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.tick()?);
        }
        Ok(events)
    }

    pub fn projection_settings(&self) -> ProjectionSettings {
        ProjectionSettings {
            dt: self.tick_dt(),
            steps: self.scenario.projection_steps,
            record_every: if self.at_fastest() { self.scenario.clock.fast_record_every } else { 1 },
            substeps: self.fixed_substeps(),
        }
    }

    /// Ballistic look-ahead of the thrust target from the current state.
    pub fn project(&self) -> Vec<Vec3> {
        project(&self.scenario.system, &self.state, self.projection_settings())
    }
}

fn plan_transfer(scenario: &Scenario, state: &State) -> Option<HohmannManeuver> {
    scenario
        .transfer
        .map(|t| HohmannManeuver::plan(&scenario.system, state, t.target_radius, t.tolerance))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
