use std::iter::FusedIterator;

use crate::dynamics::state::{State, System, Vec3};
use crate::physics::thrust::ThrustDirective;

use super::integrator::semi_implicit_euler_step;

/// Look-ahead parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSettings {
    /// Time per projection step, s.
    pub dt: f64,
    /// Number of steps to run.
    pub steps: usize,
    /// Record a position every n steps (0 is treated as 1).
    pub record_every: usize,
    /// Semi-implicit Euler substeps per step (0 is treated as 1).
    pub substeps: usize,
}

impl ProjectionSettings {
    pub fn new(dt: f64, steps: usize) -> Self {
        Self { dt, steps, record_every: 1, substeps: 1 }
    }

    /// Number of positions the projection yields.
    pub fn len(&self) -> usize {
        self.steps.div_ceil(self.record_every.max(1))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Speculative propagation of a private copy of the state.
///
/// Yields the thrust target's position after step `i` whenever
/// `i % record_every == 0`. Consuming it runs the propagation; it cannot be
/// restarted.
pub struct Projector<'a> {
    system: &'a System,
    state: State,
    directive: ThrustDirective,
    settings: ProjectionSettings,
    step: usize,
}

impl<'a> Projector<'a> {
    /// Ballistic projection (thrust off).
    pub fn new(system: &'a System, state: &State, settings: ProjectionSettings) -> Self {
        Self::with_directive(system, state, ThrustDirective::off(), settings)
    }

    pub fn with_directive(
        system: &'a System,
        state: &State,
        directive: ThrustDirective,
        settings: ProjectionSettings,
    ) -> Self {
        Self {
            system,
            state: state.clone(),
            directive,
            settings,
            step: 0,
        }
    }

    /// The projector's own copy, as propagated so far.
    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Iterator for Projector<'_> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        let record_every = self.settings.record_every.max(1);
        let substeps = self.settings.substeps.max(1);
        let dt_sub = self.settings.dt / substeps as f64;
        while self.step < self.settings.steps {
            let i = self.step;
            self.step += 1;
            for _ in 0..substeps {
                semi_implicit_euler_step(self.system, &mut self.state, dt_sub, &self.directive);
            }
            if i % record_every == 0 {
                return Some(self.state.position(self.system.thrust_target));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let record_every = self.settings.record_every.max(1);
        // multiples of record_every in [step, steps)
        let remaining = self.settings.steps.div_ceil(record_every)
            - self.step.min(self.settings.steps).div_ceil(record_every);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Projector<'_> {}

impl FusedIterator for Projector<'_> {}

/// Ballistic look-ahead of the thrust target from `state`. `state` is not modified.
pub fn project(system: &System, state: &State, settings: ProjectionSettings) -> Vec<Vec3> {
    Projector::new(system, state, settings).collect()
}

/// Look-ahead holding `directive` constant over the whole horizon.
pub fn project_with(
    system: &System,
    state: &State,
    directive: ThrustDirective,
    settings: ProjectionSettings,
) -> Vec<Vec3> {
    Projector::with_directive(system, state, directive, settings).collect()
}
