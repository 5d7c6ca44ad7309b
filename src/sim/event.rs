use crate::dynamics::state::{State, System};

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    FirstBurn { delta_v: f64 },
    SecondBurn { delta_v: f64 },
    Periapsis { radius: f64 },
    Apoapsis { radius: f64 },
    RadiusReached { radius: f64 },
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states of the system's thrust target
/// relative to its reference body and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &State, current: &State, system: &System) -> Option<EventKind>;
}

/// Radial velocity of the thrust target relative to its reference body.
fn radial_rate(state: &State, system: &System) -> f64 {
    let r = state.relative_position(system.thrust_target, system.thrust_reference);
    let v = state.relative_velocity(system.thrust_target, system.thrust_reference);
    r.dot(&v)
}

/// Detects periapsis and apoapsis passages (sign change of radial velocity).
#[derive(Debug, Clone, Default)]
pub struct ApsisDetector;

impl EventDetector for ApsisDetector {
    fn check(&mut self, prev: &State, current: &State, system: &System) -> Option<EventKind> {
        let before = radial_rate(prev, system);
        let after = radial_rate(current, system);
        let radius = current.radius(system.thrust_target, system.thrust_reference);
        if before < 0.0 && after >= 0.0 {
            Some(EventKind::Periapsis { radius })
        } else if before > 0.0 && after <= 0.0 {
            Some(EventKind::Apoapsis { radius })
        } else {
            None
        }
    }
}

/// Fires once, the first time the radius is within `tolerance` of `target`.
#[derive(Debug, Clone)]
pub struct RadiusWindowDetector {
    pub target: f64,
    pub tolerance: f64,
    fired: bool,
}

impl RadiusWindowDetector {
    pub fn new(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance, fired: false }
    }

    pub fn fired(&self) -> bool {
        self.fired
    }
}

impl EventDetector for RadiusWindowDetector {
    fn check(&mut self, _prev: &State, current: &State, system: &System) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let radius = current.radius(system.thrust_target, system.thrust_reference);
        if (radius - self.target).abs() < self.tolerance {
            self.fired = true;
            Some(EventKind::RadiusReached { radius })
        } else {
            None
        }
    }
}
